//! Narrative generation for recommendation slates.
//!
//! The language model is strictly a copywriter: it never chooses sticks,
//! prices, or fallback behavior. Those are deterministic decisions made by
//! the selection engine; this crate turns a finished slate into a short
//! buyer-facing paragraph, and degrades to a deterministic template whenever
//! the model is disabled, unconfigured, or failing.

pub mod capsules;
pub mod llm;
pub mod narrative;

pub use llm::{LlmClient, OpenAiChatClient, StaticLlm};
pub use narrative::{NarrativeGenerator, Rationale, RationaleRequest, RationaleSource};

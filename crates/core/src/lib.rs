pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;

pub use domain::{
    BowFamily, CatalogSnapshot, Journey, PlayerType, Priority, Product, Profile, RankedProduct,
    SelectionSlate, Tier,
};
pub use engine::{
    DeterministicSelectionEngine, EngineConfig, FallbackCounters, FallbackDiagnostics,
    ScoringWeights, Selection, SelectionEngine, TierIndicator,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};

pub mod config;
pub mod fallbacks;
pub mod filters;
pub mod scoring;
pub mod selector;
pub mod tiers;

use serde::{Deserialize, Serialize};

use crate::domain::catalog::CatalogSnapshot;
use crate::domain::profile::Profile;
use crate::domain::slate::SelectionSlate;

pub use self::config::{EngineConfig, ScoringWeights, DEFAULT_WEIGHTS};
pub use self::fallbacks::{FallbackCounters, FallbackDiagnostics};
pub use self::tiers::TierIndicator;

/// One recommendation outcome. `slate: None` is the explicit empty-result
/// signal — it only happens when the catalog has no rows for the requested
/// player type, and the diagnostics say so (`counters.final_cheapest == 0`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub slate: Option<SelectionSlate>,
    pub fallback: FallbackDiagnostics,
}

/// The full pipeline over one immutable snapshot: tier gate, hard filter,
/// fallback ladder, scorer, selector. Synchronous, no I/O, no shared state.
pub trait SelectionEngine: Send + Sync {
    fn recommend(&self, snapshot: &CatalogSnapshot, profile: &Profile) -> Selection;
}

/// The deterministic engine: stage order is fixed, every stage is a pure
/// function, and the same snapshot + profile always produce the same slate.
#[derive(Clone, Debug)]
pub struct DeterministicSelectionEngine {
    config: EngineConfig,
}

impl DeterministicSelectionEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl Default for DeterministicSelectionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SelectionEngine for DeterministicSelectionEngine {
    fn recommend(&self, snapshot: &CatalogSnapshot, profile: &Profile) -> Selection {
        let allowed = tiers::allowed_tiers(
            &TierIndicator::Label(profile.journey.as_str().to_string()),
            &self.config.tier_order,
        );

        let hard = filters::apply_hard_filters(snapshot.products(), profile, &allowed, &self.config);
        let (candidates, fallback) =
            fallbacks::apply_fallbacks(snapshot.products(), hard, profile, &allowed, &self.config);

        let ranked = scoring::rank(candidates, profile, &self.config);
        let ranked = selector::narrow_to_exact_length(ranked, profile);
        let slate = selector::select(&ranked, profile, &self.config);

        Selection { slate, fallback }
    }
}

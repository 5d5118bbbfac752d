use serde::{Deserialize, Serialize};

use crate::domain::product::Tier;

/// Additive scoring-term weights. Defaults carry the production tuning;
/// every term can be re-weighted from configuration without code edits.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Concave preference for spending near the ceiling.
    pub affordability: f64,
    pub affordability_exponent: f64,
    /// Minimum carbon expected of an Elite-journey recommendation.
    pub elite_carbon_floor: f64,
    pub elite_carbon_penalty: f64,
    pub evolution_carbon_floor: f64,
    pub evolution_carbon_penalty: f64,
    /// Bonus when the row matches the buyer's declared bow family.
    pub preferred_bow_bonus: f64,
    /// Style-bias weight applied to the family rank term.
    pub family_bias: f64,
    /// Style-bias weight applied to the row's own attribute term.
    pub attribute_bias: f64,
    /// Weight of the declared priority when it names one dimension.
    pub priority_focus: f64,
    /// Per-dimension weight of the blended nudge when it does not.
    pub priority_blend: f64,
}

pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    affordability: 0.35,
    affordability_exponent: 1.5,
    elite_carbon_floor: 70.0,
    elite_carbon_penalty: 0.6,
    evolution_carbon_floor: 40.0,
    evolution_carbon_penalty: 0.3,
    preferred_bow_bonus: 0.15,
    family_bias: 0.12,
    attribute_bias: 0.12,
    priority_focus: 0.08,
    priority_blend: 0.04,
};

impl Default for ScoringWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

/// Versioned engine configuration: eligibility graces, tolerances, windows,
/// and scoring weights. Constructed once at startup, validated there, and
/// passed by reference into every pipeline stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub version: String,
    /// Ordered tier sequence, entry level first.
    pub tier_order: Vec<Tier>,
    /// Grace baked into the hard price gate (0.05 = 5%).
    pub price_grace_pct: f64,
    /// Progressive price graces tried by the fallback ladder, in order.
    pub budget_relax_pcts: Vec<f64>,
    /// Length tolerance of the hard filter, in inches.
    pub length_tolerance: f64,
    /// Relaxed length tolerance used by the ladder.
    pub relaxed_length_tolerance: f64,
    /// How far below the top probability a secondary pick may sit.
    pub near_top_window: f64,
    /// How far below the top probability a wildcard pick may sit.
    pub wildcard_window: f64,
    /// Carbon-percentage delta that counts as contrast between two rows.
    pub contrast_carbon_delta: f64,
    /// Row count returned by the guaranteed final fallback.
    pub final_cheapest_count: usize,
    pub weights: ScoringWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            tier_order: Tier::ORDER.to_vec(),
            price_grace_pct: 0.05,
            budget_relax_pcts: vec![0.10, 0.20],
            length_tolerance: 0.5,
            relaxed_length_tolerance: 1.0,
            near_top_window: 0.10,
            wildcard_window: 0.15,
            contrast_carbon_delta: 10.0,
            final_cheapest_count: 3,
            weights: ScoringWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Startup validation. Per-request inputs never reach this path; a bad
    /// engine section should stop the process before it serves traffic.
    pub fn validate(&self) -> Result<(), String> {
        if self.tier_order.is_empty() {
            return Err("engine.tier_order must not be empty".to_string());
        }
        for (index, tier) in self.tier_order.iter().enumerate() {
            if self.tier_order[..index].contains(tier) {
                return Err(format!("engine.tier_order repeats tier `{tier}`"));
            }
        }
        if !(0.0..=1.0).contains(&self.price_grace_pct) {
            return Err("engine.price_grace_pct must be in range 0..=1".to_string());
        }
        if self.budget_relax_pcts.is_empty() {
            return Err("engine.budget_relax_pcts must not be empty".to_string());
        }
        let mut previous = self.price_grace_pct;
        for grace in &self.budget_relax_pcts {
            if !(0.0..=1.0).contains(grace) {
                return Err("engine.budget_relax_pcts entries must be in range 0..=1".to_string());
            }
            if *grace <= previous {
                return Err(
                    "engine.budget_relax_pcts must increase beyond the hard-filter grace"
                        .to_string(),
                );
            }
            previous = *grace;
        }
        if self.length_tolerance <= 0.0 || self.relaxed_length_tolerance < self.length_tolerance {
            return Err(
                "engine length tolerances must be positive and non-decreasing".to_string()
            );
        }
        if !(0.0..=1.0).contains(&self.near_top_window)
            || !(0.0..=1.0).contains(&self.wildcard_window)
        {
            return Err("engine near-top windows must be in range 0..=1".to_string());
        }
        if self.contrast_carbon_delta < 0.0 {
            return Err("engine.contrast_carbon_delta must not be negative".to_string());
        }
        if self.final_cheapest_count == 0 {
            return Err("engine.final_cheapest_count must be at least 1".to_string());
        }
        let weight_fields = [
            self.weights.affordability,
            self.weights.affordability_exponent,
            self.weights.elite_carbon_floor,
            self.weights.elite_carbon_penalty,
            self.weights.evolution_carbon_floor,
            self.weights.evolution_carbon_penalty,
            self.weights.preferred_bow_bonus,
            self.weights.family_bias,
            self.weights.attribute_bias,
            self.weights.priority_focus,
            self.weights.priority_blend,
        ];
        if weight_fields.iter().any(|weight| !weight.is_finite()) {
            return Err("engine.weights must be finite numbers".to_string());
        }
        Ok(())
    }
}

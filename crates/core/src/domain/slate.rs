use serde::{Deserialize, Serialize};

use super::product::Product;

/// A catalog row augmented with its score and min-max probability for the
/// current candidate set. Built by the scorer, consumed by the selector and
/// the response payload; never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub score: f64,
    pub probability: f64,
}

impl RankedProduct {
    /// Scores and probabilities must leave the engine finite; anything else
    /// collapses to zero here rather than leaking into the payload.
    pub fn new(product: Product, score: f64, probability: f64) -> Self {
        Self {
            product,
            score: if score.is_finite() { score } else { 0.0 },
            probability: if probability.is_finite() { probability.clamp(0.0, 1.0) } else { 0.0 },
        }
    }
}

/// The slate of up to three distinct recommendations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectionSlate {
    pub primary: RankedProduct,
    pub secondary: Option<RankedProduct>,
    pub wildcard: Option<RankedProduct>,
}

impl SelectionSlate {
    /// Primary plus secondary, in rank order, for callers that present the
    /// two headline picks together.
    pub fn primaries(&self) -> Vec<&RankedProduct> {
        let mut picks = vec![&self.primary];
        if let Some(secondary) = &self.secondary {
            picks.push(secondary);
        }
        picks
    }
}

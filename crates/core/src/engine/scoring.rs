use crate::domain::product::{BowFamily, Product};
use crate::domain::profile::{Journey, Priority, Profile};

use super::config::{EngineConfig, ScoringWeights};
use super::fallbacks::cmp_price_then_code;

/// A candidate row with its preference score, prior to probability
/// normalization.
#[derive(Clone, Copy, Debug)]
pub struct ScoredProduct<'a> {
    pub product: &'a Product,
    pub score: f64,
}

/// Family preference order under a strong aerial focus, best first.
const AERIAL_FAMILY_ORDER: [BowFamily; 5] = [
    BowFamily::UltimateV2,
    BowFamily::Ultimate,
    BowFamily::Xtreme,
    BowFamily::Pro,
    BowFamily::Mid,
];

/// Family preference order under a strong drag-flick focus, best first.
const DRAGFLICK_FAMILY_ORDER: [BowFamily; 5] = [
    BowFamily::Xtreme,
    BowFamily::UltimateV2,
    BowFamily::Ultimate,
    BowFamily::Pro,
    BowFamily::Mid,
];

/// Score one row against the profile. Higher is better. Soft preferences
/// only — the hard gates already ran in the filter and ladder stages.
pub fn score_product(product: &Product, profile: &Profile, weights: &ScoringWeights) -> f64 {
    let mut score = 0.0;

    let family = product.bow_family();
    let price = product.price_f64().unwrap_or(0.0);
    let carbon = product.carbon();
    let budget = profile.budget_f64();

    // Affordability shaping: reward spending near the ceiling, not below it.
    if budget > 0.0 && price > 0.0 {
        let utilization = (price / budget).clamp(0.0, 1.0);
        score += weights.affordability * utilization.powf(weights.affordability_exponent);
    }

    // Minimum spec by journey: keep entry-level lay-ups out of top picks.
    match profile.journey {
        Journey::Elite if carbon < weights.elite_carbon_floor => {
            score -= weights.elite_carbon_penalty;
        }
        Journey::Evolution if carbon < weights.evolution_carbon_floor => {
            score -= weights.evolution_carbon_penalty;
        }
        _ => {}
    }

    // Declared bow preference, very soft.
    if let (Some(preferred), Some(family)) = (profile.preferred_bow_family(), family.as_ref()) {
        if *family == preferred {
            score += weights.preferred_bow_bonus;
        }
    }

    // Aerial bias: late-bend family rank plus the row's own aerial attribute.
    let aerial_intensity = profile.aerial_intensity();
    if aerial_intensity > 0.0 {
        let rank_bias = family_rank_bias(family.as_ref(), &AERIAL_FAMILY_ORDER);
        score += weights.family_bias * aerial_intensity * rank_bias;
        score += weights.attribute_bias * aerial_intensity * norm01(product.aerial);
    }

    // Drag-flick bias: extreme/concave family rank plus the row's attribute.
    let dragflick_intensity = profile.dragflick_intensity();
    if dragflick_intensity > 0.0 {
        let rank_bias = family_rank_bias(family.as_ref(), &DRAGFLICK_FAMILY_ORDER);
        score += weights.family_bias * dragflick_intensity * rank_bias;
        score += weights.attribute_bias * dragflick_intensity * norm01(product.drag_flick);
    }

    // Light power/touch balance on top of the declared priority.
    match profile.priority {
        Priority::Power => score += weights.priority_focus * norm01(product.power),
        Priority::TouchAndControl => score += weights.priority_focus * norm01(product.touch),
        Priority::Both | Priority::NotSure => {
            score += weights.priority_blend * norm01(product.power);
            score += weights.priority_blend * norm01(product.touch);
        }
    }

    if score.is_finite() {
        score
    } else {
        0.0
    }
}

/// Score and order the candidate set: score descending, then price
/// ascending, then product code, so the outcome never depends on the order
/// rows arrived in.
pub fn rank<'a>(
    candidates: Vec<&'a Product>,
    profile: &Profile,
    config: &EngineConfig,
) -> Vec<ScoredProduct<'a>> {
    let mut scored: Vec<ScoredProduct<'a>> = candidates
        .into_iter()
        .map(|product| ScoredProduct {
            product,
            score: score_product(product, profile, &config.weights),
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| cmp_price_then_code(a.product, b.product))
    });
    scored
}

/// Rank a family against a preference order: 1.0 for the best family down to
/// 0.2 for the last, 0 for anything outside the order.
fn family_rank_bias(family: Option<&BowFamily>, order: &[BowFamily; 5]) -> f64 {
    family
        .and_then(|family| order.iter().position(|candidate| candidate == family))
        .map(|index| (order.len() - index) as f64 / order.len() as f64)
        .unwrap_or(0.0)
}

/// Clamp a 0–10 attribute into 0–1; missing or out-of-range data contributes
/// zero, never an error.
fn norm01(attribute: Option<f64>) -> f64 {
    attribute.map(|value| (value.clamp(0.0, 10.0)) / 10.0).unwrap_or(0.0)
}

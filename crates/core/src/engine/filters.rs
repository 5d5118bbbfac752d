use crate::domain::product::{Product, Tier};
use crate::domain::profile::Profile;

use super::config::EngineConfig;

/// Hard eligibility filter: tier gate, price ceiling with grace, length
/// tolerance, and player-type match, all of which must hold.
///
/// Missing data is permissive for the length and player-type predicates.
/// Price and tier are load-bearing: a row without a parseable tier never
/// passes the gate, and a row without a price fails any active price check.
pub fn apply_hard_filters<'a>(
    catalog: &'a [Product],
    profile: &Profile,
    allowed: &[Tier],
    config: &EngineConfig,
) -> Vec<&'a Product> {
    let price_cap = profile
        .has_budget()
        .then(|| profile.budget_f64() * (1.0 + config.price_grace_pct));

    catalog
        .iter()
        .filter(|row| tier_passes(row, allowed))
        .filter(|row| price_passes(row, price_cap))
        .filter(|row| length_passes(row, profile.length, config.length_tolerance))
        .filter(|row| player_type_passes(row, profile))
        .collect()
}

fn tier_passes(row: &Product, allowed: &[Tier]) -> bool {
    row.tier.map(|tier| allowed.contains(&tier)).unwrap_or(false)
}

fn price_passes(row: &Product, cap: Option<f64>) -> bool {
    match cap {
        Some(cap) => row.price_f64().map(|price| price <= cap).unwrap_or(false),
        None => true,
    }
}

fn length_passes(row: &Product, target: Option<f64>, tolerance: f64) -> bool {
    match (target, row.length) {
        (Some(target), Some(length)) => (length - target).abs() <= tolerance,
        // No target, or a row without length data: unconstrained.
        _ => true,
    }
}

fn player_type_passes(row: &Product, profile: &Profile) -> bool {
    row.player_type.trim().is_empty()
        || row.matches_player_type(profile.player_type.as_str())
}

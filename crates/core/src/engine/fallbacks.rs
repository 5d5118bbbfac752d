use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, Tier};
use crate::domain::profile::Profile;

use super::config::EngineConfig;

/// Per-category counts of relaxation steps that fired for one request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackCounters {
    pub budget_relax: u32,
    pub length_relax: u32,
    pub tier_relax: u32,
    /// Rows returned by the guaranteed final step; zero means the catalog has
    /// no rows for this player type at all.
    pub final_cheapest: u32,
}

/// What the ladder did, forwarded verbatim into logging and the narrative
/// request. Empty exactly when the hard filter already succeeded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackDiagnostics {
    pub relaxed: Vec<String>,
    pub counters: FallbackCounters,
}

impl FallbackDiagnostics {
    pub fn is_empty(&self) -> bool {
        self.relaxed.is_empty()
    }
}

/// Deterministic relaxation ladder. Each step runs only when everything
/// before it came up empty, and a non-empty step short-circuits the rest:
/// widen the price grace rung by rung, then the length tolerance, then the
/// tier window, and finally fall back to the cheapest rows of the player's
/// type regardless of every other constraint.
pub fn apply_fallbacks<'a>(
    catalog: &'a [Product],
    initial: Vec<&'a Product>,
    profile: &Profile,
    allowed: &[Tier],
    config: &EngineConfig,
) -> (Vec<&'a Product>, FallbackDiagnostics) {
    let mut diagnostics = FallbackDiagnostics::default();
    let mut results = initial;

    let budget = profile.budget_f64();
    let cap_at = |grace: f64| profile.has_budget().then(|| budget * (1.0 + grace));
    let last_grace = config.budget_relax_pcts.last().copied().unwrap_or(0.0);

    for grace in &config.budget_relax_pcts {
        if !results.is_empty() {
            break;
        }
        results =
            capped_candidates(catalog, profile, allowed, cap_at(*grace), config.length_tolerance);
        if !results.is_empty() {
            diagnostics.counters.budget_relax += 1;
            diagnostics.relaxed.push(format!("budget(+{:.0}%)", grace * 100.0));
        }
    }

    if results.is_empty() {
        let relaxed = capped_candidates(
            catalog,
            profile,
            allowed,
            cap_at(last_grace),
            config.relaxed_length_tolerance,
        );
        if !relaxed.is_empty() {
            results = relaxed;
            diagnostics.counters.length_relax += 1;
            diagnostics.relaxed.push(format!("length(±{:.1})", config.relaxed_length_tolerance));
        }
    }

    if results.is_empty() {
        let opened = open_tier_window(allowed, &config.tier_order);
        let relaxed = capped_candidates(
            catalog,
            profile,
            &opened,
            cap_at(last_grace),
            config.relaxed_length_tolerance,
        );
        if !relaxed.is_empty() {
            results = relaxed;
            diagnostics.counters.tier_relax += 1;
            diagnostics.relaxed.push("tiers(↑1 step)".to_string());
        }
    }

    if results.is_empty() {
        results = cheapest_of_player_type(catalog, profile, config.final_cheapest_count);
        diagnostics.counters.final_cheapest = results.len() as u32;
        diagnostics.relaxed.push(format!("final_cheapest({})", config.final_cheapest_count));
    }

    (results, diagnostics)
}

/// The shared shape of ladder rungs 1–4: strict player-type and tier gates,
/// a length window, and an optional price cap.
fn capped_candidates<'a>(
    catalog: &'a [Product],
    profile: &Profile,
    allowed: &[Tier],
    cap: Option<f64>,
    length_tolerance: f64,
) -> Vec<&'a Product> {
    catalog
        .iter()
        .filter(|row| row.matches_player_type(profile.player_type.as_str()))
        .filter(|row| row.tier.map(|tier| allowed.contains(&tier)).unwrap_or(false))
        .filter(|row| match (profile.length, row.length) {
            (Some(target), Some(length)) => (length - target).abs() <= length_tolerance,
            _ => true,
        })
        .filter(|row| match cap {
            Some(cap) => row.price_f64().map(|price| price <= cap).unwrap_or(false),
            None => true,
        })
        .collect()
}

/// Tiers up to one step beyond the top of the currently allowed window.
fn open_tier_window(allowed: &[Tier], order: &[Tier]) -> Vec<Tier> {
    let top = allowed
        .iter()
        .filter_map(|tier| order.iter().position(|candidate| candidate == tier))
        .max()
        .unwrap_or(0);
    order[..(top + 2).min(order.len())].to_vec()
}

fn cheapest_of_player_type<'a>(
    catalog: &'a [Product],
    profile: &Profile,
    count: usize,
) -> Vec<&'a Product> {
    let mut rows: Vec<&Product> = catalog
        .iter()
        .filter(|row| row.matches_player_type(profile.player_type.as_str()))
        .collect();
    rows.sort_by(|a, b| cmp_price_then_code(a, b));
    rows.truncate(count);
    rows
}

/// Ascending price, rows without a price last, code as the deterministic
/// final key.
pub(crate) fn cmp_price_then_code(a: &Product, b: &Product) -> Ordering {
    match (a.price, b.price) {
        (Some(left), Some(right)) => left.cmp(&right).then_with(|| a.code.cmp(&b.code)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.code.cmp(&b.code),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::profile::{Journey, PlayerType, Priority};
    use crate::engine::filters::apply_hard_filters;

    #[test]
    fn no_relaxation_when_the_hard_filter_succeeded() {
        let catalog = vec![row("ST-1", Tier::Genesis, 50.0, None)];
        let profile = profile(60.0, None);
        let allowed = vec![Tier::Genesis];
        let initial = apply_hard_filters(&catalog, &profile, &allowed, &EngineConfig::default());
        assert!(!initial.is_empty());

        let (results, diagnostics) =
            apply_fallbacks(&catalog, initial, &profile, &allowed, &EngineConfig::default());

        assert_eq!(results.len(), 1);
        assert!(diagnostics.is_empty());
        assert_eq!(diagnostics.counters, FallbackCounters::default());
    }

    #[test]
    fn first_budget_rung_catches_a_price_just_over_grace() {
        // 150 budget: hard cap 157.50, first rung cap 165.
        let catalog = vec![row("ST-1", Tier::Genesis, 160.0, None)];
        let profile = profile(150.0, None);
        let allowed = vec![Tier::Genesis];

        let (results, diagnostics) =
            apply_fallbacks(&catalog, Vec::new(), &profile, &allowed, &EngineConfig::default());

        assert_eq!(results.len(), 1);
        assert_eq!(diagnostics.relaxed, vec!["budget(+10%)".to_string()]);
        assert_eq!(diagnostics.counters.budget_relax, 1);
        assert_eq!(diagnostics.counters.length_relax, 0);
    }

    #[test]
    fn second_budget_rung_fires_only_after_the_first_is_empty() {
        // 175 sits past the +10% cap (165) but inside +20% (180).
        let catalog = vec![row("ST-1", Tier::Genesis, 175.0, None)];
        let profile = profile(150.0, None);
        let allowed = vec![Tier::Genesis];

        let (results, diagnostics) =
            apply_fallbacks(&catalog, Vec::new(), &profile, &allowed, &EngineConfig::default());

        assert_eq!(results.len(), 1);
        assert_eq!(diagnostics.relaxed, vec!["budget(+20%)".to_string()]);
    }

    #[test]
    fn length_relaxes_to_the_wider_window_before_tiers_open() {
        // In budget, but 0.8" off target: outside ±0.5, inside ±1.0.
        let catalog = vec![row("ST-1", Tier::Genesis, 100.0, Some(37.3))];
        let profile = profile(150.0, Some(36.5));
        let allowed = vec![Tier::Genesis];

        let (results, diagnostics) =
            apply_fallbacks(&catalog, Vec::new(), &profile, &allowed, &EngineConfig::default());

        assert_eq!(results.len(), 1);
        assert_eq!(diagnostics.relaxed, vec!["length(±1.0)".to_string()]);
        assert_eq!(diagnostics.counters.length_relax, 1);
        assert_eq!(diagnostics.counters.budget_relax, 0);
    }

    #[test]
    fn tier_window_opens_one_step_beyond_the_allowed_top() {
        let catalog = vec![row("ST-1", Tier::Intermediate, 100.0, None)];
        let profile = profile(150.0, None);
        let allowed = vec![Tier::Genesis, Tier::Evolution];

        let (results, diagnostics) =
            apply_fallbacks(&catalog, Vec::new(), &profile, &allowed, &EngineConfig::default());

        assert_eq!(results.len(), 1);
        assert_eq!(diagnostics.relaxed, vec!["tiers(↑1 step)".to_string()]);
        assert_eq!(diagnostics.counters.tier_relax, 1);
    }

    #[test]
    fn final_step_returns_the_cheapest_rows_of_the_player_type() {
        let catalog = vec![
            row("ST-EXPENSIVE", Tier::Elite, 400.0, None),
            row("ST-CHEAP", Tier::Elite, 90.0, None),
            row("ST-MID", Tier::Elite, 200.0, None),
            row("ST-PRICY", Tier::Elite, 350.0, None),
        ];
        // Tiny budget, Genesis-only window: every earlier rung is empty.
        let profile = profile(10.0, None);
        let allowed = vec![Tier::Genesis];

        let (results, diagnostics) =
            apply_fallbacks(&catalog, Vec::new(), &profile, &allowed, &EngineConfig::default());

        assert_eq!(diagnostics.relaxed, vec!["final_cheapest(3)".to_string()]);
        assert_eq!(diagnostics.counters.final_cheapest, 3);
        let codes: Vec<&str> = results.iter().map(|row| row.code.as_str()).collect();
        assert_eq!(codes, vec!["ST-CHEAP", "ST-MID", "ST-PRICY"]);
    }

    #[test]
    fn unsupported_player_type_yields_an_empty_final_step() {
        let mut catalog = vec![row("ST-1", Tier::Genesis, 50.0, None)];
        catalog[0].player_type = "Indoor Goalkeeper".to_string();
        let profile = profile(100.0, None);
        let allowed = vec![Tier::Genesis];

        let (results, diagnostics) =
            apply_fallbacks(&catalog, Vec::new(), &profile, &allowed, &EngineConfig::default());

        assert!(results.is_empty());
        assert_eq!(diagnostics.counters.final_cheapest, 0);
        assert_eq!(diagnostics.relaxed, vec!["final_cheapest(3)".to_string()]);
    }

    #[test]
    fn a_successful_rung_short_circuits_everything_below_it() {
        // Both a +10% row and a far-out-of-window row exist; only the first
        // rung should fire and only its token should be recorded.
        let catalog = vec![
            row("ST-NEAR", Tier::Genesis, 160.0, None),
            row("ST-FAR", Tier::Elite, 500.0, None),
        ];
        let profile = profile(150.0, None);
        let allowed = vec![Tier::Genesis];

        let (results, diagnostics) =
            apply_fallbacks(&catalog, Vec::new(), &profile, &allowed, &EngineConfig::default());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].code, "ST-NEAR");
        assert_eq!(diagnostics.relaxed.len(), 1);
    }

    fn profile(budget: f64, length: Option<f64>) -> Profile {
        Profile {
            skill: 2.0,
            journey: Journey::Genesis,
            player_type: PlayerType::OutdoorPlayer,
            priority: Priority::Both,
            preferred_bow: None,
            budget: Decimal::try_from(budget).expect("test budget must convert"),
            length,
            attack: 5.0,
            midfield: 5.0,
            defence: 5.0,
            aerials: 5.0,
            dragflick: 5.0,
        }
    }

    fn row(code: &str, tier: Tier, price: f64, length: Option<f64>) -> Product {
        Product {
            code: code.to_string(),
            description: String::new(),
            player_type: "Outdoor Player".to_string(),
            tier: Some(tier),
            price: Decimal::try_from(price).ok(),
            length,
            bow: None,
            carbon_pct: Some(40.0),
            power: Some(5.0),
            touch: Some(5.0),
            aerial: Some(5.0),
            drag_flick: Some(5.0),
            image_url: None,
            product_url: None,
            is_solid_core: false,
        }
    }
}

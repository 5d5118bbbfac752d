use crate::domain::product::BowFamily;
use crate::domain::profile::Profile;
use crate::domain::slate::{RankedProduct, SelectionSlate};

use super::config::EngineConfig;
use super::scoring::ScoredProduct;

/// When the buyer named an exact length and the ranked set contains exact
/// matches, narrow to those rows; otherwise leave the set unchanged. The
/// hard filter already applied the tolerance window, so this only sharpens
/// an existing constraint.
pub fn narrow_to_exact_length<'a>(
    ranked: Vec<ScoredProduct<'a>>,
    profile: &Profile,
) -> Vec<ScoredProduct<'a>> {
    let Some(target) = profile.length else {
        return ranked;
    };
    let exact: Vec<ScoredProduct<'a>> = ranked
        .iter()
        .filter(|scored| {
            scored
                .product
                .length
                .map(|length| (length - target).abs() < f64::EPSILON)
                .unwrap_or(false)
        })
        .copied()
        .collect();
    if exact.is_empty() {
        ranked
    } else {
        exact
    }
}

/// Pick up to three distinct rows from the ranked set: a primary, a
/// contrasting near-top secondary, and a wildcard outside the families
/// already shown. Pure function of the ordered candidates and the profile's
/// intensity and budget fields.
pub fn select(
    ranked: &[ScoredProduct<'_>],
    profile: &Profile,
    config: &EngineConfig,
) -> Option<SelectionSlate> {
    if ranked.is_empty() {
        return None;
    }

    let probabilities = probabilities(ranked);
    let primary = pick_primary(ranked, profile);
    let secondary = pick_secondary(ranked, &probabilities, primary, profile, config);
    let wildcard = pick_wildcard(ranked, &probabilities, primary, secondary, config);

    let as_ranked = |index: usize| {
        RankedProduct::new(ranked[index].product.clone(), ranked[index].score, probabilities[index])
    };

    Some(SelectionSlate {
        primary: as_ranked(primary),
        secondary: secondary.map(|index| as_ranked(index)),
        wildcard: wildcard.map(|index| as_ranked(index)),
    })
}

/// Min-max normalization of scores into 0–1. A degenerate range (every row
/// scored the same) normalizes to 1.0 everywhere rather than dividing by
/// zero.
fn probabilities(ranked: &[ScoredProduct<'_>]) -> Vec<f64> {
    let min = ranked.iter().map(|scored| scored.score).fold(f64::INFINITY, f64::min);
    let max = ranked.iter().map(|scored| scored.score).fold(f64::NEG_INFINITY, f64::max);
    if max > min {
        ranked.iter().map(|scored| (scored.score - min) / (max - min)).collect()
    } else {
        vec![1.0; ranked.len()]
    }
}

/// Top-ranked row, unless a style focus promotes a specialist bow: a strong
/// drag-flick focus prefers the first `xtreme` row, and a strong aerial
/// focus (without drag-flick) prefers the first `ultimate v2` row.
fn pick_primary(ranked: &[ScoredProduct<'_>], profile: &Profile) -> usize {
    let first_with_family = |family: BowFamily| {
        ranked.iter().position(|scored| scored.product.bow_family() == Some(family.clone()))
    };

    if profile.dragflick_intensity() > 0.0 {
        if let Some(index) = first_with_family(BowFamily::Xtreme) {
            return index;
        }
    } else if profile.aerial_intensity() > 0.0 {
        if let Some(index) = first_with_family(BowFamily::UltimateV2) {
            return index;
        }
    }
    0
}

fn pick_secondary(
    ranked: &[ScoredProduct<'_>],
    probabilities: &[f64],
    primary: usize,
    profile: &Profile,
    config: &EngineConfig,
) -> Option<usize> {
    let top = ranked[primary].product;
    let top_probability = probabilities[primary];
    let top_family = top.bow_family();
    let top_carbon = top.carbon();
    let near_floor = (top_probability - config.near_top_window).max(0.0);
    let prefer_solid_core_flicker = profile.dragflick_intensity() > 0.0 && profile.has_budget();

    for (index, scored) in ranked.iter().enumerate() {
        if scored.product == top {
            continue;
        }
        let near = probabilities[index] >= near_floor;

        if prefer_solid_core_flicker
            && near
            && scored.product.bow_family() == Some(BowFamily::UltimateV2)
            && scored.product.is_solid_core
        {
            return Some(index);
        }

        let contrasts = scored.product.bow_family() != top_family
            || (scored.product.carbon() - top_carbon).abs() >= config.contrast_carbon_delta;
        if near && contrasts {
            return Some(index);
        }
    }

    // No near-top contrast anywhere: settle for the next-best distinct row.
    ranked
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, scored)| scored.product != top)
        .map(|(index, _)| index)
}

fn pick_wildcard(
    ranked: &[ScoredProduct<'_>],
    probabilities: &[f64],
    primary: usize,
    secondary: Option<usize>,
    config: &EngineConfig,
) -> Option<usize> {
    if ranked.len() <= 2 {
        return None;
    }

    let top = ranked[primary].product;
    let second = secondary.map(|index| ranked[index].product);
    let floor = (probabilities[primary] - config.wildcard_window).max(0.0);

    let mut used_families = vec![top.bow_family()];
    if let Some(second) = second {
        used_families.push(second.bow_family());
    }

    for (index, scored) in ranked.iter().enumerate() {
        if scored.product == top || second.is_some_and(|second| scored.product == second) {
            continue;
        }
        if probabilities[index] >= floor
            && !used_families.contains(&scored.product.bow_family())
            && !scored.product.is_solid_core
        {
            return Some(index);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::product::{Product, Tier};
    use crate::domain::profile::{Journey, PlayerType, Priority};
    use crate::engine::scoring::rank;

    #[test]
    fn default_primary_is_the_top_ranked_row() {
        let products = three_distinct_rows();
        let profile = profile_fixture();
        let (slate, _) = run_selection(&products, &profile);

        assert_eq!(slate.primary.product.code, "ST-TOP");
    }

    #[test]
    fn high_dragflick_promotes_the_first_xtreme_row() {
        // The xtreme row ranks last of three by raw score; the override still
        // lifts it into the primary slot.
        let products = vec![
            scored_row("ST-TOP", "Ultimate", 200.0, 90.0, false),
            scored_row("ST-2ND", "Pro", 190.0, 80.0, false),
            scored_row("ST-XT", "Xtreme", 150.0, 60.0, false),
        ];
        let mut profile = profile_fixture();
        profile.dragflick = 9.0;
        let (slate, _) = run_selection(&products, &profile);

        assert_eq!(slate.primary.product.code, "ST-XT");
    }

    #[test]
    fn high_aerials_prefer_ultimate_v2_only_without_dragflick() {
        let products = vec![
            scored_row("ST-TOP", "Pro", 200.0, 90.0, false),
            scored_row("ST-V2", "Ultimate V2", 150.0, 80.0, false),
            scored_row("ST-XT", "Xtreme", 140.0, 70.0, false),
        ];

        let mut profile = profile_fixture();
        profile.aerials = 9.0;
        let (slate, _) = run_selection(&products, &profile);
        assert_eq!(slate.primary.product.code, "ST-V2");

        // With drag-flick also high, the xtreme override wins instead.
        profile.dragflick = 9.0;
        let (slate, _) = run_selection(&products, &profile);
        assert_eq!(slate.primary.product.code, "ST-XT");
    }

    #[test]
    fn secondary_contrasts_with_the_primary() {
        let products = vec![
            scored_row("ST-TOP", "Ultimate", 200.0, 90.0, false),
            scored_row("ST-TWIN", "Ultimate", 199.0, 91.0, false),
            scored_row("ST-ALT", "Pro", 198.0, 88.0, false),
            anchor_row(),
        ];
        let profile = profile_fixture();
        let (slate, _) = run_selection(&products, &profile);

        // ST-TWIN shares the primary's family and sits within 10 carbon
        // points, so the contrasting Pro row is the secondary.
        let secondary = slate.secondary.expect("near-top candidates must yield a secondary");
        assert_eq!(secondary.product.code, "ST-ALT");
    }

    #[test]
    fn carbon_gap_alone_is_enough_contrast() {
        let products = vec![
            scored_row("ST-TOP", "Ultimate", 200.0, 90.0, false),
            scored_row("ST-LOWC", "Ultimate", 199.0, 70.0, false),
            anchor_row(),
        ];
        let profile = profile_fixture();
        let (slate, _) = run_selection(&products, &profile);

        let secondary = slate.secondary.expect("contrasting row expected");
        assert_eq!(secondary.product.code, "ST-LOWC");
    }

    #[test]
    fn secondary_falls_back_to_next_best_without_contrast() {
        let products = vec![
            scored_row("ST-TOP", "Ultimate", 200.0, 90.0, false),
            scored_row("ST-TWIN", "Ultimate", 199.0, 91.0, false),
        ];
        let profile = profile_fixture();
        let (slate, _) = run_selection(&products, &profile);

        let secondary = slate.secondary.expect("fallback secondary expected");
        assert_eq!(secondary.product.code, "ST-TWIN");
    }

    #[test]
    fn flicker_with_budget_prefers_a_solid_core_v2_secondary() {
        let products = vec![
            scored_row("ST-XT", "Xtreme", 200.0, 90.0, false),
            scored_row("ST-ALT", "Pro", 199.0, 60.0, false),
            scored_row("ST-V2SC", "Ultimate V2", 198.0, 88.0, true),
        ];
        let mut profile = profile_fixture();
        profile.dragflick = 9.0;
        let (slate, _) = run_selection(&products, &profile);

        assert_eq!(slate.primary.product.code, "ST-XT");
        let secondary = slate.secondary.expect("secondary expected");
        assert_eq!(secondary.product.code, "ST-V2SC");
    }

    #[test]
    fn wildcard_skips_used_families_and_solid_core() {
        let products = vec![
            scored_row("ST-TOP", "Ultimate", 200.0, 90.0, false),
            scored_row("ST-2ND", "Pro", 199.0, 80.0, false),
            scored_row("ST-SC", "Mid", 198.0, 70.0, true),
            scored_row("ST-WILD", "Xtreme", 197.0, 72.0, false),
            anchor_row(),
        ];
        let profile = profile_fixture();
        let (slate, _) = run_selection(&products, &profile);

        let wildcard = slate.wildcard.expect("an eligible wildcard exists");
        assert_eq!(wildcard.product.code, "ST-WILD");
    }

    #[test]
    fn wildcard_is_absent_when_nothing_qualifies() {
        // Third row repeats the primary family; no other families remain.
        let products = vec![
            scored_row("ST-TOP", "Ultimate", 200.0, 90.0, false),
            scored_row("ST-2ND", "Pro", 199.0, 80.0, false),
            scored_row("ST-3RD", "Ultimate", 198.0, 89.0, false),
        ];
        let profile = profile_fixture();
        let (slate, _) = run_selection(&products, &profile);

        assert!(slate.wildcard.is_none());
    }

    #[test]
    fn two_candidates_never_produce_a_wildcard() {
        let products = vec![
            scored_row("ST-TOP", "Ultimate", 200.0, 90.0, false),
            scored_row("ST-2ND", "Pro", 199.0, 80.0, false),
        ];
        let profile = profile_fixture();
        let (slate, _) = run_selection(&products, &profile);

        assert!(slate.secondary.is_some());
        assert!(slate.wildcard.is_none());
    }

    #[test]
    fn equal_scores_normalize_to_probability_one() {
        let products = vec![
            scored_row("ST-A", "Ultimate", 150.0, 80.0, false),
            scored_row("ST-B", "Pro", 150.0, 80.0, false),
            scored_row("ST-C", "Mid", 150.0, 80.0, false),
        ];
        // Zero budget keeps affordability silent so all three rows tie.
        let mut profile = profile_fixture();
        profile.budget = Decimal::ZERO;
        let (slate, probabilities) = run_selection(&products, &profile);

        assert!(probabilities.iter().all(|probability| (probability - 1.0).abs() < 1e-9));
        assert_eq!(slate.primary.probability, 1.0);
    }

    #[test]
    fn slate_members_are_pairwise_distinct() {
        let products = three_distinct_rows();
        let profile = profile_fixture();
        let (slate, _) = run_selection(&products, &profile);

        let secondary = slate.secondary.expect("secondary expected");
        let wildcard = slate.wildcard.expect("wildcard expected");
        assert_ne!(slate.primary.product, secondary.product);
        assert_ne!(slate.primary.product, wildcard.product);
        assert_ne!(secondary.product, wildcard.product);
    }

    #[test]
    fn identical_records_with_distinct_codes_stay_distinct() {
        let mut twin = scored_row("ST-A", "Ultimate", 200.0, 90.0, false);
        twin.code = "ST-B".to_string();
        let products =
            vec![scored_row("ST-A", "Ultimate", 200.0, 90.0, false), twin];
        let profile = profile_fixture();
        let (slate, _) = run_selection(&products, &profile);

        let secondary = slate.secondary.expect("the twin row is a distinct pick");
        assert_eq!(secondary.product.code, "ST-B");
    }

    #[test]
    fn selection_is_stable_across_input_order() {
        let products = vec![
            scored_row("ST-TOP", "Ultimate", 200.0, 90.0, false),
            scored_row("ST-2ND", "Pro", 185.0, 78.0, false),
            scored_row("ST-3RD", "Mid", 170.0, 65.0, false),
            scored_row("ST-4TH", "Xtreme", 160.0, 55.0, false),
        ];
        let profile = profile_fixture();

        let pick = |rows: Vec<&Product>| {
            let config = EngineConfig::default();
            let ranked = rank(rows, &profile, &config);
            select(&ranked, &profile, &config).expect("candidates exist")
        };

        let forward = pick(products.iter().collect());
        let reversed = pick(products.iter().rev().collect());
        assert_eq!(forward, reversed);
    }

    #[test]
    fn exact_length_narrowing_keeps_only_exact_rows_when_present() {
        let mut short = scored_row("ST-36", "Ultimate", 200.0, 90.0, false);
        short.length = Some(36.5);
        let mut long = scored_row("ST-37", "Pro", 190.0, 80.0, false);
        long.length = Some(37.0);

        let mut profile = profile_fixture();
        profile.length = Some(36.5);
        let config = EngineConfig::default();

        let ranked = rank(vec![&short, &long], &profile, &config);
        let narrowed = narrow_to_exact_length(ranked, &profile);
        assert_eq!(narrowed.len(), 1);
        assert_eq!(narrowed[0].product.code, "ST-36");

        // No exact match: the set passes through untouched.
        profile.length = Some(38.0);
        let ranked = rank(vec![&short, &long], &profile, &config);
        let narrowed = narrow_to_exact_length(ranked, &profile);
        assert_eq!(narrowed.len(), 2);
    }

    fn run_selection(products: &[Product], profile: &Profile) -> (SelectionSlate, Vec<f64>) {
        let config = EngineConfig::default();
        let ranked = rank(products.iter().collect(), profile, &config);
        let probabilities = super::probabilities(&ranked);
        let slate = select(&ranked, profile, &config).expect("candidates exist");
        (slate, probabilities)
    }

    fn three_distinct_rows() -> Vec<Product> {
        vec![
            scored_row("ST-TOP", "Ultimate", 200.0, 90.0, false),
            scored_row("ST-2ND", "Pro", 190.0, 78.0, false),
            scored_row("ST-3RD", "Mid", 180.0, 72.0, false),
            anchor_row(),
        ]
    }

    /// A clearly-worse row that pins the bottom of the min-max range so the
    /// leading rows all sit near the top probability.
    fn anchor_row() -> Product {
        scored_row("ST-ANCHOR", "Standard", 60.0, 30.0, false)
    }

    /// Rows priced under a 210 budget so raw score tracks price, keeping the
    /// rank order of these fixtures obvious.
    fn scored_row(code: &str, bow: &str, price: f64, carbon: f64, solid_core: bool) -> Product {
        Product {
            code: code.to_string(),
            description: String::new(),
            player_type: "Outdoor Player".to_string(),
            tier: Some(Tier::Elite),
            price: Decimal::try_from(price).ok(),
            length: None,
            bow: Some(bow.to_string()),
            carbon_pct: Some(carbon),
            power: Some(5.0),
            touch: Some(5.0),
            aerial: Some(5.0),
            drag_flick: Some(5.0),
            image_url: None,
            product_url: None,
            is_solid_core: solid_core,
        }
    }

    fn profile_fixture() -> Profile {
        Profile {
            skill: 9.0,
            journey: Journey::Elite,
            player_type: PlayerType::OutdoorPlayer,
            priority: Priority::Both,
            preferred_bow: None,
            budget: Decimal::from(210),
            length: None,
            attack: 5.0,
            midfield: 5.0,
            defence: 5.0,
            aerials: 5.0,
            dragflick: 5.0,
        }
    }
}

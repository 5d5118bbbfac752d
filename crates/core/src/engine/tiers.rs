use crate::domain::product::Tier;

/// What the tier gate was given: a journey/tier label from the request, or a
/// raw numeric skill.
#[derive(Clone, Debug, PartialEq)]
pub enum TierIndicator {
    Label(String),
    Skill(f64),
}

/// Visibility gate: which tiers this buyer may be shown.
///
/// Never fails — anything unrecognized lands in the lowest band so a broken
/// request still sees entry-level product instead of an error.
pub fn allowed_tiers(indicator: &TierIndicator, order: &[Tier]) -> Vec<Tier> {
    match indicator {
        TierIndicator::Label(label) => {
            match label.trim().to_ascii_lowercase().as_str() {
                "genesis" => vec![Tier::Genesis],
                "evolution" => vec![Tier::Genesis, Tier::Evolution],
                "intermediate" | "performance" => {
                    vec![Tier::Evolution, Tier::Intermediate, Tier::Performance]
                }
                "elite" => order.to_vec(),
                // Not a known label; fall through to the numeric bands.
                other => allowed_tiers_for_skill(other.parse::<f64>().unwrap_or(0.0), order),
            }
        }
        TierIndicator::Skill(skill) => allowed_tiers_for_skill(*skill, order),
    }
}

fn allowed_tiers_for_skill(skill: f64, order: &[Tier]) -> Vec<Tier> {
    let skill = if skill.is_finite() { skill } else { 0.0 };
    if skill <= 3.0 {
        vec![Tier::Genesis]
    } else if skill <= 6.0 {
        vec![Tier::Genesis, Tier::Evolution]
    } else if skill <= 8.0 {
        vec![Tier::Evolution, Tier::Intermediate, Tier::Performance]
    } else {
        order.to_vec()
    }
}

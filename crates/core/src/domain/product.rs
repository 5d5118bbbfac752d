use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Eligibility band for a catalog row, ordered from entry level to top end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Genesis,
    Evolution,
    Intermediate,
    Performance,
    Elite,
}

impl Tier {
    /// The reference ordering, entry level first.
    pub const ORDER: [Tier; 5] =
        [Tier::Genesis, Tier::Evolution, Tier::Intermediate, Tier::Performance, Tier::Elite];

    /// Case-insensitive parse. Returns `None` for anything outside the known bands.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "genesis" => Some(Self::Genesis),
            "evolution" => Some(Self::Evolution),
            "intermediate" => Some(Self::Intermediate),
            "performance" => Some(Self::Performance),
            "elite" => Some(Self::Elite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Genesis => "Genesis",
            Self::Evolution => "Evolution",
            Self::Intermediate => "Intermediate",
            Self::Performance => "Performance",
            Self::Elite => "Elite",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized bow-shape family, used for soft scoring bias and slate contrast.
///
/// Legacy labels fold into the families the selection rules know about
/// (`standard`/`standard bend` behave as mid bends, `dsh` behaves as the
/// extreme-low specialist head); anything else passes through untouched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BowFamily {
    Mid,
    Pro,
    Ultimate,
    UltimateV2,
    Xtreme,
    Other(String),
}

impl BowFamily {
    /// Normalize a raw bow label. Empty input means the row carries no bow data.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return None;
        }
        Some(match normalized.as_str() {
            "mid" | "standard" | "standard bend" => Self::Mid,
            "pro" => Self::Pro,
            "ultimate" => Self::Ultimate,
            "ultimate v2" => Self::UltimateV2,
            "xtreme" | "dsh" => Self::Xtreme,
            _ => Self::Other(normalized),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Mid => "mid",
            Self::Pro => "pro",
            Self::Ultimate => "ultimate",
            Self::UltimateV2 => "ultimate v2",
            Self::Xtreme => "xtreme",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for BowFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog row.
///
/// Every numeric field a row might be missing is an explicit `Option`; the
/// engine resolves absent values per predicate (pass) or per scoring term
/// (zero) instead of failing. `price` and `tier` are the load-bearing
/// eligibility fields: a row without them cannot clear the hard filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub player_type: String,
    pub tier: Option<Tier>,
    pub price: Option<Decimal>,
    pub length: Option<f64>,
    pub bow: Option<String>,
    pub carbon_pct: Option<f64>,
    pub power: Option<f64>,
    pub touch: Option<f64>,
    pub aerial: Option<f64>,
    pub drag_flick: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub product_url: Option<String>,
    #[serde(default)]
    pub is_solid_core: bool,
}

impl Product {
    /// Normalized bow family, when the row carries a bow label.
    pub fn bow_family(&self) -> Option<BowFamily> {
        self.bow.as_deref().and_then(BowFamily::parse)
    }

    /// Price as a float for ratio math. `None` when the row has no price.
    pub fn price_f64(&self) -> Option<f64> {
        self.price.and_then(|price| price.to_f64()).filter(|price| price.is_finite())
    }

    /// Carbon percentage with the missing-data default applied.
    pub fn carbon(&self) -> f64 {
        self.carbon_pct.unwrap_or(0.0)
    }

    /// Case-insensitive player-type match. Rows without a player type are
    /// treated as unmatchable rather than universal.
    pub fn matches_player_type(&self, player_type: &str) -> bool {
        !self.player_type.trim().is_empty()
            && self.player_type.trim().eq_ignore_ascii_case(player_type.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_parse_is_case_insensitive_and_strict() {
        assert_eq!(Tier::parse("elite"), Some(Tier::Elite));
        assert_eq!(Tier::parse("  Genesis "), Some(Tier::Genesis));
        assert_eq!(Tier::parse("legend"), None);
        assert_eq!(Tier::parse(""), None);
    }

    #[test]
    fn bow_family_folds_legacy_labels() {
        assert_eq!(BowFamily::parse("Standard Bend"), Some(BowFamily::Mid));
        assert_eq!(BowFamily::parse("DSH"), Some(BowFamily::Xtreme));
        assert_eq!(BowFamily::parse("Ultimate V2"), Some(BowFamily::UltimateV2));
        assert_eq!(BowFamily::parse("znake"), Some(BowFamily::Other("znake".to_string())));
        assert_eq!(BowFamily::parse("  "), None);
    }

    #[test]
    fn player_type_match_ignores_case_but_not_absence() {
        let mut product = product_fixture();
        product.player_type = "Outdoor Player".to_string();
        assert!(product.matches_player_type("outdoor player"));
        assert!(!product.matches_player_type("Indoor Player"));

        product.player_type = String::new();
        assert!(!product.matches_player_type("Outdoor Player"));
    }

    fn product_fixture() -> Product {
        Product {
            code: "ST-100".to_string(),
            description: String::new(),
            player_type: String::new(),
            tier: Some(Tier::Genesis),
            price: Some(Decimal::new(9_995, 2)),
            length: Some(36.5),
            bow: Some("Mid".to_string()),
            carbon_pct: Some(30.0),
            power: Some(5.0),
            touch: Some(5.0),
            aerial: Some(3.0),
            drag_flick: Some(3.0),
            image_url: None,
            product_url: None,
            is_solid_core: false,
        }
    }
}

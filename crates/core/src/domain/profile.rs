use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::BowFamily;

/// Buyer-facing label for a skill band, derived once per request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Journey {
    Genesis,
    Evolution,
    Elite,
}

impl Journey {
    /// Skill 0–10 to journey band.
    pub fn from_skill(skill: f64) -> Self {
        if skill <= 3.0 {
            Self::Genesis
        } else if skill <= 7.0 {
            Self::Evolution
        } else {
            Self::Elite
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Genesis => "Genesis",
            Self::Evolution => "Evolution",
            Self::Elite => "Elite",
        }
    }
}

impl fmt::Display for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerType {
    #[serde(rename = "Outdoor Player")]
    OutdoorPlayer,
    #[serde(rename = "Outdoor Goalkeeper")]
    OutdoorGoalkeeper,
    #[serde(rename = "Indoor Player")]
    IndoorPlayer,
    #[serde(rename = "Indoor Goalkeeper")]
    IndoorGoalkeeper,
}

impl PlayerType {
    /// Map the request's free-form category onto the catalog vocabulary.
    /// Unknown categories fall back to the outdoor field player.
    pub fn from_category(category: &str) -> Self {
        match category.trim().to_ascii_lowercase().as_str() {
            "outdoor goalkeeper" => Self::OutdoorGoalkeeper,
            "indoor player" => Self::IndoorPlayer,
            "indoor goalkeeper" => Self::IndoorGoalkeeper,
            _ => Self::OutdoorPlayer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutdoorPlayer => "Outdoor Player",
            Self::OutdoorGoalkeeper => "Outdoor Goalkeeper",
            Self::IndoorPlayer => "Indoor Player",
            Self::IndoorGoalkeeper => "Indoor Goalkeeper",
        }
    }
}

impl fmt::Display for PlayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared style preference. Anything unrecognized reads as "Both" so a
/// malformed request still gets the blended nudge instead of an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Power,
    #[serde(rename = "Touch and Control")]
    TouchAndControl,
    Both,
    #[serde(rename = "Not Sure")]
    NotSure,
}

impl Priority {
    pub fn from_input(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "power" => Self::Power,
            "touch" | "touch and control" => Self::TouchAndControl,
            "unknown" | "not sure" => Self::NotSure,
            _ => Self::Both,
        }
    }
}

/// One buyer request, fully derived and immutable for the rest of the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub skill: f64,
    pub journey: Journey,
    pub player_type: PlayerType,
    pub priority: Priority,
    pub preferred_bow: Option<String>,
    pub budget: Decimal,
    pub length: Option<f64>,
    pub attack: f64,
    pub midfield: f64,
    pub defence: f64,
    pub aerials: f64,
    pub dragflick: f64,
}

impl Profile {
    /// Aerial bias only kicks in above importance 7.
    pub fn aerial_intensity(&self) -> f64 {
        ((self.aerials - 7.0) / 3.0).max(0.0)
    }

    /// Drag-flick bias only kicks in above importance 7.
    pub fn dragflick_intensity(&self) -> f64 {
        ((self.dragflick - 7.0) / 3.0).max(0.0)
    }

    pub fn budget_f64(&self) -> f64 {
        self.budget.to_f64().filter(|value| value.is_finite()).unwrap_or(0.0)
    }

    pub fn has_budget(&self) -> bool {
        self.budget > Decimal::ZERO
    }

    /// Declared bow preference normalized to a family, when recognizable.
    pub fn preferred_bow_family(&self) -> Option<BowFamily> {
        self.preferred_bow.as_deref().and_then(BowFamily::parse)
    }
}

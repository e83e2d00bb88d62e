//! Urgency score and color band.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum score classified as Red.
pub const RED_THRESHOLD: u32 = 8;

/// Minimum score classified as Yellow.
pub const YELLOW_THRESHOLD: u32 = 4;

/// Color band shown on the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UrgencyColor {
    Green,
    Yellow,
    Red,
}

impl UrgencyColor {
    /// Classify a score into its band.
    pub fn from_score(score: u32) -> Self {
        if score >= RED_THRESHOLD {
            UrgencyColor::Red
        } else if score >= YELLOW_THRESHOLD {
            UrgencyColor::Yellow
        } else {
            UrgencyColor::Green
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyColor::Green => "Green",
            UrgencyColor::Yellow => "Yellow",
            UrgencyColor::Red => "Red",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Green" => Some(UrgencyColor::Green),
            "Yellow" => Some(UrgencyColor::Yellow),
            "Red" => Some(UrgencyColor::Red),
            _ => None,
        }
    }
}

impl std::fmt::Display for UrgencyColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored color disagrees with the stored score.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("urgency color {color} does not match score {score} (expected {expected})")]
pub struct UrgencyMismatch {
    pub score: u32,
    pub color: UrgencyColor,
    pub expected: UrgencyColor,
}

/// An urgency score together with its derived color.
///
/// Only constructible from a score, so the color can never drift from it.
/// Deserializing a record whose color disagrees with its score fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "UrgencyRepr", into = "UrgencyRepr")]
pub struct Urgency {
    score: u32,
    color: UrgencyColor,
}

impl Urgency {
    pub fn from_score(score: u32) -> Self {
        Self {
            score,
            color: UrgencyColor::from_score(score),
        }
    }

    /// Rebuild from persisted parts, checking consistency.
    pub fn from_parts(score: u32, color: UrgencyColor) -> Result<Self, UrgencyMismatch> {
        let expected = UrgencyColor::from_score(score);
        if expected != color {
            return Err(UrgencyMismatch {
                score,
                color,
                expected,
            });
        }
        Ok(Self { score, color })
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn color(&self) -> UrgencyColor {
        self.color
    }
}

#[derive(Serialize, Deserialize)]
struct UrgencyRepr {
    score: u32,
    color: UrgencyColor,
}

impl TryFrom<UrgencyRepr> for Urgency {
    type Error = UrgencyMismatch;

    fn try_from(repr: UrgencyRepr) -> Result<Self, Self::Error> {
        Urgency::from_parts(repr.score, repr.color)
    }
}

impl From<Urgency> for UrgencyRepr {
    fn from(urgency: Urgency) -> Self {
        Self {
            score: urgency.score,
            color: urgency.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(UrgencyColor::from_score(0), UrgencyColor::Green);
        assert_eq!(UrgencyColor::from_score(3), UrgencyColor::Green);
        assert_eq!(UrgencyColor::from_score(4), UrgencyColor::Yellow);
        assert_eq!(UrgencyColor::from_score(7), UrgencyColor::Yellow);
        assert_eq!(UrgencyColor::from_score(8), UrgencyColor::Red);
        assert_eq!(UrgencyColor::from_score(31), UrgencyColor::Red);
    }

    #[test]
    fn test_from_parts_rejects_mismatch() {
        assert!(Urgency::from_parts(6, UrgencyColor::Yellow).is_ok());
        let err = Urgency::from_parts(9, UrgencyColor::Green).unwrap_err();
        assert_eq!(err.expected, UrgencyColor::Red);
    }

    #[test]
    fn test_deserialize_checks_consistency() {
        let ok: Urgency = serde_json::from_str(r#"{"score":10,"color":"Red"}"#).unwrap();
        assert_eq!(ok.color(), UrgencyColor::Red);

        let bad = serde_json::from_str::<Urgency>(r#"{"score":2,"color":"Red"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_color_round_trip_str() {
        for color in [UrgencyColor::Green, UrgencyColor::Yellow, UrgencyColor::Red] {
            assert_eq!(UrgencyColor::parse(color.as_str()), Some(color));
        }
        assert_eq!(UrgencyColor::parse("red"), None);
    }
}

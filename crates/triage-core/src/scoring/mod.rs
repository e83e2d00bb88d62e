//! Deterministic triage scoring.
//!
//! Additive rules, each evaluated independently and summed:
//!
//! | Rule                               | Points |
//! |------------------------------------|--------|
//! | symptom "chest pain"               | +4     |
//! | symptom "shortness of breath"      | +4     |
//! | temperature > 101 °F               | +2     |
//! | SpO2 < 90 %                        | +3     |
//! | heart rate > 120 bpm               | +2     |
//! | respiration rate > 24 /min         | +2     |
//! | unconscious                        | +5     |
//! | semi-conscious                     | +3     |
//! | age > 65                           | +2     |
//! | first comorbidity present, ≠ none  | +2     |
//!
//! Score ≥ 8 is Red, 4..=7 Yellow, otherwise Green. A vital that is blank or
//! unparsable never triggers a rule.

mod parse;

pub use parse::*;

use serde::{Deserialize, Serialize};

use crate::models::{Consciousness, PatientInput, Urgency, UrgencyColor};

/// Symptom tag that triggers [`TriageRule::ChestPain`].
pub const CHEST_PAIN: &str = "chest pain";

/// Symptom tag that triggers [`TriageRule::ShortnessOfBreath`].
pub const SHORTNESS_OF_BREATH: &str = "shortness of breath";

/// Comorbidity sentinel meaning "no comorbidity".
pub const NO_COMORBIDITY: &str = "none";

/// One scoring rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TriageRule {
    ChestPain,
    ShortnessOfBreath,
    Fever,
    Hypoxemia,
    Tachycardia,
    Tachypnea,
    Unconscious,
    SemiConscious,
    Elderly,
    Comorbidity,
}

impl TriageRule {
    /// All rules in table order.
    pub const ALL: [TriageRule; 10] = [
        TriageRule::ChestPain,
        TriageRule::ShortnessOfBreath,
        TriageRule::Fever,
        TriageRule::Hypoxemia,
        TriageRule::Tachycardia,
        TriageRule::Tachypnea,
        TriageRule::Unconscious,
        TriageRule::SemiConscious,
        TriageRule::Elderly,
        TriageRule::Comorbidity,
    ];

    pub fn points(&self) -> u32 {
        match self {
            TriageRule::ChestPain => 4,
            TriageRule::ShortnessOfBreath => 4,
            TriageRule::Fever => 2,
            TriageRule::Hypoxemia => 3,
            TriageRule::Tachycardia => 2,
            TriageRule::Tachypnea => 2,
            TriageRule::Unconscious => 5,
            TriageRule::SemiConscious => 3,
            TriageRule::Elderly => 2,
            TriageRule::Comorbidity => 2,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TriageRule::ChestPain => "Chest pain in symptoms",
            TriageRule::ShortnessOfBreath => "Shortness of breath in symptoms",
            TriageRule::Fever => "Temperature > 101°F",
            TriageRule::Hypoxemia => "SpO2 < 90%",
            TriageRule::Tachycardia => "Heart Rate > 120 bpm",
            TriageRule::Tachypnea => "Respiratory Rate > 24 /min",
            TriageRule::Unconscious => "Consciousness 'Unconscious'",
            TriageRule::SemiConscious => "Consciousness 'Semi-conscious'",
            TriageRule::Elderly => "Age > 65",
            TriageRule::Comorbidity => "Any comorbidities (first entry not 'none')",
        }
    }

    /// Whether this rule fires for the given submission.
    pub fn applies(&self, input: &PatientInput) -> bool {
        match self {
            TriageRule::ChestPain => input.has_symptom(CHEST_PAIN),
            TriageRule::ShortnessOfBreath => input.has_symptom(SHORTNESS_OF_BREATH),
            TriageRule::Fever => parse_float(&input.temperature_f).is_some_and(|t| t > 101.0),
            TriageRule::Hypoxemia => {
                parse_float(&input.oxygen_saturation).is_some_and(|o2| o2 < 90.0)
            }
            TriageRule::Tachycardia => parse_int(&input.heart_rate_bpm).is_some_and(|hr| hr > 120),
            TriageRule::Tachypnea => parse_int(&input.respiration_rate).is_some_and(|rr| rr > 24),
            TriageRule::Unconscious => input.consciousness == Some(Consciousness::Unconscious),
            TriageRule::SemiConscious => input.consciousness == Some(Consciousness::SemiConscious),
            TriageRule::Elderly => parse_int(&input.age).is_some_and(|age| age > 65),
            // Only the first entry is inspected: ["none", "diabetes"] scores nothing
            TriageRule::Comorbidity => input
                .comorbidities
                .first()
                .is_some_and(|first| first != NO_COMORBIDITY),
        }
    }
}

impl std::fmt::Display for TriageRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: +{} points", self.description(), self.points())
    }
}

/// A triggered rule and the points it contributed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreFactor {
    pub rule: TriageRule,
    pub points: u32,
}

/// Full scoring result with its breakdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageAssessment {
    pub urgency: Urgency,
    /// Triggered rules in table order; points sum to the score
    pub factors: Vec<ScoreFactor>,
}

impl TriageAssessment {
    pub fn score(&self) -> u32 {
        self.urgency.score()
    }

    pub fn color(&self) -> UrgencyColor {
        self.urgency.color()
    }
}

/// Score a submission and keep the list of triggered rules.
pub fn assess(input: &PatientInput) -> TriageAssessment {
    let factors: Vec<ScoreFactor> = TriageRule::ALL
        .iter()
        .filter(|rule| rule.applies(input))
        .map(|rule| ScoreFactor {
            rule: *rule,
            points: rule.points(),
        })
        .collect();

    let score = factors.iter().map(|f| f.points).sum();

    TriageAssessment {
        urgency: Urgency::from_score(score),
        factors,
    }
}

/// Score a submission.
pub fn score(input: &PatientInput) -> Urgency {
    assess(input).urgency
}

/// Map a score to its color band.
pub fn classify(score: u32) -> UrgencyColor {
    UrgencyColor::from_score(score)
}

//! Raw intake submission.

use serde::{Deserialize, Serialize};

/// Patient gender as selected on the intake form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    /// Parse a form value. Blank or unknown values are unset.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            "Other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Level of consciousness.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Consciousness {
    Alert,
    #[serde(rename = "Semi-conscious")]
    SemiConscious,
    Unconscious,
}

impl Consciousness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Consciousness::Alert => "Alert",
            Consciousness::SemiConscious => "Semi-conscious",
            Consciousness::Unconscious => "Unconscious",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "Alert" => Some(Consciousness::Alert),
            "Semi-conscious" => Some(Consciousness::SemiConscious),
            "Unconscious" => Some(Consciousness::Unconscious),
            _ => None,
        }
    }
}

/// A raw triage submission.
///
/// Numeric fields are kept as entered so partial or blank entries survive
/// until scoring, which parses them leniently.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatientInput {
    /// Display id, e.g. "P0007"
    pub patient_id: String,
    pub age: String,
    pub gender: Option<Gender>,
    /// Only meaningful when gender is Female
    pub pregnancy_status: bool,
    #[serde(rename = "temperature_F")]
    pub temperature_f: String,
    pub heart_rate_bpm: String,
    pub oxygen_saturation: String,
    pub bp_systolic: String,
    pub bp_diastolic: String,
    pub respiration_rate: String,
    /// Symptom tags, matched case-sensitively during scoring
    pub symptoms: Vec<String>,
    pub consciousness: Option<Consciousness>,
    /// Ordered comorbidity tags; "none" is an explicit sentinel
    pub comorbidities: Vec<String>,
}

impl PatientInput {
    /// Create an empty submission for a display id.
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            ..Default::default()
        }
    }

    /// Add a symptom tag. Blank and duplicate tags are ignored.
    pub fn add_symptom(&mut self, symptom: impl Into<String>) -> bool {
        push_unique(&mut self.symptoms, symptom.into())
    }

    /// Add a comorbidity tag. Blank and duplicate tags are ignored.
    pub fn add_comorbidity(&mut self, comorbidity: impl Into<String>) -> bool {
        push_unique(&mut self.comorbidities, comorbidity.into())
    }

    pub fn has_symptom(&self, symptom: &str) -> bool {
        self.symptoms.iter().any(|s| s == symptom)
    }
}

fn push_unique(tags: &mut Vec<String>, tag: String) -> bool {
    if tag.is_empty() || tags.contains(&tag) {
        return false;
    }
    tags.push(tag);
    true
}

//! Patient records.

use serde::{Deserialize, Serialize};

use super::input::{Consciousness, Gender, PatientInput};
use super::urgency::{Urgency, UrgencyColor};
use crate::scoring::{lenient_f64, lenient_u32};

/// Queue status of a stored patient.
///
/// Transitions only run Active → Discharged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatientStatus {
    Active,
    Discharged,
}

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "ACTIVE",
            PatientStatus::Discharged => "DISCHARGED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(PatientStatus::Active),
            "DISCHARGED" => Some(PatientStatus::Discharged),
            _ => None,
        }
    }

    /// Whether moving from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: PatientStatus) -> bool {
        matches!(
            (self, next),
            (PatientStatus::Active, PatientStatus::Discharged)
        )
    }
}

impl std::fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default guidance attached at intake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarePlan {
    pub recommended_drugs: String,
    pub actions_during_symptoms: String,
    pub actions_after_drug: String,
    pub estimated_recovery_time_hrs: u32,
    pub follow_up_reminder: String,
}

impl Default for CarePlan {
    fn default() -> Self {
        Self {
            recommended_drugs: "AI will provide initial recommendations.".into(),
            actions_during_symptoms: "Follow AI guidance and seek professional medical advice."
                .into(),
            actions_after_drug: "Monitor for changes and report to healthcare provider.".into(),
            estimated_recovery_time_hrs: 24,
            follow_up_reminder: "Follow up based on AI recommendation and clinical assessment."
                .into(),
        }
    }
}

/// A scored intake that has not been stored yet.
///
/// Narrative text is frozen here and never regenerated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPatient {
    pub patient_id: String,
    pub age: u32,
    pub gender: Gender,
    /// Present only for female patients
    pub pregnancy_status: Option<bool>,
    #[serde(rename = "temperature_F")]
    pub temperature_f: f64,
    pub heart_rate_bpm: u32,
    pub respiration_rate: u32,
    pub bp_systolic: u32,
    pub bp_diastolic: u32,
    pub oxygen_saturation: f64,
    pub symptoms: Vec<String>,
    pub pain_level: u32,
    pub symptom_severity_weight: u32,
    pub consciousness: Consciousness,
    pub duration_of_symptoms_hrs: u32,
    pub comorbidities: Vec<String>,
    pub urgency: Urgency,
    pub care_plan: CarePlan,
    pub ai_recommendation_text: String,
    pub triage_ai_summary: String,
}

impl NewPatient {
    /// Merge a raw submission with its urgency and narrative text.
    ///
    /// Unparsable numbers become 0, unset gender becomes Other and unset
    /// consciousness becomes Alert.
    pub fn from_intake(
        input: &PatientInput,
        urgency: Urgency,
        recommendation: String,
        summary: String,
    ) -> Self {
        let gender = input.gender.unwrap_or(Gender::Other);
        Self {
            patient_id: input.patient_id.clone(),
            age: lenient_u32(&input.age),
            gender,
            pregnancy_status: (gender == Gender::Female).then_some(input.pregnancy_status),
            temperature_f: lenient_f64(&input.temperature_f),
            heart_rate_bpm: lenient_u32(&input.heart_rate_bpm),
            respiration_rate: lenient_u32(&input.respiration_rate),
            bp_systolic: lenient_u32(&input.bp_systolic),
            bp_diastolic: lenient_u32(&input.bp_diastolic),
            oxygen_saturation: lenient_f64(&input.oxygen_saturation),
            symptoms: input.symptoms.clone(),
            pain_level: 0,
            symptom_severity_weight: 0,
            consciousness: input.consciousness.unwrap_or(Consciousness::Alert),
            duration_of_symptoms_hrs: 1,
            comorbidities: input.comorbidities.clone(),
            urgency,
            care_plan: CarePlan::default(),
            ai_recommendation_text: recommendation,
            triage_ai_summary: summary,
        }
    }
}

/// A stored patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Store-assigned id, never reused
    pub id: i64,
    /// Epoch milliseconds at insert
    pub submission_timestamp: i64,
    pub status: PatientStatus,
    #[serde(flatten)]
    pub record: NewPatient,
}

impl Patient {
    pub fn is_active(&self) -> bool {
        self.status == PatientStatus::Active
    }

    pub fn urgency_score(&self) -> u32 {
        self.record.urgency.score()
    }

    pub fn urgency_color(&self) -> UrgencyColor {
        self.record.urgency.color()
    }

    /// Human-facing display id, e.g. "P0007".
    pub fn display_id(&self) -> &str {
        &self.record.patient_id
    }
}

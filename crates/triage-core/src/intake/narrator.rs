//! Narrative-generation collaborator.
//!
//! Narratives are best-effort: every failure is absorbed here and replaced by
//! a fixed placeholder, so scoring and persistence never depend on them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::{Patient, PatientInput};
use crate::scoring::TriageAssessment;

/// Placeholder recommendation when the intake summary cannot be generated.
pub const RECOMMENDATION_UNAVAILABLE: &str = "AI-powered triage summary is not available. \
The urgency level was computed with the standard scoring rules; review it directly.";

/// Placeholder one-line summary when the intake summary cannot be generated.
pub const SUMMARY_UNAVAILABLE: &str = "AI summary unavailable";

/// Placeholder when the narrative service is not configured.
pub const ANALYSIS_UNCONFIGURED: &str =
    "AI analysis is not available because the narrative service is not configured.";

/// Placeholder when the narrative service failed.
pub const ANALYSIS_FAILED: &str =
    "Failed to generate AI response. The narrative service returned an error.";

/// Narrative generation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NarrativeError {
    #[error("Narrative service unavailable: {0}")]
    Unavailable(String),

    #[error("Narrative request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Narrative generation failed: {0}")]
    Generation(String),

    #[error("Invalid narrative response: {0}")]
    InvalidResponse(String),
}

pub type NarrativeResult<T> = Result<T, NarrativeError>;

/// Text frozen onto a record at intake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IntakeNarrative {
    /// Patient-facing urgency and next steps
    pub recommendation: String,
    /// Single-line dashboard summary
    pub summary: String,
}

impl IntakeNarrative {
    /// Placeholder pair used when generation fails.
    pub fn unavailable() -> Self {
        Self {
            recommendation: RECOMMENDATION_UNAVAILABLE.into(),
            summary: SUMMARY_UNAVAILABLE.into(),
        }
    }
}

/// Phrases summaries and explanations for clinicians.
pub trait Narrator: Send + Sync {
    /// Recommendation and summary for a freshly scored submission.
    fn intake_summary(
        &self,
        input: &PatientInput,
        assessment: &TriageAssessment,
    ) -> NarrativeResult<IntakeNarrative>;

    /// Narrative comparing a stored patient's vitals to normal ranges.
    fn vitals_narrative(&self, patient: &Patient) -> NarrativeResult<String>;

    /// Narrative explaining how a stored patient's score was reached.
    fn score_narrative(&self, patient: &Patient) -> NarrativeResult<String>;
}

/// Narrator with no backing service. Every request reports `Unavailable`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineNarrator;

impl Narrator for OfflineNarrator {
    fn intake_summary(
        &self,
        _input: &PatientInput,
        _assessment: &TriageAssessment,
    ) -> NarrativeResult<IntakeNarrative> {
        Err(NarrativeError::Unavailable("narrative service not configured".into()))
    }

    fn vitals_narrative(&self, _patient: &Patient) -> NarrativeResult<String> {
        Err(NarrativeError::Unavailable("narrative service not configured".into()))
    }

    fn score_narrative(&self, _patient: &Patient) -> NarrativeResult<String> {
        Err(NarrativeError::Unavailable("narrative service not configured".into()))
    }
}

/// Intake narrative, or the placeholder pair on failure.
pub fn narrate_intake(
    narrator: &dyn Narrator,
    input: &PatientInput,
    assessment: &TriageAssessment,
) -> IntakeNarrative {
    narrator
        .intake_summary(input, assessment)
        .unwrap_or_else(|e| {
            warn!(narrative = "intake_summary", error = %e, "using placeholder narrative");
            IntakeNarrative::unavailable()
        })
}

/// Vitals analysis for a stored patient, or a placeholder on failure.
pub fn describe_vitals(narrator: &dyn Narrator, patient: &Patient) -> String {
    narrator
        .vitals_narrative(patient)
        .unwrap_or_else(|e| fallback_text("vitals", &e))
}

/// Score explanation for a stored patient, or a placeholder on failure.
pub fn explain_score(narrator: &dyn Narrator, patient: &Patient) -> String {
    narrator
        .score_narrative(patient)
        .unwrap_or_else(|e| fallback_text("score", &e))
}

fn fallback_text(narrative: &str, error: &NarrativeError) -> String {
    warn!(narrative, error = %error, "using placeholder narrative");
    match error {
        NarrativeError::Unavailable(_) => ANALYSIS_UNCONFIGURED.into(),
        _ => ANALYSIS_FAILED.into(),
    }
}

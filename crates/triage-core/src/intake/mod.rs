//! Intake: raw submission → scored, narrated record ready to store.
//!
//! Pipeline: Score → Narrate (best-effort) → Merge

mod narrator;

pub use narrator::*;

use crate::models::{NewPatient, PatientInput, Urgency};
use crate::scoring::{self, TriageAssessment};

/// Score a submission, attach its narrative, and build the record to insert.
///
/// The narrative is generated exactly once here. A narrator failure yields
/// placeholder text and never blocks the intake.
pub fn run_intake(input: &PatientInput, narrator: &dyn Narrator) -> NewPatient {
    let assessment = scoring::assess(input);
    let narrative = narrate_intake(narrator, input, &assessment);
    NewPatient::from_intake(
        input,
        assessment.urgency,
        narrative.recommendation,
        narrative.summary,
    )
}

/// One-line dashboard summary, e.g.
/// `P0006, 45yo Male, chest pain, palpitations → Yellow (Score 6). ECG now.`
pub fn summary_line(input: &PatientInput, urgency: Urgency, note: &str) -> String {
    let gender = input.gender.map_or("Unspecified", |g| g.as_str());
    let symptoms = if input.symptoms.is_empty() {
        "no reported symptoms".to_string()
    } else {
        input.symptoms.join(", ")
    };

    let mut line = format!(
        "{}, {}yo {}, {} → {} (Score {}).",
        input.patient_id,
        input.age.trim(),
        gender,
        symptoms,
        urgency.color(),
        urgency.score()
    );
    if !note.is_empty() {
        line.push(' ');
        line.push_str(note);
    }
    line
}

/// Plain-text breakdown of the triggered rules.
pub fn breakdown_text(assessment: &TriageAssessment) -> String {
    if assessment.factors.is_empty() {
        return format!(
            "The final score of 0 ({}) was calculated as follows: no scoring rule was triggered.",
            assessment.color()
        );
    }

    let parts: Vec<String> = assessment
        .factors
        .iter()
        .map(|f| format!("{} points for {}", f.points, f.rule.description()))
        .collect();

    format!(
        "The final score of {} ({}) was calculated as follows: {}.",
        assessment.score(),
        assessment.color(),
        parts.join(", ")
    )
}

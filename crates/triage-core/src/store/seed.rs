//! Built-in dataset used to populate a fresh store.

use serde::Deserialize;

use super::StoreResult;
use crate::intake::summary_line;
use crate::models::{NewPatient, PatientInput};
use crate::scoring;

const SEED_JSON: &str = include_str!("seed_patients.json");

/// A raw seeded submission with its fixed narrative.
#[derive(Debug, Deserialize)]
struct SeedEntry {
    #[serde(flatten)]
    input: PatientInput,
    recommendation: String,
    note: String,
}

/// The seed dataset in submission order, scored like a live intake.
pub fn seed_records() -> StoreResult<Vec<NewPatient>> {
    let entries: Vec<SeedEntry> = serde_json::from_str(SEED_JSON)?;

    Ok(entries
        .into_iter()
        .map(|entry| {
            let urgency = scoring::score(&entry.input);
            let summary = summary_line(&entry.input, urgency, &entry.note);
            NewPatient::from_intake(&entry.input, urgency, entry.recommendation, summary)
        })
        .collect())
}

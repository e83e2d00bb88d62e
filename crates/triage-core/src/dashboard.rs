//! Aggregates shown next to the active queue.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Patient, UrgencyColor};

/// Entries shown in each dashboard panel.
pub const PANEL_LIMIT: usize = 5;

/// Patient count per color band.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityBreakdown {
    pub red: usize,
    pub yellow: usize,
    pub green: usize,
}

impl SeverityBreakdown {
    pub fn count(&self, color: UrgencyColor) -> usize {
        match color {
            UrgencyColor::Red => self.red,
            UrgencyColor::Yellow => self.yellow,
            UrgencyColor::Green => self.green,
        }
    }

    pub fn total(&self) -> usize {
        self.red + self.yellow + self.green
    }
}

/// How often a symptom appears across patients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymptomCount {
    pub symptom: String,
    pub count: usize,
}

/// Everything the dashboard side panel renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    pub severity: SeverityBreakdown,
    pub top_symptoms: Vec<SymptomCount>,
    pub most_urgent: Vec<Patient>,
}

impl DashboardSummary {
    pub fn from_patients(patients: &[Patient]) -> Self {
        Self {
            severity: severity_breakdown(patients),
            top_symptoms: symptom_frequency(patients, PANEL_LIMIT),
            most_urgent: most_urgent(patients, PANEL_LIMIT),
        }
    }
}

/// Count patients per color band.
pub fn severity_breakdown(patients: &[Patient]) -> SeverityBreakdown {
    patients
        .iter()
        .fold(SeverityBreakdown::default(), |mut acc, p| {
            match p.urgency_color() {
                UrgencyColor::Red => acc.red += 1,
                UrgencyColor::Yellow => acc.yellow += 1,
                UrgencyColor::Green => acc.green += 1,
            }
            acc
        })
}

/// The `limit` most frequent symptoms, highest count first.
///
/// Tags are trimmed, underscores become spaces and the first letter is
/// capitalized, so "chest_pain" and "chest pain" count together.
pub fn symptom_frequency(patients: &[Patient], limit: usize) -> Vec<SymptomCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for patient in patients {
        for tag in &patient.record.symptoms {
            let label = display_label(tag);
            if label.is_empty() {
                continue;
            }
            *counts.entry(label).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<SymptomCount> = counts
        .into_iter()
        .map(|(symptom, count)| SymptomCount { symptom, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.symptom.cmp(&b.symptom)));
    ranked.truncate(limit);
    ranked
}

/// The `limit` highest-scoring patients. Ties keep their input order.
pub fn most_urgent(patients: &[Patient], limit: usize) -> Vec<Patient> {
    let mut sorted = patients.to_vec();
    sorted.sort_by(|a, b| b.urgency_score().cmp(&a.urgency_score()));
    sorted.truncate(limit);
    sorted
}

fn display_label(tag: &str) -> String {
    let cleaned = tag.trim().replace('_', " ");
    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPatient, PatientInput, PatientStatus, Urgency};

    fn patient(id: i64, score: u32, symptoms: &[&str]) -> Patient {
        let mut input = PatientInput::new(format!("P{:04}", id));
        input.symptoms = symptoms.iter().map(|s| s.to_string()).collect();
        Patient {
            id,
            submission_timestamp: id,
            status: PatientStatus::Active,
            record: NewPatient::from_intake(
                &input,
                Urgency::from_score(score),
                String::new(),
                String::new(),
            ),
        }
    }

    #[test]
    fn test_severity_breakdown() {
        let patients = vec![
            patient(1, 9, &[]),
            patient(2, 4, &[]),
            patient(3, 0, &[]),
            patient(4, 12, &[]),
        ];
        let breakdown = severity_breakdown(&patients);
        assert_eq!(breakdown.red, 2);
        assert_eq!(breakdown.yellow, 1);
        assert_eq!(breakdown.green, 1);
        assert_eq!(breakdown.total(), 4);
        assert_eq!(breakdown.count(UrgencyColor::Red), 2);
    }

    #[test]
    fn test_symptom_frequency_normalizes_labels() {
        let patients = vec![
            patient(1, 0, &["chest_pain", "fever"]),
            patient(2, 0, &["chest pain"]),
            patient(3, 0, &[" fever ", "cough"]),
            patient(4, 0, &["chest pain", ""]),
        ];

        let top = symptom_frequency(&patients, 5);
        assert_eq!(
            top,
            vec![
                SymptomCount { symptom: "Chest pain".into(), count: 3 },
                SymptomCount { symptom: "Fever".into(), count: 2 },
                SymptomCount { symptom: "Cough".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_symptom_frequency_limit() {
        let patients = vec![patient(1, 0, &["a", "b", "c", "d", "e", "f", "g"])];
        assert_eq!(symptom_frequency(&patients, 5).len(), 5);
    }

    #[test]
    fn test_most_urgent_stable_on_ties() {
        let patients = vec![
            patient(1, 4, &[]),
            patient(2, 10, &[]),
            patient(3, 4, &[]),
            patient(4, 0, &[]),
        ];
        let ids: Vec<i64> = most_urgent(&patients, 3).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_summary_from_empty() {
        let summary = DashboardSummary::from_patients(&[]);
        assert_eq!(summary.severity.total(), 0);
        assert!(summary.top_symptoms.is_empty());
        assert!(summary.most_urgent.is_empty());
    }
}

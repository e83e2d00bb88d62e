//! Common symptom and comorbidity tags offered during intake.

use strsim::{jaro_winkler, normalized_levenshtein};

pub const COMMON_SYMPTOMS: [&str; 21] = [
    "fever",
    "cough",
    "fatigue",
    "shortness of breath",
    "chest pain",
    "headache",
    "dizziness",
    "sore throat",
    "nausea",
    "vomiting",
    "abdominal pain",
    "diarrhea",
    "rash",
    "confusion",
    "weakness",
    "back pain",
    "palpitations",
    "syncope",
    "bleeding",
    "loss of appetite",
    "anosmia",
];

pub const COMMON_COMORBIDITIES: [&str; 6] = [
    "none",
    "hypertension",
    "diabetes",
    "asthma",
    "heart disease",
    "copd",
];

/// Minimum similarity for a suggestion.
pub const MIN_SUGGESTION_SCORE: f64 = 0.7;

/// Rank vocabulary entries against a partially typed query.
///
/// Prefix matches rank first, then substring matches, then fuzzy matches
/// above [`MIN_SUGGESTION_SCORE`].
pub fn suggest<'a>(query: &str, vocabulary: &[&'a str], limit: usize) -> Vec<&'a str> {
    let query = normalize(query);
    if query.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &'a str)> = vocabulary
        .iter()
        .filter_map(|entry| {
            let score = similarity(&query, &normalize(entry));
            (score >= MIN_SUGGESTION_SCORE).then_some((score, *entry))
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.truncate(limit);
    scored.into_iter().map(|(_, entry)| entry).collect()
}

/// First vocabulary entry mentioned in free text, e.g. a dictated phrase.
pub fn match_transcript<'a>(transcript: &str, vocabulary: &[&'a str]) -> Option<&'a str> {
    let transcript = transcript.to_lowercase();
    vocabulary
        .iter()
        .copied()
        .find(|entry| transcript.contains(&normalize(entry)))
}

fn similarity(query: &str, entry: &str) -> f64 {
    if entry.starts_with(query) {
        return 2.0 + query.len() as f64 / entry.len().max(1) as f64;
    }
    if entry.contains(query) {
        return 1.5;
    }
    // Typos: weight Jaro-Winkler for its prefix bonus
    jaro_winkler(query, entry) * 0.6 + normalized_levenshtein(query, entry) * 0.4
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace('_', " ")
}

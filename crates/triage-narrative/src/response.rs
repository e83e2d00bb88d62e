//! Parsing model output into structured narratives.

use serde::Deserialize;
use triage_core::{IntakeNarrative, NarrativeError, NarrativeResult};

/// Raw intake response from the model.
#[derive(Debug, Clone, Deserialize)]
struct IntakeResponse {
    recommendation: String,
    summary: String,
}

/// Parse an intake response into a recommendation and summary.
///
/// Text around the JSON object is ignored, so a model that wraps its answer
/// in prose or a code fence still parses.
pub fn parse_intake_summary(text: &str) -> NarrativeResult<IntakeNarrative> {
    let json_start = text.find('{').ok_or_else(|| {
        NarrativeError::InvalidResponse("No JSON object found in response".into())
    })?;
    let json_end = text.rfind('}').ok_or_else(|| {
        NarrativeError::InvalidResponse("No closing brace found in response".into())
    })?;
    if json_end < json_start {
        return Err(NarrativeError::InvalidResponse(
            "Closing brace precedes opening brace".into(),
        ));
    }

    let response: IntakeResponse = serde_json::from_str(&text[json_start..=json_end])
        .map_err(|e| NarrativeError::InvalidResponse(e.to_string()))?;

    let recommendation = response.recommendation.trim();
    let summary = response.summary.trim();
    if recommendation.is_empty() || summary.is_empty() {
        return Err(NarrativeError::InvalidResponse(
            "Empty recommendation or summary".into(),
        ));
    }

    Ok(IntakeNarrative {
        recommendation: recommendation.to_string(),
        // Dashboard rows are single-line
        summary: summary.lines().collect::<Vec<_>>().join(" "),
    })
}

/// Trimmed free-text narrative. Empty output is an error.
pub fn parse_free_text(text: &str) -> NarrativeResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(NarrativeError::InvalidResponse("Empty response".into()));
    }
    Ok(trimmed.to_string())
}

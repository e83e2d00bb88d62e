//! Prompts for clinician-facing triage narratives.

use triage_core::scoring::TriageRule;
use triage_core::{Patient, PatientInput, TriageAssessment};

/// System instruction shared by every request.
pub const SYSTEM_PROMPT: &str = r#"You are a clinical AI assistant supporting triage nurses in an emergency department.

Write for healthcare professionals:
- Be concise and factual.
- Never change or second-guess the urgency score; it is computed by fixed rules.
- Do not add conversational filler."#;

/// Normal adult ranges quoted in the vitals prompt.
pub const NORMAL_RANGES: &[(&str, &str)] = &[
    ("Temperature", "97.6-99.6 °F"),
    ("Heart Rate", "60-100 bpm"),
    ("Respiratory Rate", "12-20 /min"),
    ("SpO2", "95-100%"),
    ("BP Systolic", "90-120 mmHg"),
    ("BP Diastolic", "60-80 mmHg"),
];

/// JSON schema the intake response must follow.
pub const INTAKE_RESPONSE_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "recommendation": {
      "type": "string",
      "description": "User-friendly text describing the urgency and next steps."
    },
    "summary": {
      "type": "string",
      "description": "A single-line summary for clinical dashboards."
    }
  },
  "required": ["recommendation", "summary"]
}"#;

/// Prompt comparing a stored patient's vitals to normal ranges.
pub fn make_vitals_prompt(patient: &Patient) -> String {
    let record = &patient.record;
    let ranges: String = NORMAL_RANGES
        .iter()
        .map(|(name, range)| format!("- {}: {}\n", name, range))
        .collect();

    format!(
        r#"Analyze the following patient's vital signs and provide a brief, narrative summary.
- Compare each vital to its normal range.
- Highlight any abnormal readings and explain their potential significance.
- Conclude with an overall assessment of the patient's stability based on these vitals.

Normal Ranges:
{ranges}
Patient Vitals:
- Temperature: {} °F
- Heart Rate: {} bpm
- Respiratory Rate: {} /min
- SpO2: {} %
- BP Systolic: {} mmHg
- BP Diastolic: {} mmHg

Example Output: "The patient's heart rate is elevated at 130 bpm, placing it outside the normal range and contributing to the urgency score. All other vitals appear to be stable and within normal limits.""#,
        record.temperature_f,
        record.heart_rate_bpm,
        record.respiration_rate,
        record.oxygen_saturation,
        record.bp_systolic,
        record.bp_diastolic,
    )
}

/// Rule table as listed in the score prompt.
pub fn rule_table() -> String {
    TriageRule::ALL
        .iter()
        .map(|rule| format!("- {}\n", rule))
        .collect()
}

/// Prompt explaining how a stored patient's score was reached.
pub fn make_score_prompt(patient: &Patient) -> String {
    let record = &patient.record;
    format!(
        r#"Explain how the patient's final triage score was calculated based on the provided rules.
- List each factor that contributed points to the score.
- State the final score and the corresponding urgency level (Green, Yellow, or Red).

Triage Scoring Rules:
{}
Patient Data:
- Age: {}
- Symptoms: {}
- Vitals: Temp {}°F, Heart Rate {} bpm, SpO2 {}%, Resp. Rate {}/min
- Consciousness: {}
- Comorbidities: {}
- Final Urgency Score: {} ({})

Example Output: "The final score of 6 (Yellow) was calculated as follows: 4 points for 'Chest Pain' and 2 points for a Heart Rate over 120 bpm. This places the patient in the Moderate Urgency category.""#,
        rule_table(),
        record.age,
        record.symptoms.join(", "),
        record.temperature_f,
        record.heart_rate_bpm,
        record.oxygen_saturation,
        record.respiration_rate,
        record.consciousness.as_str(),
        record.comorbidities.join(", "),
        record.urgency.score(),
        record.urgency.color(),
    )
}

/// Prompt for the recommendation and one-line summary frozen at intake.
pub fn make_intake_prompt(input: &PatientInput, assessment: &TriageAssessment) -> String {
    let gender = input.gender.map_or("Unspecified", |g| g.as_str());
    let consciousness = input.consciousness.map_or("Unspecified", |c| c.as_str());
    let symptoms = input.symptoms.join(", ");

    format!(
        r#"Based on the following patient data and triage score, generate a concise 'recommendation' and 'summary'.

Patient Data:
- Age: {age}
- Gender: {gender}
- Vitals: Temp {}°F, Heart Rate {}bpm, O2 Saturation {}%, BP {}/{}, Resp. Rate: {}
- Symptoms: {symptoms}
- Comorbidities: {}
- Consciousness: {consciousness}

Triage Result:
- Urgency: {color} (Score: {score})

The 'recommendation' should be a user-friendly text describing the urgency and next steps.
The 'summary' should be a single-line text for clinical dashboards, like this example: "{id}, {age}yo {gender}, {symptoms} → {color} (Score {score}). [Brief recommendation...]"

Respond with a JSON object matching this schema:
{schema}"#,
        input.temperature_f,
        input.heart_rate_bpm,
        input.oxygen_saturation,
        input.bp_systolic,
        input.bp_diastolic,
        input.respiration_rate,
        input.comorbidities.join(", "),
        age = input.age,
        id = input.patient_id,
        color = assessment.color(),
        score = assessment.score(),
        schema = INTAKE_RESPONSE_SCHEMA,
    )
}

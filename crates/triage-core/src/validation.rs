//! Vital sign entry checks.
//!
//! Two tiers:
//!
//! - **Hard limits** reject a value outright (an entry that cannot be typed).
//! - **Critical ranges** accept the value but raise an alert asking the
//!   clinician to confirm the reading.
//!
//! Neither tier affects scoring.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::PatientInput;
use crate::scoring::parse_float;

/// Longest raw numeric entry accepted.
pub const MAX_ENTRY_LEN: usize = 6;

/// Numeric fields of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalField {
    Age,
    #[serde(rename = "temperature_F")]
    Temperature,
    HeartRate,
    OxygenSaturation,
    RespirationRate,
    BpSystolic,
    BpDiastolic,
}

impl VitalField {
    pub const ALL: [VitalField; 7] = [
        VitalField::Age,
        VitalField::Temperature,
        VitalField::HeartRate,
        VitalField::OxygenSaturation,
        VitalField::RespirationRate,
        VitalField::BpSystolic,
        VitalField::BpDiastolic,
    ];

    /// Submission field name.
    pub fn key(&self) -> &'static str {
        match self {
            VitalField::Age => "age",
            VitalField::Temperature => "temperature_F",
            VitalField::HeartRate => "heart_rate_bpm",
            VitalField::OxygenSaturation => "oxygen_saturation",
            VitalField::RespirationRate => "respiration_rate",
            VitalField::BpSystolic => "bp_systolic",
            VitalField::BpDiastolic => "bp_diastolic",
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            VitalField::Age => "Age",
            VitalField::Temperature => "Temperature (°F)",
            VitalField::HeartRate => "Heart Rate (bpm)",
            VitalField::OxygenSaturation => "Oxygen Saturation (%)",
            VitalField::RespirationRate => "Respiration Rate (/min)",
            VitalField::BpSystolic => "BP Systolic",
            VitalField::BpDiastolic => "BP Diastolic",
        }
    }

    /// Largest value that can be entered at all.
    pub fn hard_max(&self) -> f64 {
        match self {
            VitalField::Age => 150.0,
            VitalField::Temperature => 150.0,
            VitalField::HeartRate => 300.0,
            VitalField::OxygenSaturation => 100.0,
            VitalField::RespirationRate => 100.0,
            VitalField::BpSystolic => 300.0,
            VitalField::BpDiastolic => 250.0,
        }
    }

    /// Inclusive range outside which a reading needs confirmation.
    /// Age has none.
    pub fn critical_range(&self) -> Option<(f64, f64)> {
        match self {
            VitalField::Age => None,
            VitalField::Temperature => Some((90.0, 105.0)),
            VitalField::HeartRate => Some((35.0, 200.0)),
            VitalField::OxygenSaturation => Some((60.0, 100.0)),
            VitalField::RespirationRate => Some((8.0, 30.0)),
            VitalField::BpSystolic => Some((70.0, 220.0)),
            VitalField::BpDiastolic => Some((40.0, 120.0)),
        }
    }

    fn raw<'a>(&self, input: &'a PatientInput) -> &'a str {
        match self {
            VitalField::Age => &input.age,
            VitalField::Temperature => &input.temperature_f,
            VitalField::HeartRate => &input.heart_rate_bpm,
            VitalField::OxygenSaturation => &input.oxygen_saturation,
            VitalField::RespirationRate => &input.respiration_rate,
            VitalField::BpSystolic => &input.bp_systolic,
            VitalField::BpDiastolic => &input.bp_diastolic,
        }
    }
}

/// Entry rejected by a hard limit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field:?} entry is longer than {max} characters")]
    TooLong { field: VitalField, max: usize },

    #[error("{field:?} value {value} exceeds the maximum of {max}")]
    AboveMaximum { field: VitalField, value: f64, max: f64 },
}

/// Check a raw entry against the field's hard limit.
///
/// Blank and non-numeric entries pass; they are handled by lenient parsing.
pub fn check_hard_limit(field: VitalField, raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Ok(());
    }
    if raw.chars().count() > MAX_ENTRY_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_ENTRY_LEN,
        });
    }
    match parse_float(raw) {
        Some(value) if value > field.hard_max() => Err(ValidationError::AboveMaximum {
            field,
            value,
            max: field.hard_max(),
        }),
        _ => Ok(()),
    }
}

/// Check every vital in a submission, stopping at the first refused entry.
pub fn check_hard_limits(input: &PatientInput) -> Result<(), ValidationError> {
    VitalField::ALL
        .iter()
        .try_for_each(|field| check_hard_limit(*field, field.raw(input)))
}

/// Reading outside its critical range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalAlert {
    pub field: VitalField,
    pub value: String,
    pub message: String,
}

/// Alert for a single reading, if it falls outside the critical range.
pub fn critical_alert(field: VitalField, raw: &str) -> Option<CriticalAlert> {
    let (min, max) = field.critical_range()?;
    let value = parse_float(raw)?;
    if (min..=max).contains(&value) {
        return None;
    }

    Some(CriticalAlert {
        field,
        value: raw.to_string(),
        message: alert_message(field, raw, value),
    })
}

/// Alerts for every critical reading in a submission, in field order.
pub fn critical_alerts(input: &PatientInput) -> Vec<CriticalAlert> {
    VitalField::ALL
        .iter()
        .filter_map(|field| critical_alert(*field, field.raw(input)))
        .collect()
}

fn alert_message(field: VitalField, raw: &str, value: f64) -> String {
    match field {
        VitalField::Temperature => format!(
            "Temperature of {raw}°F is life-threatening. Normal human temperature rarely exceeds \
             105°F or drops below 90°F. Please confirm this reading is accurate."
        ),
        VitalField::HeartRate => format!(
            "Heart Rate of {raw} bpm is extremely high or low. The typical maximum survivable \
             heart rate for a human is near 220 bpm. Please confirm this reading is accurate."
        ),
        VitalField::OxygenSaturation if value > 100.0 => format!(
            "SpO₂ of {raw}% is physiologically impossible. Please re-enter the correct value."
        ),
        VitalField::OxygenSaturation => format!(
            "SpO₂ of {raw}% indicates severe, life-threatening hypoxemia. \
             Please confirm this reading is accurate."
        ),
        VitalField::BpSystolic => format!(
            "Systolic BP of {raw} mmHg indicates a potential hypertensive crisis or severe shock. \
             Please confirm this reading is accurate."
        ),
        VitalField::RespirationRate => format!(
            "Respiration Rate of {raw} /min is severe. Normal range is 12 to 20 /min. \
             Please confirm this reading is accurate."
        ),
        VitalField::BpDiastolic => format!(
            "BP Diastolic of {raw} mmHg is severe. Normal range is 60 to 80 mmHg. \
             Please confirm this reading is accurate."
        ),
        VitalField::Age => format!("{} of {raw} is out of range.", field.label()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_limits() {
        assert!(check_hard_limit(VitalField::Age, "150").is_ok());
        assert!(matches!(
            check_hard_limit(VitalField::Age, "151"),
            Err(ValidationError::AboveMaximum { .. })
        ));
        assert!(check_hard_limit(VitalField::OxygenSaturation, "100").is_ok());
        assert!(check_hard_limit(VitalField::OxygenSaturation, "100.5").is_err());
        assert!(check_hard_limit(VitalField::BpDiastolic, "250").is_ok());
        assert!(check_hard_limit(VitalField::BpDiastolic, "251").is_err());
    }

    #[test]
    fn test_long_entries_rejected() {
        assert_eq!(
            check_hard_limit(VitalField::Temperature, "98.6000"),
            Err(ValidationError::TooLong {
                field: VitalField::Temperature,
                max: MAX_ENTRY_LEN
            })
        );
        assert!(check_hard_limit(VitalField::Temperature, "98.600").is_ok());
    }

    #[test]
    fn test_blank_and_text_pass_hard_limit() {
        assert!(check_hard_limit(VitalField::HeartRate, "").is_ok());
        assert!(check_hard_limit(VitalField::HeartRate, "abc").is_ok());
    }

    #[test]
    fn test_submission_hard_limits() {
        let mut input = PatientInput::new("P0001");
        input.age = "40".into();
        input.heart_rate_bpm = "80".into();
        assert!(check_hard_limits(&input).is_ok());

        input.heart_rate_bpm = "400".into();
        assert_eq!(
            check_hard_limits(&input),
            Err(ValidationError::AboveMaximum {
                field: VitalField::HeartRate,
                value: 400.0,
                max: 300.0
            })
        );
    }

    #[test]
    fn test_critical_bounds_inclusive() {
        assert!(critical_alert(VitalField::Temperature, "90").is_none());
        assert!(critical_alert(VitalField::Temperature, "105").is_none());
        assert!(critical_alert(VitalField::Temperature, "89.9").is_some());
        assert!(critical_alert(VitalField::Temperature, "105.1").is_some());
        assert!(critical_alert(VitalField::RespirationRate, "8").is_none());
        assert!(critical_alert(VitalField::RespirationRate, "7").is_some());
    }

    #[test]
    fn test_age_never_alerts() {
        assert!(critical_alert(VitalField::Age, "149").is_none());
    }

    #[test]
    fn test_oxygen_messages() {
        let low = critical_alert(VitalField::OxygenSaturation, "55").unwrap();
        assert!(low.message.contains("life-threatening hypoxemia"));

        let impossible = critical_alert(VitalField::OxygenSaturation, "101").unwrap();
        assert!(impossible.message.contains("physiologically impossible"));
    }

    #[test]
    fn test_critical_alerts_for_submission() {
        let mut input = PatientInput::new("P0001");
        input.temperature_f = "106".into();
        input.heart_rate_bpm = "90".into();
        input.bp_systolic = "60".into();
        input.respiration_rate = "".into();

        let alerts = critical_alerts(&input);
        let fields: Vec<VitalField> = alerts.iter().map(|a| a.field).collect();
        assert_eq!(fields, vec![VitalField::Temperature, VitalField::BpSystolic]);
        assert_eq!(alerts[0].value, "106");
        assert!(alerts[1].message.starts_with("Systolic BP of 60 mmHg"));
    }

    #[test]
    fn test_field_keys_round_trip() {
        for field in VitalField::ALL {
            assert_eq!(VitalField::parse(field.key()), Some(field));
        }
        assert_eq!(VitalField::parse("weight"), None);
    }
}

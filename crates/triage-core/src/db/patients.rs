//! Patient table operations.

use rusqlite::params;

use super::{SqliteBackend, WRITTEN_AT_KEY};
use crate::models::{
    CarePlan, Consciousness, Gender, NewPatient, Patient, PatientStatus, Urgency, UrgencyColor,
};
use crate::store::{StorageBackend, StoreError, StoreResult};

impl StorageBackend for SqliteBackend {
    fn exists(&self) -> StoreResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM store_meta WHERE key = ?",
            [WRITTEN_AT_KEY],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn read_all(&self) -> StoreResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, submission_timestamp, status, patient_id, age, gender,
                   pregnancy_status, temperature_f, heart_rate_bpm, respiration_rate,
                   bp_systolic, bp_diastolic, oxygen_saturation, symptoms, pain_level,
                   symptom_severity_weight, consciousness, duration_of_symptoms_hrs,
                   comorbidities, urgency_score, urgency_color, care_plan,
                   ai_recommendation_text, triage_ai_summary
            FROM patients
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(PatientRow {
                id: row.get(0)?,
                submission_timestamp: row.get(1)?,
                status: row.get(2)?,
                patient_id: row.get(3)?,
                age: row.get(4)?,
                gender: row.get(5)?,
                pregnancy_status: row.get(6)?,
                temperature_f: row.get(7)?,
                heart_rate_bpm: row.get(8)?,
                respiration_rate: row.get(9)?,
                bp_systolic: row.get(10)?,
                bp_diastolic: row.get(11)?,
                oxygen_saturation: row.get(12)?,
                symptoms: row.get(13)?,
                pain_level: row.get(14)?,
                symptom_severity_weight: row.get(15)?,
                consciousness: row.get(16)?,
                duration_of_symptoms_hrs: row.get(17)?,
                comorbidities: row.get(18)?,
                urgency_score: row.get(19)?,
                urgency_color: row.get(20)?,
                care_plan: row.get(21)?,
                ai_recommendation_text: row.get(22)?,
                triage_ai_summary: row.get(23)?,
            })
        })?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    fn write_all(&mut self, patients: &[Patient]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM patients", [])?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO patients (
                    id, submission_timestamp, status, patient_id, age, gender,
                    pregnancy_status, temperature_f, heart_rate_bpm, respiration_rate,
                    bp_systolic, bp_diastolic, oxygen_saturation, symptoms, pain_level,
                    symptom_severity_weight, consciousness, duration_of_symptoms_hrs,
                    comorbidities, urgency_score, urgency_color, care_plan,
                    ai_recommendation_text, triage_ai_summary
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                          ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24)
                "#,
            )?;

            for patient in patients {
                let record = &patient.record;
                stmt.execute(params![
                    patient.id,
                    patient.submission_timestamp,
                    patient.status.as_str(),
                    record.patient_id,
                    record.age,
                    record.gender.as_str(),
                    record.pregnancy_status,
                    record.temperature_f,
                    record.heart_rate_bpm,
                    record.respiration_rate,
                    record.bp_systolic,
                    record.bp_diastolic,
                    record.oxygen_saturation,
                    serde_json::to_string(&record.symptoms)?,
                    record.pain_level,
                    record.symptom_severity_weight,
                    record.consciousness.as_str(),
                    record.duration_of_symptoms_hrs,
                    serde_json::to_string(&record.comorbidities)?,
                    record.urgency.score(),
                    record.urgency.color().as_str(),
                    serde_json::to_string(&record.care_plan)?,
                    record.ai_recommendation_text,
                    record.triage_ai_summary,
                ])?;
            }
        }

        tx.execute(
            r#"
            INSERT INTO store_meta (key, value, updated_at)
            VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![WRITTEN_AT_KEY, chrono::Utc::now().to_rfc3339()],
        )?;

        tx.commit()?;
        Ok(())
    }
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: i64,
    submission_timestamp: i64,
    status: String,
    patient_id: String,
    age: u32,
    gender: String,
    pregnancy_status: Option<bool>,
    temperature_f: f64,
    heart_rate_bpm: u32,
    respiration_rate: u32,
    bp_systolic: u32,
    bp_diastolic: u32,
    oxygen_saturation: f64,
    symptoms: String,
    pain_level: u32,
    symptom_severity_weight: u32,
    consciousness: String,
    duration_of_symptoms_hrs: u32,
    comorbidities: String,
    urgency_score: u32,
    urgency_color: String,
    care_plan: String,
    ai_recommendation_text: String,
    triage_ai_summary: String,
}

impl TryFrom<PatientRow> for Patient {
    type Error = StoreError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let status = PatientStatus::parse(&row.status)
            .ok_or_else(|| corrupt(row.id, format!("unknown status {}", row.status)))?;
        let gender = Gender::parse(&row.gender)
            .ok_or_else(|| corrupt(row.id, format!("unknown gender {}", row.gender)))?;
        let consciousness = Consciousness::parse(&row.consciousness).ok_or_else(|| {
            corrupt(row.id, format!("unknown consciousness {}", row.consciousness))
        })?;
        let color = UrgencyColor::parse(&row.urgency_color)
            .ok_or_else(|| corrupt(row.id, format!("unknown color {}", row.urgency_color)))?;
        let urgency = Urgency::from_parts(row.urgency_score, color)
            .map_err(|e| corrupt(row.id, e.to_string()))?;

        let symptoms: Vec<String> = serde_json::from_str(&row.symptoms)
            .map_err(|e| corrupt(row.id, format!("symptoms: {}", e)))?;
        let comorbidities: Vec<String> = serde_json::from_str(&row.comorbidities)
            .map_err(|e| corrupt(row.id, format!("comorbidities: {}", e)))?;
        let care_plan: CarePlan = serde_json::from_str(&row.care_plan)
            .map_err(|e| corrupt(row.id, format!("care plan: {}", e)))?;

        Ok(Patient {
            id: row.id,
            submission_timestamp: row.submission_timestamp,
            status,
            record: NewPatient {
                patient_id: row.patient_id,
                age: row.age,
                gender,
                pregnancy_status: row.pregnancy_status,
                temperature_f: row.temperature_f,
                heart_rate_bpm: row.heart_rate_bpm,
                respiration_rate: row.respiration_rate,
                bp_systolic: row.bp_systolic,
                bp_diastolic: row.bp_diastolic,
                oxygen_saturation: row.oxygen_saturation,
                symptoms,
                pain_level: row.pain_level,
                symptom_severity_weight: row.symptom_severity_weight,
                consciousness,
                duration_of_symptoms_hrs: row.duration_of_symptoms_hrs,
                comorbidities,
                urgency,
                care_plan,
                ai_recommendation_text: row.ai_recommendation_text,
                triage_ai_summary: row.triage_ai_summary,
            },
        })
    }
}

fn corrupt(id: i64, detail: String) -> StoreError {
    StoreError::Corrupt(format!("patient {}: {}", id, detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientInput;
    use crate::store::{PatientStore, StepClock, DEFAULT_ACTIVE_LIMIT};

    fn setup_db() -> SqliteBackend {
        SqliteBackend::open_in_memory().unwrap()
    }

    fn make_patient(id: i64, score: u32) -> Patient {
        let mut input = PatientInput::new(format!("P{:04}", id));
        input.age = "54".into();
        input.gender = Some(Gender::Female);
        input.pregnancy_status = false;
        input.temperature_f = "100.4".into();
        input.oxygen_saturation = "95.5".into();
        input.symptoms = vec!["cough".into(), "fever".into()];
        input.comorbidities = vec!["none".into(), "asthma".into()];
        input.consciousness = Some(Consciousness::SemiConscious);

        Patient {
            id,
            submission_timestamp: 1_700_000_000_000 + id,
            status: PatientStatus::Active,
            record: NewPatient::from_intake(
                &input,
                Urgency::from_score(score),
                "Recommendation".into(),
                "Summary".into(),
            ),
        }
    }

    #[test]
    fn test_exists_after_first_write() {
        let mut db = setup_db();
        assert!(!db.exists().unwrap());

        db.write_all(&[]).unwrap();
        assert!(db.exists().unwrap());
        assert!(db.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_write_and_read_back() {
        let mut db = setup_db();
        let patients = vec![make_patient(1, 3), make_patient(2, 9)];
        db.write_all(&patients).unwrap();

        let mut read = db.read_all().unwrap();
        read.sort_by_key(|p| p.id);
        assert_eq!(read, patients);
        assert_eq!(read[0].record.comorbidities, vec!["none", "asthma"]);
        assert_eq!(read[0].record.pregnancy_status, Some(false));
        assert_eq!(read[1].urgency_color(), UrgencyColor::Red);
    }

    #[test]
    fn test_write_replaces_collection() {
        let mut db = setup_db();
        db.write_all(&[make_patient(1, 0), make_patient(2, 0)]).unwrap();
        db.write_all(&[make_patient(2, 0)]).unwrap();

        let read = db.read_all().unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].id, 2);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let mut db = setup_db();
        db.write_all(&[make_patient(1, 0)]).unwrap();

        // Duplicate primary key aborts the transaction
        let result = db.write_all(&[make_patient(5, 0), make_patient(5, 0)]);
        assert!(result.is_err());

        let read = db.read_all().unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].id, 1);
    }

    #[test]
    fn test_corrupt_row_is_reported() {
        let mut db = setup_db();
        db.write_all(&[make_patient(1, 0)]).unwrap();
        db.conn()
            .execute("UPDATE patients SET symptoms = 'not json' WHERE id = 1", [])
            .unwrap();

        assert!(matches!(db.read_all(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_inconsistent_color_is_reported() {
        let mut db = setup_db();
        db.write_all(&[make_patient(1, 2)]).unwrap();
        db.conn()
            .execute("UPDATE patients SET urgency_color = 'Red' WHERE id = 1", [])
            .unwrap();

        assert!(matches!(db.read_all(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_store_over_sqlite_degrades_on_corruption() {
        let mut store = PatientStore::with_clock(setup_db(), StepClock::new(1_000, 1));
        store.initialize().unwrap();
        assert_eq!(store.get_active(DEFAULT_ACTIVE_LIMIT).len(), 12);

        store
            .backend()
            .conn()
            .execute("UPDATE patients SET care_plan = '{' WHERE id = 3", [])
            .unwrap();

        assert!(store.get_all().is_empty());
        assert!(store.insert(make_patient(0, 0).record).is_err());
    }
}

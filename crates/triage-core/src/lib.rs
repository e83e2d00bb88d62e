//! Triage Core Library
//!
//! Rule-based urgency scoring and a durable patient queue for a clinical
//! triage dashboard.
//!
//! # Architecture
//!
//! ```text
//! Intake form → PatientInput
//!                    │
//!                    ▼
//!             ┌─────────────┐
//!             │   Scoring   │  fixed rule table → score → Green/Yellow/Red
//!             └──────┬──────┘
//!                    │
//!                    ▼
//!             ┌─────────────┐
//!             │  Narrator   │  best-effort summary, placeholder on failure
//!             └──────┬──────┘
//!                    │
//!                    ▼
//!     ┌───────────────────────────────┐
//!     │         PatientStore          │
//!     │  id = max + 1, timestamp now  │
//!     │  status ACTIVE → DISCHARGED   │
//!     └───────────────┬───────────────┘
//!                     │
//!         ┌───────────┼───────────────┐
//!         ▼           ▼               ▼
//!    Active queue  Discharged     Dashboard
//!    (newest 15)     list         aggregates
//! ```
//!
//! # Core Principle
//!
//! **Scoring is deterministic.** The urgency of a record is computed once from
//! its vitals and never depends on narrative text or store state.
//!
//! # Modules
//!
//! - [`models`]: Domain types (PatientInput, Patient, Urgency, etc.)
//! - [`scoring`]: Urgency rule table and classification
//! - [`intake`]: Submission pipeline and the narrator seam
//! - [`store`]: Patient store over a pluggable storage backend
//! - [`db`]: SQLite storage backend
//! - [`config`]: Runtime configuration
//! - [`dashboard`]: Severity breakdown, symptom frequency, most urgent
//! - [`validation`]: Hard limits and critical-range alerts for vitals
//! - [`vocabulary`]: Common symptom and comorbidity tags

pub mod config;
pub mod dashboard;
pub mod db;
pub mod intake;
pub mod models;
pub mod scoring;
pub mod store;
pub mod validation;
pub mod vocabulary;

// Re-export commonly used types
pub use config::{DynPatientStore, TriageConfig};
pub use dashboard::DashboardSummary;
pub use db::SqliteBackend;
pub use intake::{run_intake, IntakeNarrative, NarrativeError, NarrativeResult, Narrator};
pub use models::{
    CarePlan, Consciousness, Gender, NewPatient, Patient, PatientInput, PatientStatus, Urgency,
    UrgencyColor,
};
pub use scoring::{assess, score, TriageAssessment, TriageRule};
pub use store::{MemoryBackend, PatientStore, StorageBackend, StoreError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use tracing::info;

use crate::intake::OfflineNarrator;
use crate::validation::VitalField;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum TriageError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StoreError> for TriageError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidTransition { .. } => TriageError::InvalidInput(e.to_string()),
            _ => TriageError::StorageError(e.to_string()),
        }
    }
}

impl From<validation::ValidationError> for TriageError {
    fn from(e: validation::ValidationError) -> Self {
        TriageError::InvalidInput(e.to_string())
    }
}

impl From<config::ConfigError> for TriageError {
    fn from(e: config::ConfigError) -> Self {
        TriageError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for TriageError {
    fn from(e: serde_json::Error) -> Self {
        TriageError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for TriageError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        TriageError::StorageError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a store at the given path, seeding it on first use.
///
/// FFI factories narrate with [`OfflineNarrator`]. Rust hosts pass their own
/// narrator, e.g. a configured `PromptNarrator`, to [`TriageCore::open`].
#[uniffi::export]
pub fn open_store(path: String) -> Result<Arc<TriageCore>, TriageError> {
    let config = TriageConfig {
        database_path: Some(path.into()),
        ..TriageConfig::default()
    };
    TriageCore::open(&config, Arc::new(OfflineNarrator))
}

/// Create a seeded in-memory store (for testing).
#[uniffi::export]
pub fn open_store_in_memory() -> Result<Arc<TriageCore>, TriageError> {
    TriageCore::open(&TriageConfig::default(), Arc::new(OfflineNarrator))
}

/// Open the store described by the process environment.
#[uniffi::export]
pub fn open_store_from_env() -> Result<Arc<TriageCore>, TriageError> {
    let config = TriageConfig::from_env()?;
    TriageCore::open(&config, Arc::new(OfflineNarrator))
}

/// Score a submission without storing it.
#[uniffi::export]
pub fn score_input(input: FfiPatientInput) -> Result<FfiAssessment, TriageError> {
    let input = PatientInput::try_from(input)?;
    Ok(scoring::assess(&input).into())
}

/// Critical-range alerts for a submission's vitals.
#[uniffi::export]
pub fn critical_alerts(input: FfiPatientInput) -> Result<Vec<FfiCriticalAlert>, TriageError> {
    let input = PatientInput::try_from(input)?;
    Ok(validation::critical_alerts(&input)
        .into_iter()
        .map(|a| a.into())
        .collect())
}

/// Check one form entry against its field's hard limit.
///
/// `field` is the record key, e.g. "heart_rate_bpm".
#[uniffi::export]
pub fn check_vital(field: String, value: String) -> Result<(), TriageError> {
    let field = VitalField::parse(&field)
        .ok_or_else(|| TriageError::InvalidInput(format!("unknown vital {}", field)))?;
    Ok(validation::check_hard_limit(field, &value)?)
}

/// Symptom mentioned in a dictated phrase, if any.
#[uniffi::export]
pub fn match_spoken_symptom(transcript: String) -> Option<String> {
    vocabulary::match_transcript(&transcript, &vocabulary::COMMON_SYMPTOMS).map(String::from)
}

/// Comorbidity mentioned in a dictated phrase, if any.
#[uniffi::export]
pub fn match_spoken_comorbidity(transcript: String) -> Option<String> {
    vocabulary::match_transcript(&transcript, &vocabulary::COMMON_COMORBIDITIES).map(String::from)
}

/// Ranked vocabulary suggestions for a partially typed symptom.
#[uniffi::export]
pub fn suggest_symptoms(query: String, limit: u32) -> Vec<String> {
    vocabulary::suggest(&query, &vocabulary::COMMON_SYMPTOMS, limit as usize)
        .into_iter()
        .map(String::from)
        .collect()
}

/// Ranked vocabulary suggestions for a partially typed comorbidity.
#[uniffi::export]
pub fn suggest_comorbidities(query: String, limit: u32) -> Vec<String> {
    vocabulary::suggest(&query, &vocabulary::COMMON_COMORBIDITIES, limit as usize)
        .into_iter()
        .map(String::from)
        .collect()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI.
///
/// The store lock covers single store calls only. Id assignment and the write
/// happen inside one `insert`, so concurrent submissions never share an id,
/// and a slow narrator never blocks readers.
#[derive(uniffi::Object)]
pub struct TriageCore {
    store: Arc<Mutex<DynPatientStore>>,
    narrator: Arc<dyn Narrator>,
    active_limit: usize,
}

impl TriageCore {
    /// Open the configured store with a specific narrator.
    pub fn open(
        config: &TriageConfig,
        narrator: Arc<dyn Narrator>,
    ) -> Result<Arc<Self>, TriageError> {
        let store = config.open_store()?;
        Ok(Arc::new(Self::with_narrator(
            store,
            narrator,
            config.active_queue_limit,
        )))
    }

    /// Wrap an already opened store.
    pub fn with_narrator(
        store: DynPatientStore,
        narrator: Arc<dyn Narrator>,
        active_limit: usize,
    ) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            narrator,
            active_limit,
        }
    }

    fn require_patient(&self, id: i64) -> Result<Patient, TriageError> {
        let store = self.store.lock()?;
        store
            .find(id)
            .ok_or_else(|| TriageError::NotFound(format!("patient {}", id)))
    }
}

#[uniffi::export]
impl TriageCore {
    // =========================================================================
    // Store Operations
    // =========================================================================

    /// Seed the built-in dataset if nothing has been stored yet.
    pub fn initialize(&self) -> Result<bool, TriageError> {
        let mut store = self.store.lock()?;
        Ok(store.initialize()?)
    }

    /// All records, newest first.
    pub fn all_patients(&self) -> Result<Vec<FfiPatient>, TriageError> {
        let store = self.store.lock()?;
        Ok(store.get_all().into_iter().map(|p| p.into()).collect())
    }

    /// Newest active records, up to `limit` (`None` means the configured size).
    pub fn active_patients(&self, limit: Option<u32>) -> Result<Vec<FfiPatient>, TriageError> {
        let limit = limit.map_or(self.active_limit, |n| n as usize);
        let store = self.store.lock()?;
        Ok(store
            .get_active(limit)
            .into_iter()
            .map(|p| p.into())
            .collect())
    }

    /// All discharged records, newest first.
    pub fn discharged_patients(&self) -> Result<Vec<FfiPatient>, TriageError> {
        let store = self.store.lock()?;
        Ok(store
            .get_discharged()
            .into_iter()
            .map(|p| p.into())
            .collect())
    }

    /// Get a record by store id.
    pub fn find_patient(&self, id: i64) -> Result<Option<FfiPatient>, TriageError> {
        let store = self.store.lock()?;
        Ok(store.find(id).map(|p| p.into()))
    }

    /// Score, narrate and store a submission.
    ///
    /// Entries past a field's hard limit are refused before anything is stored.
    pub fn submit_intake(&self, input: FfiPatientInput) -> Result<FfiPatient, TriageError> {
        let input = PatientInput::try_from(input)?;
        validation::check_hard_limits(&input)?;

        // Narration runs unlocked; only the insert needs the store
        let record = run_intake(&input, self.narrator.as_ref());
        let patient = self.store.lock()?.insert(record)?;
        info!(id = patient.id, "intake stored");
        Ok(patient.into())
    }

    /// Discharge a patient. Returns false for unknown or already discharged ids.
    pub fn discharge(&self, id: i64) -> Result<bool, TriageError> {
        let mut store = self.store.lock()?;
        Ok(store.discharge(id)?)
    }

    /// Suggested display id for the next intake.
    pub fn next_patient_id(&self) -> Result<String, TriageError> {
        let store = self.store.lock()?;
        Ok(store.next_patient_id())
    }

    // =========================================================================
    // Dashboard Operations
    // =========================================================================

    /// Aggregates over the active queue.
    pub fn dashboard_summary(&self) -> Result<FfiDashboardSummary, TriageError> {
        let store = self.store.lock()?;
        let active = store.get_active(self.active_limit);
        Ok(DashboardSummary::from_patients(&active).into())
    }

    /// Dashboard aggregates as JSON.
    pub fn dashboard_summary_json(&self) -> Result<String, TriageError> {
        let store = self.store.lock()?;
        let active = store.get_active(self.active_limit);
        Ok(serde_json::to_string(&DashboardSummary::from_patients(
            &active,
        ))?)
    }

    // =========================================================================
    // Narrative Operations
    // =========================================================================

    /// Vitals analysis for a stored patient. Falls back to placeholder text.
    pub fn vitals_narrative(&self, id: i64) -> Result<String, TriageError> {
        let patient = self.require_patient(id)?;
        Ok(intake::describe_vitals(self.narrator.as_ref(), &patient))
    }

    /// Score explanation for a stored patient. Falls back to placeholder text.
    pub fn score_narrative(&self, id: i64) -> Result<String, TriageError> {
        let patient = self.require_patient(id)?;
        Ok(intake::explain_score(self.narrator.as_ref(), &patient))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe intake submission.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiPatientInput {
    pub patient_id: String,
    pub age: String,
    pub gender: Option<String>,
    pub pregnancy_status: bool,
    pub temperature_f: String,
    pub heart_rate_bpm: String,
    pub oxygen_saturation: String,
    pub bp_systolic: String,
    pub bp_diastolic: String,
    pub respiration_rate: String,
    pub symptoms: Vec<String>,
    pub consciousness: Option<String>,
    pub comorbidities: Vec<String>,
}

impl TryFrom<FfiPatientInput> for PatientInput {
    type Error = TriageError;

    fn try_from(input: FfiPatientInput) -> Result<Self, Self::Error> {
        let gender = match input.gender.as_deref().filter(|g| !g.is_empty()) {
            Some(g) => Some(
                Gender::parse(g)
                    .ok_or_else(|| TriageError::InvalidInput(format!("unknown gender {}", g)))?,
            ),
            None => None,
        };
        let consciousness = match input.consciousness.as_deref().filter(|c| !c.is_empty()) {
            Some(c) => Some(Consciousness::parse(c).ok_or_else(|| {
                TriageError::InvalidInput(format!("unknown consciousness {}", c))
            })?),
            None => None,
        };

        Ok(PatientInput {
            patient_id: input.patient_id,
            age: input.age,
            gender,
            pregnancy_status: input.pregnancy_status,
            temperature_f: input.temperature_f,
            heart_rate_bpm: input.heart_rate_bpm,
            oxygen_saturation: input.oxygen_saturation,
            bp_systolic: input.bp_systolic,
            bp_diastolic: input.bp_diastolic,
            respiration_rate: input.respiration_rate,
            symptoms: input.symptoms,
            consciousness,
            comorbidities: input.comorbidities,
        })
    }
}

/// FFI-safe care plan.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCarePlan {
    pub recommended_drugs: String,
    pub actions_during_symptoms: String,
    pub actions_after_drug: String,
    pub estimated_recovery_time_hrs: u32,
    pub follow_up_reminder: String,
}

impl From<CarePlan> for FfiCarePlan {
    fn from(plan: CarePlan) -> Self {
        Self {
            recommended_drugs: plan.recommended_drugs,
            actions_during_symptoms: plan.actions_during_symptoms,
            actions_after_drug: plan.actions_after_drug,
            estimated_recovery_time_hrs: plan.estimated_recovery_time_hrs,
            follow_up_reminder: plan.follow_up_reminder,
        }
    }
}

/// FFI-safe stored patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: i64,
    pub submission_timestamp: i64,
    pub status: String,
    pub patient_id: String,
    pub age: u32,
    pub gender: String,
    pub pregnancy_status: Option<bool>,
    pub temperature_f: f64,
    pub heart_rate_bpm: u32,
    pub respiration_rate: u32,
    pub bp_systolic: u32,
    pub bp_diastolic: u32,
    pub oxygen_saturation: f64,
    pub symptoms: Vec<String>,
    pub consciousness: String,
    pub comorbidities: Vec<String>,
    pub urgency_score: u32,
    pub urgency_color: String,
    pub care_plan: FfiCarePlan,
    pub ai_recommendation_text: String,
    pub triage_ai_summary: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        let record = patient.record;
        Self {
            id: patient.id,
            submission_timestamp: patient.submission_timestamp,
            status: patient.status.as_str().to_string(),
            patient_id: record.patient_id,
            age: record.age,
            gender: record.gender.as_str().to_string(),
            pregnancy_status: record.pregnancy_status,
            temperature_f: record.temperature_f,
            heart_rate_bpm: record.heart_rate_bpm,
            respiration_rate: record.respiration_rate,
            bp_systolic: record.bp_systolic,
            bp_diastolic: record.bp_diastolic,
            oxygen_saturation: record.oxygen_saturation,
            symptoms: record.symptoms,
            consciousness: record.consciousness.as_str().to_string(),
            comorbidities: record.comorbidities,
            urgency_score: record.urgency.score(),
            urgency_color: record.urgency.color().as_str().to_string(),
            care_plan: record.care_plan.into(),
            ai_recommendation_text: record.ai_recommendation_text,
            triage_ai_summary: record.triage_ai_summary,
        }
    }
}

/// FFI-safe triggered rule.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiScoreFactor {
    pub rule: String,
    pub description: String,
    pub points: u32,
}

/// FFI-safe scoring result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAssessment {
    pub score: u32,
    pub color: String,
    pub factors: Vec<FfiScoreFactor>,
    /// Plain-text breakdown, available without the narrative service
    pub explanation: String,
}

impl From<TriageAssessment> for FfiAssessment {
    fn from(assessment: TriageAssessment) -> Self {
        let explanation = intake::breakdown_text(&assessment);
        Self {
            score: assessment.score(),
            color: assessment.color().as_str().to_string(),
            factors: assessment
                .factors
                .into_iter()
                .map(|f| FfiScoreFactor {
                    rule: format!("{:?}", f.rule),
                    description: f.rule.description().to_string(),
                    points: f.points,
                })
                .collect(),
            explanation,
        }
    }
}

/// FFI-safe critical-range alert.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCriticalAlert {
    pub field: String,
    pub value: String,
    pub message: String,
}

impl From<validation::CriticalAlert> for FfiCriticalAlert {
    fn from(alert: validation::CriticalAlert) -> Self {
        Self {
            field: alert.field.key().to_string(),
            value: alert.value,
            message: alert.message,
        }
    }
}

/// FFI-safe symptom count.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSymptomCount {
    pub symptom: String,
    pub count: u32,
}

/// FFI-safe dashboard aggregates.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboardSummary {
    pub red: u32,
    pub yellow: u32,
    pub green: u32,
    pub top_symptoms: Vec<FfiSymptomCount>,
    pub most_urgent: Vec<FfiPatient>,
}

impl From<DashboardSummary> for FfiDashboardSummary {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            red: summary.severity.red as u32,
            yellow: summary.severity.yellow as u32,
            green: summary.severity.green as u32,
            top_symptoms: summary
                .top_symptoms
                .into_iter()
                .map(|s| FfiSymptomCount {
                    symptom: s.symptom,
                    count: s.count as u32,
                })
                .collect(),
            most_urgent: summary.most_urgent.into_iter().map(|p| p.into()).collect(),
        }
    }
}

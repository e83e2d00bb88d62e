//! Patient store: identity, timestamps, status transitions and queue queries.
//!
//! Reads never fail past this boundary. An unreadable collection is logged and
//! treated as empty. Writes (`initialize`, `insert`, `update_status`) report
//! every failure to the caller.

mod backend;
mod clock;
mod seed;

pub use backend::*;
pub use clock::*;
pub use seed::*;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{NewPatient, Patient, PatientStatus};

/// Default size of the active queue.
pub const DEFAULT_ACTIVE_LIMIT: usize = 15;

/// Spacing between seeded submissions.
pub const SEED_INTERVAL_MS: i64 = 5 * 60 * 1000;

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored data is unreadable: {0}")]
    Corrupt(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Patient {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: i64,
        from: PatientStatus,
        to: PatientStatus,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable collection of patient records.
pub struct PatientStore<B> {
    backend: B,
    clock: Box<dyn Clock>,
}

impl<B: StorageBackend> PatientStore<B> {
    /// Create a store stamping inserts with the system clock.
    pub fn new(backend: B) -> Self {
        Self::with_clock(backend, SystemClock)
    }

    pub fn with_clock(backend: B, clock: impl Clock + 'static) -> Self {
        Self {
            backend,
            clock: Box::new(clock),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Seed the built-in dataset if nothing has been persisted yet.
    ///
    /// Returns `true` when seeding happened.
    pub fn initialize(&mut self) -> StoreResult<bool> {
        let seed = seed_records()?;
        self.initialize_with(&seed)
    }

    /// Seed `records` if nothing has been persisted yet.
    ///
    /// Ids run from 1 in slice order; timestamps are spaced five minutes apart
    /// ending five minutes before now, oldest first.
    pub fn initialize_with(&mut self, records: &[NewPatient]) -> StoreResult<bool> {
        if self.backend.exists()? {
            debug!("patient store already initialized");
            return Ok(false);
        }

        let now = self.clock.now_millis();
        let count = records.len() as i64;
        let seeded: Vec<Patient> = records
            .iter()
            .zip(0_i64..)
            .map(|(record, index)| Patient {
                id: index + 1,
                submission_timestamp: now - (count - index) * SEED_INTERVAL_MS,
                status: PatientStatus::Active,
                record: record.clone(),
            })
            .collect();

        self.backend.write_all(&seeded)?;
        info!(count = seeded.len(), "seeded patient store");
        Ok(true)
    }

    /// Every record, most recent submission first.
    pub fn get_all(&self) -> Vec<Patient> {
        let mut patients = self.load();
        patients.sort_by(|a, b| {
            b.submission_timestamp
                .cmp(&a.submission_timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });
        patients
    }

    /// The `limit` most recent active records.
    pub fn get_active(&self, limit: usize) -> Vec<Patient> {
        self.get_all()
            .into_iter()
            .filter(|p| p.status == PatientStatus::Active)
            .take(limit)
            .collect()
    }

    /// All discharged records, most recent first.
    pub fn get_discharged(&self) -> Vec<Patient> {
        self.get_all()
            .into_iter()
            .filter(|p| p.status == PatientStatus::Discharged)
            .collect()
    }

    /// Look up a record by store id.
    pub fn find(&self, id: i64) -> Option<Patient> {
        self.load().into_iter().find(|p| p.id == id)
    }

    /// Persist a new record as active and return it with its assigned id.
    ///
    /// The id is one above the highest id ever stored (1 for an empty store).
    /// Nothing is considered stored until the backend write succeeds.
    pub fn insert(&mut self, record: NewPatient) -> StoreResult<Patient> {
        let mut patients = self.backend.read_all()?;
        let id = patients.iter().map(|p| p.id).max().map_or(1, |max| max + 1);

        let patient = Patient {
            id,
            submission_timestamp: self.clock.now_millis(),
            status: PatientStatus::Active,
            record,
        };
        patients.push(patient.clone());
        self.backend.write_all(&patients)?;

        info!(
            id,
            patient_id = %patient.record.patient_id,
            score = patient.urgency_score(),
            color = %patient.urgency_color(),
            "inserted patient"
        );
        Ok(patient)
    }

    /// Move a record to `status`.
    ///
    /// Returns `Ok(true)` when the status changed. An unknown id or a record
    /// already in `status` is a no-op returning `Ok(false)`. Discharged records
    /// never return to the active queue.
    pub fn update_status(&mut self, id: i64, status: PatientStatus) -> StoreResult<bool> {
        let mut patients = self.backend.read_all()?;

        let Some(patient) = patients.iter_mut().find(|p| p.id == id) else {
            warn!(id, %status, "status update for unknown patient ignored");
            return Ok(false);
        };

        if patient.status == status {
            debug!(id, %status, "patient already in requested status");
            return Ok(false);
        }

        if !patient.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                id,
                from: patient.status,
                to: status,
            });
        }

        let from = patient.status;
        patient.status = status;
        self.backend.write_all(&patients)?;

        info!(id, %from, to = %status, "patient status updated");
        Ok(true)
    }

    /// Discharge a patient from the active queue.
    pub fn discharge(&mut self, id: i64) -> StoreResult<bool> {
        self.update_status(id, PatientStatus::Discharged)
    }

    /// Display id for the next intake, e.g. "P0012".
    ///
    /// Derived from the current record count, so it is advisory only.
    pub fn next_patient_id(&self) -> String {
        format!("P{:04}", self.load().len() + 1)
    }

    fn load(&self) -> Vec<Patient> {
        match self.backend.read_all() {
            Ok(patients) => patients,
            Err(e) => {
                warn!(error = %e, "patient store unreadable, treating as empty");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PatientInput, Urgency};

    fn record(display_id: &str, score: u32) -> NewPatient {
        NewPatient::from_intake(
            &PatientInput::new(display_id),
            Urgency::from_score(score),
            "recommendation".into(),
            "summary".into(),
        )
    }

    fn store() -> PatientStore<MemoryBackend> {
        PatientStore::with_clock(MemoryBackend::new(), StepClock::new(1_000_000, 1_000))
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut store = store();
        let first = store.insert(record("P0001", 2)).unwrap();
        let second = store.insert(record("P0002", 9)).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.status, PatientStatus::Active);
        assert!(second.submission_timestamp > first.submission_timestamp);
    }

    #[test]
    fn test_insert_continues_after_max_id() {
        let mut store = store();
        store.initialize_with(&[record("P0001", 1), record("P0002", 1)]).unwrap();
        store.discharge(2).unwrap();

        let inserted = store.insert(record("P0003", 0)).unwrap();
        assert_eq!(inserted.id, 3);
    }

    #[test]
    fn test_get_all_most_recent_first() {
        let mut store = store();
        store.insert(record("P0001", 0)).unwrap();
        store.insert(record("P0002", 0)).unwrap();
        store.insert(record("P0003", 0)).unwrap();

        let ids: Vec<i64> = store.get_all().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_equal_timestamps_order_by_id() {
        let mut store = PatientStore::with_clock(MemoryBackend::new(), StepClock::new(5, 0));
        store.insert(record("P0001", 0)).unwrap();
        store.insert(record("P0002", 0)).unwrap();

        let ids: Vec<i64> = store.get_all().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_get_active_limit_and_filter() {
        let mut store = store();
        for i in 1..=20 {
            store.insert(record(&format!("P{:04}", i), 0)).unwrap();
        }
        store.discharge(20).unwrap();

        let active = store.get_active(DEFAULT_ACTIVE_LIMIT);
        assert_eq!(active.len(), 15);
        assert!(active.iter().all(|p| p.is_active()));
        assert_eq!(active[0].id, 19);

        assert_eq!(store.get_active(3).len(), 3);
        assert!(store.get_active(0).is_empty());
    }

    #[test]
    fn test_discharge_moves_between_views() {
        let mut store = store();
        let patient = store.insert(record("P0001", 5)).unwrap();

        assert!(store.discharge(patient.id).unwrap());

        assert!(store.get_active(DEFAULT_ACTIVE_LIMIT).is_empty());
        let discharged = store.get_discharged();
        assert_eq!(discharged.len(), 1);
        assert_eq!(discharged[0].id, patient.id);
        // Archive keeps everything
        assert_eq!(store.get_all().len(), 1);
    }

    #[test]
    fn test_discharge_is_idempotent() {
        let mut store = store();
        let patient = store.insert(record("P0001", 5)).unwrap();
        assert!(store.discharge(patient.id).unwrap());
        let writes = store.backend().write_count();

        assert!(!store.discharge(patient.id).unwrap());
        assert_eq!(store.backend().write_count(), writes);
    }

    #[test]
    fn test_reactivation_rejected() {
        let mut store = store();
        let patient = store.insert(record("P0001", 5)).unwrap();
        store.discharge(patient.id).unwrap();

        let err = store
            .update_status(patient.id, PatientStatus::Active)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { id, .. } if id == patient.id));
        assert_eq!(
            store.find(patient.id).unwrap().status,
            PatientStatus::Discharged
        );
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut store = store();
        store.insert(record("P0001", 5)).unwrap();
        let writes = store.backend().write_count();

        assert!(!store.discharge(99).unwrap());
        assert_eq!(store.backend().write_count(), writes);
        assert_eq!(store.get_active(DEFAULT_ACTIVE_LIMIT).len(), 1);
    }

    #[test]
    fn test_failed_write_is_reported_and_not_stored() {
        let mut store = store();
        store.insert(record("P0001", 0)).unwrap();
        store.backend_mut().set_fail_writes(true);

        let result = store.insert(record("P0002", 0));
        assert!(matches!(result, Err(StoreError::WriteFailed(_))));

        store.backend_mut().set_fail_writes(false);
        assert_eq!(store.get_all().len(), 1);
        // Id 2 was never durable, so it is handed out again
        assert_eq!(store.insert(record("P0002", 0)).unwrap().id, 2);
    }

    #[test]
    fn test_failed_status_write_is_reported() {
        let mut store = store();
        let patient = store.insert(record("P0001", 0)).unwrap();
        store.backend_mut().set_fail_writes(true);

        assert!(store.discharge(patient.id).is_err());
        store.backend_mut().set_fail_writes(false);
        assert!(store.find(patient.id).unwrap().is_active());
    }

    #[test]
    fn test_corrupt_reads_degrade_to_empty() {
        let mut store = store();
        store.insert(record("P0001", 0)).unwrap();
        store.backend_mut().set_corrupt_reads(true);

        assert!(store.get_all().is_empty());
        assert!(store.get_active(DEFAULT_ACTIVE_LIMIT).is_empty());
        assert!(store.get_discharged().is_empty());
        assert!(store.find(1).is_none());
        assert_eq!(store.next_patient_id(), "P0001");
    }

    #[test]
    fn test_corrupt_reads_block_writes() {
        let mut store = store();
        store.insert(record("P0001", 0)).unwrap();
        store.backend_mut().set_corrupt_reads(true);

        assert!(matches!(
            store.insert(record("P0002", 0)),
            Err(StoreError::Corrupt(_))
        ));
        assert!(store.discharge(1).is_err());
    }

    #[test]
    fn test_initialize_seeds_once() {
        let mut store = store();
        assert!(store.initialize().unwrap());
        let first = store.get_all();
        assert!(!first.is_empty());

        assert!(!store.initialize().unwrap());
        assert_eq!(store.get_all(), first);
    }

    #[test]
    fn test_initialize_does_not_overwrite_existing() {
        let mut store = store();
        store.insert(record("P0001", 0)).unwrap();

        assert!(!store.initialize().unwrap());
        assert_eq!(store.get_all().len(), 1);
    }

    #[test]
    fn test_seed_timestamps_spaced_oldest_first() {
        let mut store = PatientStore::with_clock(MemoryBackend::new(), StepClock::new(10_000_000, 0));
        store
            .initialize_with(&[record("P0001", 0), record("P0002", 0), record("P0003", 0)])
            .unwrap();

        let mut seeded = store.get_all();
        seeded.sort_by_key(|p| p.id);
        assert_eq!(seeded[0].submission_timestamp, 10_000_000 - 3 * SEED_INTERVAL_MS);
        assert_eq!(seeded[1].submission_timestamp, 10_000_000 - 2 * SEED_INTERVAL_MS);
        assert_eq!(seeded[2].submission_timestamp, 10_000_000 - SEED_INTERVAL_MS);
        assert!(seeded.iter().all(|p| p.is_active()));
    }

    #[test]
    fn test_initialize_write_failure_reported() {
        let mut backend = MemoryBackend::new();
        backend.set_fail_writes(true);
        let mut store = PatientStore::new(backend);
        assert!(store.initialize().is_err());
    }

    #[test]
    fn test_next_patient_id() {
        let mut store = store();
        assert_eq!(store.next_patient_id(), "P0001");
        store.insert(record("P0001", 0)).unwrap();
        store.insert(record("P0002", 0)).unwrap();
        assert_eq!(store.next_patient_id(), "P0003");
    }
}

//! Persistence seam for the patient store.

use super::{StoreError, StoreResult};
use crate::models::Patient;

/// Read-all / write-all persistence for the patient collection.
///
/// `write_all` must be atomic: either every record is persisted or none is.
pub trait StorageBackend {
    /// Whether the collection has ever been written.
    fn exists(&self) -> StoreResult<bool>;

    /// Load every persisted record, in no particular order.
    fn read_all(&self) -> StoreResult<Vec<Patient>>;

    /// Replace the persisted collection.
    fn write_all(&mut self, patients: &[Patient]) -> StoreResult<()>;
}

/// In-process backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    patients: Option<Vec<Patient>>,
    fail_writes: bool,
    corrupt_reads: bool,
    write_count: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing collection.
    pub fn with_patients(patients: Vec<Patient>) -> Self {
        Self {
            patients: Some(patients),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make subsequent reads report unreadable data.
    pub fn set_corrupt_reads(&mut self, corrupt: bool) {
        self.corrupt_reads = corrupt;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.write_count
    }
}

impl StorageBackend for MemoryBackend {
    fn exists(&self) -> StoreResult<bool> {
        Ok(self.patients.is_some())
    }

    fn read_all(&self) -> StoreResult<Vec<Patient>> {
        if self.corrupt_reads {
            return Err(StoreError::Corrupt("memory backend marked corrupt".into()));
        }
        Ok(self.patients.clone().unwrap_or_default())
    }

    fn write_all(&mut self, patients: &[Patient]) -> StoreResult<()> {
        if self.fail_writes {
            return Err(StoreError::WriteFailed("memory backend rejected write".into()));
        }
        self.patients = Some(patients.to_vec());
        self.write_count += 1;
        Ok(())
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn exists(&self) -> StoreResult<bool> {
        (**self).exists()
    }

    fn read_all(&self) -> StoreResult<Vec<Patient>> {
        (**self).read_all()
    }

    fn write_all(&mut self, patients: &[Patient]) -> StoreResult<()> {
        (**self).write_all(patients)
    }
}

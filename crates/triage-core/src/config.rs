//! Runtime configuration.
//!
//! Resolved once at startup and passed into the store. Request handling never
//! reads the process environment.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::db::SqliteBackend;
use crate::store::{PatientStore, StorageBackend, StoreResult, DEFAULT_ACTIVE_LIMIT};

/// Path to the SQLite database file. Unset means in-memory.
pub const ENV_DB_PATH: &str = "TRIAGE_DB_PATH";
/// Size of the active queue.
pub const ENV_ACTIVE_LIMIT: &str = "TRIAGE_ACTIVE_LIMIT";
/// Whether to seed an empty store on open.
pub const ENV_SEED: &str = "TRIAGE_SEED";

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Store whose backend is chosen at runtime.
pub type DynPatientStore = PatientStore<Box<dyn StorageBackend + Send>>;

/// Triage runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageConfig {
    pub database_path: Option<PathBuf>,
    pub active_queue_limit: usize,
    pub seed_on_open: bool,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            active_queue_limit: DEFAULT_ACTIVE_LIMIT,
            seed_on_open: true,
        }
    }
}

impl TriageConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup(ENV_ACTIVE_LIMIT) {
            config.active_queue_limit = match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => return Err(invalid(ENV_ACTIVE_LIMIT, raw)),
            };
        }

        if let Some(raw) = lookup(ENV_SEED) {
            config.seed_on_open = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(invalid(ENV_SEED, raw)),
            };
        }

        Ok(config)
    }

    /// Open the configured backend and seed it if requested.
    pub fn open_store(&self) -> StoreResult<DynPatientStore> {
        let backend: Box<dyn StorageBackend + Send> = match &self.database_path {
            Some(path) => Box::new(SqliteBackend::open(path)?),
            None => Box::new(SqliteBackend::open_in_memory()?),
        };

        let mut store = PatientStore::new(backend);
        if self.seed_on_open {
            store.initialize()?;
        }

        info!(
            path = ?self.database_path,
            active_queue_limit = self.active_queue_limit,
            "patient store opened"
        );
        Ok(store)
    }
}

fn invalid(key: &str, value: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TriageConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, TriageConfig::default());
        assert_eq!(config.active_queue_limit, 15);
        assert!(config.seed_on_open);
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = TriageConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/var/lib/triage/store.db"),
            (ENV_ACTIVE_LIMIT, "25"),
            (ENV_SEED, "off"),
        ]))
        .unwrap();

        assert_eq!(
            config.database_path,
            Some(PathBuf::from("/var/lib/triage/store.db"))
        );
        assert_eq!(config.active_queue_limit, 25);
        assert!(!config.seed_on_open);
    }

    #[test]
    fn test_invalid_values() {
        assert!(TriageConfig::from_lookup(lookup(&[(ENV_ACTIVE_LIMIT, "0")])).is_err());
        assert!(TriageConfig::from_lookup(lookup(&[(ENV_ACTIVE_LIMIT, "many")])).is_err());
        assert!(TriageConfig::from_lookup(lookup(&[(ENV_SEED, "maybe")])).is_err());
    }

    #[test]
    fn test_open_in_memory_store_seeds() {
        let store = TriageConfig::default().open_store().unwrap();
        assert_eq!(store.get_all().len(), 12);
    }

    #[test]
    fn test_open_without_seed() {
        let config = TriageConfig {
            seed_on_open: false,
            ..TriageConfig::default()
        };
        let store = config.open_store().unwrap();
        assert!(store.get_all().is_empty());
    }
}

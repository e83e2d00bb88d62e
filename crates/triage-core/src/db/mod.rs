//! SQLite persistence for the patient store.

mod patients;
mod schema;

pub use schema::*;

use rusqlite::Connection;
use std::path::Path;

use crate::store::StoreResult;

/// SQLite-backed [`StorageBackend`](crate::store::StorageBackend).
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

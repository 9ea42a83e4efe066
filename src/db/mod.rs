//! Statute cache storage.
//!
//! The only database surface the pipeline touches: a get/put/delete contract
//! keyed by `(jurisdiction, normalized_key)`. Case/violation persistence
//! belongs to the collaborating application, not this crate.

pub mod statute_cache;

pub use statute_cache::SqliteStatuteCache;

use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;

use crate::models::{Jurisdiction, StatuteRecord};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Narrow cache contract the statute resolver depends on.
///
/// Implementations must be cheap to call from async contexts (local storage,
/// no network). Last-writer-wins on `put` is acceptable: writes for a given
/// key are idempotent per citation/content.
pub trait StatuteStore: Send + Sync {
    fn get(
        &self,
        jurisdiction: Jurisdiction,
        key: &str,
    ) -> Result<Option<StatuteRecord>, DatabaseError>;

    fn put(&self, record: &StatuteRecord) -> Result<(), DatabaseError>;

    fn delete(&self, jurisdiction: Jurisdiction, key: &str) -> Result<(), DatabaseError>;
}

/// Open (or create) the cache database at `path` and ensure the schema.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// In-memory database for tests.
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS statute_cache (
            jurisdiction   TEXT NOT NULL,
            normalized_key TEXT NOT NULL,
            title          TEXT NOT NULL,
            text           TEXT NOT NULL,
            url            TEXT NOT NULL,
            fetched_at     TEXT NOT NULL,
            PRIMARY KEY (jurisdiction, normalized_key)
        );",
    )?;
    Ok(())
}

//! SQLite-backed statute cache with a time-to-live.
//!
//! Expired rows are deleted at read time and reported as misses, so the
//! resolver sees exactly one notion of "cached": present, fresh, and (after
//! its own re-validation) still genuine statute content.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};

use super::{DatabaseError, StatuteStore};
use crate::models::{Jurisdiction, StatuteRecord};

pub struct SqliteStatuteCache {
    conn: Mutex<Connection>,
    ttl: Duration,
}

impl SqliteStatuteCache {
    pub fn new(conn: Connection, ttl_hours: i64) -> Self {
        Self {
            conn: Mutex::new(conn),
            ttl: Duration::hours(ttl_hours),
        }
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<StatuteRecord, rusqlite::Error> {
        let jurisdiction_str: String = row.get(0)?;
        let fetched_str: String = row.get(5)?;

        let jurisdiction = Jurisdiction::from_str(&jurisdiction_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                format!("unknown jurisdiction '{jurisdiction_str}'").into(),
            )
        })?;
        let fetched_at = DateTime::parse_from_rfc3339(&fetched_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    5,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })?;

        Ok(StatuteRecord {
            jurisdiction,
            normalized_key: row.get(1)?,
            title: row.get(2)?,
            text: row.get(3)?,
            url: row.get(4)?,
            fetched_at,
        })
    }
}

impl StatuteStore for SqliteStatuteCache {
    fn get(
        &self,
        jurisdiction: Jurisdiction,
        key: &str,
    ) -> Result<Option<StatuteRecord>, DatabaseError> {
        let conn = self.conn.lock().expect("statute cache lock poisoned");

        let mut stmt = conn.prepare(
            "SELECT jurisdiction, normalized_key, title, text, url, fetched_at
             FROM statute_cache
             WHERE jurisdiction = ?1 AND normalized_key = ?2
             LIMIT 1",
        )?;
        let mut rows = stmt.query_map(params![jurisdiction.as_str(), key], Self::row_to_record)?;

        let record = match rows.next() {
            Some(row) => row?,
            None => return Ok(None),
        };
        drop(rows);
        drop(stmt);

        if Utc::now() - record.fetched_at > self.ttl {
            conn.execute(
                "DELETE FROM statute_cache WHERE jurisdiction = ?1 AND normalized_key = ?2",
                params![jurisdiction.as_str(), key],
            )?;
            tracing::debug!(
                jurisdiction = jurisdiction.as_str(),
                key,
                "Statute cache entry expired, evicted"
            );
            return Ok(None);
        }

        Ok(Some(record))
    }

    fn put(&self, record: &StatuteRecord) -> Result<(), DatabaseError> {
        let conn = self.conn.lock().expect("statute cache lock poisoned");
        conn.execute(
            "INSERT INTO statute_cache (jurisdiction, normalized_key, title, text, url, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(jurisdiction, normalized_key) DO UPDATE SET
               title = excluded.title,
               text = excluded.text,
               url = excluded.url,
               fetched_at = excluded.fetched_at",
            params![
                record.jurisdiction.as_str(),
                record.normalized_key,
                record.title,
                record.text,
                record.url,
                record.fetched_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn delete(&self, jurisdiction: Jurisdiction, key: &str) -> Result<(), DatabaseError> {
        let conn = self.conn.lock().expect("statute cache lock poisoned");
        conn.execute(
            "DELETE FROM statute_cache WHERE jurisdiction = ?1 AND normalized_key = ?2",
            params![jurisdiction.as_str(), key],
        )?;
        Ok(())
    }
}

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use super::RosterCache;
use crate::error::AppResult;
use crate::utils::current_timestamp;

/// Cache slots persisted in a SQLite file
///
/// Each write is a single upsert statement, so a crash leaves either the old
/// or the new blob in place.
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    pub fn open<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> AppResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache_slots (
                slot TEXT PRIMARY KEY,
                blob TEXT NOT NULL,
                written_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl RosterCache for SqliteCache {
    fn read_slot(&self, slot: &str) -> AppResult<Option<String>> {
        let conn = self.conn.lock()?;
        let blob = conn
            .query_row(
                "SELECT blob FROM cache_slots WHERE slot = ?1",
                params![slot],
                |row| row.get(0),
            )
            .optional()?;
        Ok(blob)
    }

    fn write_slot(&self, slot: &str, blob: &str) -> AppResult<()> {
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT INTO cache_slots (slot, blob, written_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(slot) DO UPDATE SET blob = excluded.blob, written_at = excluded.written_at",
            params![slot, blob, current_timestamp()],
        )?;
        Ok(())
    }
}

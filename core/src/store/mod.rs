//! SQLite persistence layer for finished result sets.
//!
//! RULE: Only the store talks to the database.
//! The engine never touches SQL; callers hand it a finished ResultSet.

use crate::error::RoiResult;
mod results;
use rusqlite::{params, Connection, OptionalExtension};

pub struct ResultStore {
    conn: Connection,
}

impl ResultStore {
    pub fn open(path: &str) -> RoiResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> RoiResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> RoiResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        conversion_value: f64,
        record_count: usize,
        version: &str,
    ) -> RoiResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, conversion_value, record_count, version, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                run_id,
                conversion_value,
                record_count as i64,
                version,
                chrono::Utc::now().timestamp(),
            ],
        )?;
        Ok(())
    }

    pub fn run_exists(&self, run_id: &str) -> RoiResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM run WHERE run_id = ?1",
                params![run_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn run_count(&self) -> RoiResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM run", [], |row| row.get(0))?;
        Ok(count)
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Issuance log — append-only SQLite record of every seal attempt.
//
// Schema:
//   issuance_log(
//     id             INTEGER PRIMARY KEY AUTOINCREMENT,
//     timestamp      TEXT    NOT NULL,   -- RFC 3339
//     action         TEXT    NOT NULL,   -- e.g. "seal"
//     device_serial  TEXT,               -- serial of the erased device, if known
//     artifact_hash  TEXT    NOT NULL,   -- SHA-256 hex of the signed PDF (or canonical record on failure)
//     success        INTEGER NOT NULL,   -- 0 = failure, 1 = success
//     details        TEXT                -- stage / error context
//   )

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use wipeseal_core::error::WipesealError;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS issuance_log (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp      TEXT    NOT NULL,
    action         TEXT    NOT NULL,
    device_serial  TEXT,
    artifact_hash  TEXT    NOT NULL,
    success        INTEGER NOT NULL,
    details        TEXT
);";

/// Convert a `rusqlite::Error` into a `WipesealError::Database`.
fn db_err(e: rusqlite::Error) -> WipesealError {
    WipesealError::Database(e.to_string())
}

/// One row of the issuance log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceEntry {
    pub id: i64,
    pub timestamp: String,
    pub action: String,
    pub device_serial: Option<String>,
    pub artifact_hash: String,
    pub success: bool,
    pub details: Option<String>,
}

/// What to append to the log.
#[derive(Debug, Clone, Copy)]
pub struct IssuanceEvent<'a> {
    pub action: &'a str,
    pub device_serial: Option<&'a str>,
    pub artifact_hash: &'a str,
    pub success: bool,
    pub details: Option<&'a str>,
}

/// Append-only issuance log backed by SQLite.
pub struct IssuanceLog {
    conn: Connection,
}

impl IssuanceLog {
    /// Open (or create) the log database at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WipesealError> {
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(db_err)?;
        Self::init(conn)
    }

    /// Open an in-memory log (useful for tests).
    pub fn open_in_memory() -> Result<Self, WipesealError> {
        Self::init(Connection::open_in_memory().map_err(db_err)?)
    }

    fn init(conn: Connection) -> Result<Self, WipesealError> {
        conn.execute_batch(CREATE_TABLE).map_err(db_err)?;
        debug!("issuance log opened");
        Ok(Self { conn })
    }

    /// Append one event.
    #[instrument(skip(self), fields(action = event.action, success = event.success))]
    pub fn record(&self, event: &IssuanceEvent<'_>) -> Result<(), WipesealError> {
        self.conn
            .execute(
                "INSERT INTO issuance_log
                    (timestamp, action, device_serial, artifact_hash, success, details)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    Utc::now().to_rfc3339(),
                    event.action,
                    event.device_serial,
                    event.artifact_hash,
                    i32::from(event.success),
                    event.details
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    /// All entries for one device serial, oldest first.
    pub fn entries_for_device(&self, serial: &str) -> Result<Vec<IssuanceEntry>, WipesealError> {
        self.query(
            "SELECT id, timestamp, action, device_serial, artifact_hash, success, details
             FROM issuance_log WHERE device_serial = ?1 ORDER BY id ASC",
            params![serial],
        )
    }

    /// The most recent `limit` entries, newest first.
    pub fn recent_entries(&self, limit: u32) -> Result<Vec<IssuanceEntry>, WipesealError> {
        self.query(
            "SELECT id, timestamp, action, device_serial, artifact_hash, success, details
             FROM issuance_log ORDER BY id DESC LIMIT ?1",
            params![limit],
        )
    }

    /// Total number of entries.
    pub fn count(&self) -> Result<u64, WipesealError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM issuance_log", [], |row| row.get(0))
            .map_err(db_err)
    }

    fn query(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<IssuanceEntry>, WipesealError> {
        let mut stmt = self.conn.prepare(sql).map_err(db_err)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok(IssuanceEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    action: row.get(2)?,
                    device_serial: row.get(3)?,
                    artifact_hash: row.get(4)?,
                    success: row.get::<_, i32>(5)? != 0,
                    details: row.get(6)?,
                })
            })
            .map_err(db_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }
}

//! SQLite-based storage.
//!
//! Provides persistent storage for:
//! - Key-value store for application state (the allowance record lives here)
//! - History of granted spins and their reel outcomes

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::{data_dir, KvStore};
use crate::error::StorageError;
use crate::reels::ReelOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinRecord {
    pub id: i64,
    pub spun_at: DateTime<Utc>,
    pub reels: [String; 3],
    pub jackpot: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SpinStats {
    pub total_spins: u64,
    pub jackpots: u64,
    pub today_spins: u64,
}

/// SQLite database for spin state and history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/spinroom.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unusable or the database cannot
    /// be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let dir = data_dir().map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Self::open_at(dir.join("spinroom.db"))
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database. Nothing survives the value.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS spins (
                id       INTEGER PRIMARY KEY AUTOINCREMENT,
                spun_at  TEXT NOT NULL,
                reel1    TEXT NOT NULL,
                reel2    TEXT NOT NULL,
                reel3    TEXT NOT NULL,
                jackpot  INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_spins_spun_at ON spins(spun_at);",
        )?;
        Ok(())
    }

    /// Append a granted spin to the history.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_spin(
        &self,
        spun_at: DateTime<Utc>,
        outcome: &ReelOutcome,
    ) -> Result<i64, StorageError> {
        let [reel1, reel2, reel3] = &outcome.reels;
        self.conn.execute(
            "INSERT INTO spins (spun_at, reel1, reel2, reel3, jackpot)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                spun_at.to_rfc3339(),
                reel1,
                reel2,
                reel3,
                outcome.jackpot,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent spins first.
    pub fn recent_spins(&self, limit: usize) -> Result<Vec<SpinRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, spun_at, reel1, reel2, reel3, jackpot
             FROM spins
             ORDER BY id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                [
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ],
                row.get::<_, bool>(5)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, spun_at, reels, jackpot) = row?;
            let spun_at = DateTime::parse_from_rfc3339(&spun_at)
                .map_err(|e| StorageError::InvalidRecord {
                    key: format!("spins/{id}"),
                    message: e.to_string(),
                })?
                .with_timezone(&Utc);
            records.push(SpinRecord {
                id,
                spun_at,
                reels,
                jackpot,
            });
        }
        Ok(records)
    }

    pub fn spin_stats(&self) -> Result<SpinStats, StorageError> {
        let (total_spins, jackpots) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(jackpot), 0) FROM spins",
            [],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;

        let today = Utc::now().format("%Y-%m-%d").to_string();
        let today_spins = self.conn.query_row(
            "SELECT COUNT(*) FROM spins WHERE spun_at >= ?1",
            params![format!("{today}T00:00:00+00:00")],
            |row| row.get::<_, u64>(0),
        )?;

        Ok(SpinStats {
            total_spins,
            jackpots,
            today_spins,
        })
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl KvStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.kv_get(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(self.kv_set(key, value)?)
    }
}

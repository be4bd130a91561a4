//! Named key/value slots holding one serialized store document.
//!
//! # Responsibility
//! - Abstract the persistence medium behind whole-value read/replace.
//! - Provide SQLite-backed and in-memory implementations.
//!
//! # Invariants
//! - `write` replaces the full value or leaves the previous one intact.
//! - `read` returns `None` only when the slot was never written.

use crate::db::{open_db, DbError};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Default slot key for the store document.
pub const STORE_SLOT_KEY: &str = "store";

pub type SlotResult<T> = Result<T, SlotError>;

#[derive(Debug)]
pub enum SlotError {
    Db(DbError),
    Encode(serde_json::Error),
    Unavailable(String),
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode store document: {err}"),
            Self::Unavailable(message) => write!(f, "store slot unavailable: {message}"),
        }
    }
}

impl Error for SlotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for SlotError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SlotError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence medium for exactly one named value.
pub trait StorageSlot {
    fn read(&self) -> SlotResult<Option<String>>;
    fn write(&mut self, value: &str) -> SlotResult<()>;
}

/// Slot stored as one row of the `kv_slots` table.
pub struct SqliteSlot {
    conn: Connection,
    key: String,
}

impl SqliteSlot {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    /// Opens the slot database at `path` and binds `key`.
    pub fn open(path: impl AsRef<Path>, key: impl Into<String>) -> SlotResult<Self> {
        Ok(Self::new(open_db(path)?, key))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl StorageSlot for SqliteSlot {
    fn read(&self) -> SlotResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, value: &str) -> SlotResult<()> {
        self.conn.execute(
            "INSERT INTO kv_slots (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.key.as_str(), value],
        )?;
        Ok(())
    }
}

/// Process-local slot for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    value: Option<String>,
    writes: usize,
    fail_writes: bool,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot that already holds `value`.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Number of successful writes since creation.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Makes every later write fail with `SlotError::Unavailable`.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl StorageSlot for MemorySlot {
    fn read(&self) -> SlotResult<Option<String>> {
        Ok(self.value.clone())
    }

    fn write(&mut self, value: &str) -> SlotResult<()> {
        if self.fail_writes {
            return Err(SlotError::Unavailable("writes disabled".to_string()));
        }
        self.value = Some(value.to_string());
        self.writes += 1;
        Ok(())
    }
}

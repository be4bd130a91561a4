//! Local SQLite file backing the persisted store slots.
//!
//! # Responsibility
//! - Open a connection, configure it, and bring the `kv_slots` table layout
//!   up to date before any slot access.
//!
//! # Invariants
//! - Table layout is tracked in `PRAGMA user_version`, independent of the
//!   store document `version` held inside a slot value.
//! - A database written by a newer binary is refused at open time.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// `user_version` is ahead of every layout this binary knows.
    NewerLayout { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::NewerLayout { found, supported } => write!(
                f,
                "slot database layout v{found} is newer than supported v{supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::NewerLayout { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

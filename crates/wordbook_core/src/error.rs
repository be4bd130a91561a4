//! Store load/validation error taxonomy.
//!
//! # Responsibility
//! - Name every way a persisted document can fail to become a latest-version
//!   in-memory store.
//! - Provide stable error codes for log events.
//!
//! # Invariants
//! - The gateway matches every variant explicitly; adding a variant is a
//!   compile-time gap there.

use crate::store::slot::SlotError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// Slot bytes are not valid JSON text.
    Decode(serde_json::Error),
    /// Not an object, or no integer `version >= 1`.
    MalformedBase(String),
    /// `version` is an integer the registry does not know.
    UnknownVersion(i64),
    /// Known version, but a declared field has the wrong shape.
    SchemaMismatch {
        version: u32,
        field: String,
        expected: &'static str,
    },
    /// Known version with no upgrade path to the latest one.
    UnmigratableVersion(u32),
    /// Persistence medium could not be read.
    Slot(SlotError),
}

impl StoreError {
    /// Stable snake_case code used in `error_code=` log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode_failed",
            Self::MalformedBase(_) => "malformed_base",
            Self::UnknownVersion(_) => "unknown_version",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::UnmigratableVersion(_) => "unmigratable_version",
            Self::Slot(_) => "slot_read_failed",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "store slot is not valid JSON: {err}"),
            Self::MalformedBase(message) => write!(f, "malformed store document: {message}"),
            Self::UnknownVersion(version) => write!(f, "unknown store version {version}"),
            Self::SchemaMismatch {
                version,
                field,
                expected,
            } => write!(
                f,
                "store v{version} field `{field}` does not match schema: expected {expected}"
            ),
            Self::UnmigratableVersion(version) => {
                write!(f, "no migration registered from store version {version}")
            }
            Self::Slot(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::Slot(err) => Some(err),
            Self::MalformedBase(_)
            | Self::UnknownVersion(_)
            | Self::SchemaMismatch { .. }
            | Self::UnmigratableVersion(_) => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

impl From<SlotError> for StoreError {
    fn from(value: SlotError) -> Self {
        Self::Slot(value)
    }
}

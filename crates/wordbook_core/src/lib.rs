//! Core persistence logic for the Wordbook flashcard app.
//! This crate owns the versioned local store and its invariants.

pub mod db;
pub mod error;
pub mod logging;
pub mod migrate;
pub mod model;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use migrate::migrate;
pub use model::word::{usable_words, Word, WordValidationError};
pub use schema::{parse, validate, LatestStore, StoreDocument, LATEST};
pub use store::{
    Collection, MemorySlot, SlotError, SqliteSlot, StorageSlot, StoreGateway, WordStore,
    STORE_SLOT_KEY,
};

/// Minimal health-check API for shell integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Persisted store: slot medium, gateway and in-memory facade.
//!
//! # Responsibility
//! - Own every read and write of the persisted document.
//! - Expose the collection operations the UI layer is allowed to call.
//!
//! # Invariants
//! - `StoreGateway` is the only caller of `StorageSlot`.
//! - `WordStore` is the only caller of `StoreGateway::save`.

pub mod facade;
pub mod gateway;
pub mod slot;

pub use facade::{Collection, CollectionHandle, WordStore};
pub use gateway::StoreGateway;
pub use slot::{MemorySlot, SlotError, SlotResult, SqliteSlot, StorageSlot, STORE_SLOT_KEY};

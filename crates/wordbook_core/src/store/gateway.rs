//! The only component that touches the persistence slot.
//!
//! # Responsibility
//! - Load, validate and migrate the persisted document into `LatestStore`.
//! - Self-heal the slot: persist migrations, reset unusable documents.
//! - Serialize and write the full latest document.
//!
//! # Invariants
//! - `load` never fails; every `StoreError` resolves to the default document.
//! - An absent slot is not written by `load`, neither is an already-latest one.

use super::slot::{SlotError, SlotResult, StorageSlot};
use crate::error::{StoreError, StoreResult};
use crate::migrate::migrate;
use crate::schema::{encode, latest_default, parse, LatestStore, LATEST};
use log::{error, info, warn};
use std::time::Instant;

/// Outcome of the fallible load path.
#[derive(Debug)]
enum Loaded {
    Absent,
    Current(LatestStore),
    Migrated { from: u32, store: LatestStore },
}

pub struct StoreGateway<S: StorageSlot> {
    slot: S,
}

impl<S: StorageSlot> StoreGateway<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Loads the latest-version document, repairing the slot when needed.
    ///
    /// # Side effects
    /// - Writes the migrated document after an upgrade.
    /// - Writes the default document after any load error.
    /// - Emits `store_load`, `store_migrate` and `store_reset` events.
    pub fn load(&mut self) -> LatestStore {
        let started_at = Instant::now();

        match self.try_load() {
            Ok(Loaded::Absent) => {
                info!(
                    "event=store_load module=store status=absent version={} duration_ms={}",
                    LATEST,
                    started_at.elapsed().as_millis()
                );
                latest_default()
            }
            Ok(Loaded::Current(store)) => {
                info!(
                    "event=store_load module=store status=ok version={} bookmarks={} wrong_logs={} duration_ms={}",
                    LATEST,
                    store.bookmark.len(),
                    store.wrong_logs.len(),
                    started_at.elapsed().as_millis()
                );
                store
            }
            Ok(Loaded::Migrated { from, store }) => {
                match self.save(&store) {
                    Ok(()) => info!(
                        "event=store_migrate module=store status=ok from={} to={} duration_ms={}",
                        from,
                        LATEST,
                        started_at.elapsed().as_millis()
                    ),
                    Err(err) => error!(
                        "event=store_migrate module=store status=error from={} to={} error_code=slot_write_failed error={}",
                        from, LATEST, err
                    ),
                }
                store
            }
            Err(err) => self.recover(err),
        }
    }

    /// Serializes `store` and replaces the slot value.
    pub fn save(&mut self, store: &LatestStore) -> SlotResult<()> {
        let text = encode(store).map_err(SlotError::Encode)?;
        self.slot.write(&text)
    }

    fn try_load(&self) -> StoreResult<Loaded> {
        let Some(text) = self.slot.read()? else {
            return Ok(Loaded::Absent);
        };

        let doc = parse(&text)?;
        let from = doc.version();
        let store = migrate(doc)?;

        if from == LATEST {
            Ok(Loaded::Current(store))
        } else {
            Ok(Loaded::Migrated { from, store })
        }
    }

    fn recover(&mut self, err: StoreError) -> LatestStore {
        match &err {
            StoreError::Decode(_)
            | StoreError::MalformedBase(_)
            | StoreError::UnknownVersion(_)
            | StoreError::SchemaMismatch { .. }
            | StoreError::UnmigratableVersion(_)
            | StoreError::Slot(_) => self.reset(&err),
        }
    }

    fn reset(&mut self, cause: &StoreError) -> LatestStore {
        warn!(
            "event=store_reset module=store status=start version={} error_code={} error={}",
            LATEST,
            cause.code(),
            cause
        );

        let defaults = latest_default();
        if let Err(err) = self.save(&defaults) {
            error!(
                "event=store_reset module=store status=error error_code=slot_write_failed error={}",
                err
            );
        }
        defaults
    }
}

//! Store document migration registry and executor.
//!
//! # Responsibility
//! - Register one upgrade step per adjacent version pair.
//! - Chain steps until a document reaches `LATEST`.
//!
//! # Invariants
//! - Each step maps version `from` to exactly `from + 1` and never fails for
//!   valid input of its version.
//! - `migrate` applies at most `LATEST - v` steps.
//! - Steps are lossy by design; nothing outside the next shape is salvaged.

use crate::error::{StoreError, StoreResult};
use crate::schema::{LatestStore, StoreDocument, StoreV1, StoreV2, LATEST};
use log::debug;

#[derive(Debug, Clone, Copy)]
pub struct MigrationStep {
    pub from: u32,
    /// Returns the input unchanged when it is not at version `from`.
    apply: fn(StoreDocument) -> Result<StoreDocument, StoreDocument>,
}

pub const MIGRATIONS: &[MigrationStep] = &[MigrationStep {
    from: 1,
    apply: step_v1_to_v2,
}];

/// Upgrades a validated document to the latest version.
///
/// # Errors
/// - `UnmigratableVersion` when the chain has no step for an intermediate
///   version, or a step does not advance by exactly one version.
pub fn migrate(doc: StoreDocument) -> StoreResult<LatestStore> {
    migrate_with(doc, MIGRATIONS)
}

pub(crate) fn migrate_with(
    mut doc: StoreDocument,
    steps: &[MigrationStep],
) -> StoreResult<LatestStore> {
    while doc.version() < LATEST {
        let from = doc.version();
        let step = steps
            .iter()
            .find(|step| step.from == from)
            .ok_or(StoreError::UnmigratableVersion(from))?;

        doc = (step.apply)(doc).map_err(|_| StoreError::UnmigratableVersion(from))?;
        if doc.version() != from + 1 {
            return Err(StoreError::UnmigratableVersion(from));
        }
        debug!(
            "event=store_migrate_step module=migrate status=ok from={} to={}",
            from,
            doc.version()
        );
    }

    match doc {
        StoreDocument::V2(latest) => Ok(latest),
        other => Err(StoreError::UnmigratableVersion(other.version())),
    }
}

/// v1 -> v2: keep bookmarks, drop answer tallies, start an empty wrong log.
pub fn v1_to_v2(doc: StoreV1) -> StoreV2 {
    StoreV2 {
        bookmark: doc.bookmark,
        wrong_logs: Vec::new(),
    }
}

fn step_v1_to_v2(doc: StoreDocument) -> Result<StoreDocument, StoreDocument> {
    match doc {
        StoreDocument::V1(v1) => Ok(StoreDocument::V2(v1_to_v2(v1))),
        other => Err(other),
    }
}

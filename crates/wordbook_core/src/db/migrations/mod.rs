//! Table layout steps for the slot database.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct LayoutStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const LAYOUT_STEPS: &[LayoutStep] = &[LayoutStep {
    version: 1,
    name: "kv_slots",
    sql: include_str!("0001_kv_slots.sql"),
}];

/// Latest table layout version known by this binary.
pub fn latest_layout() -> u32 {
    LAYOUT_STEPS.last().map_or(0, |step| step.version)
}

/// Reads the layout version recorded in the database header.
pub fn layout_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Applies every pending layout step inside one transaction.
///
/// # Errors
/// - `NewerLayout` when the file was written by a newer binary.
pub fn upgrade_layout(conn: &mut Connection) -> DbResult<()> {
    let found = layout_version(conn)?;
    let supported = latest_layout();
    if found > supported {
        return Err(DbError::NewerLayout { found, supported });
    }

    let pending: Vec<&LayoutStep> = LAYOUT_STEPS
        .iter()
        .filter(|step| step.version > found)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_layout module=db status=ok step={} version={}",
            step.name, step.version
        );
    }
    tx.commit()?;
    Ok(())
}

//! CLI probe for the persisted store.
//!
//! # Responsibility
//! - Verify `wordbook_core` linkage.
//! - Load (and thereby migrate or reset) a store database and print it.
//!
//! Usage: `wordbook_cli [DB_PATH]`

use std::process::ExitCode;
use wordbook_core::schema::encode;
use wordbook_core::{SqliteSlot, StoreGateway, WordStore, LATEST, STORE_SLOT_KEY};

fn main() -> ExitCode {
    println!("wordbook_core ping={}", wordbook_core::ping());
    println!("wordbook_core version={}", wordbook_core::core_version());
    println!("wordbook_core store_version={LATEST}");

    let Some(path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let slot = match SqliteSlot::open(&path, STORE_SLOT_KEY) {
        Ok(slot) => slot,
        Err(err) => {
            eprintln!("failed to open `{path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    let store = WordStore::init(StoreGateway::new(slot));

    match encode(store.document()) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to encode store: {err}");
            ExitCode::FAILURE
        }
    }
}

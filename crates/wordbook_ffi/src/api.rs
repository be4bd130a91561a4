//! FFI store API for the Flutter shell.
//!
//! # Responsibility
//! - Expose the store facade operations as sync FRB functions.
//! - Own the single process-wide `WordStore`.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - The store is hydrated once, on first use, from the resolved DB path.

use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use wordbook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Collection, SqliteSlot, StoreGateway, Word, WordStore, STORE_SLOT_KEY,
};

const STORE_DB_FILE_NAME: &str = "wordbook_store.sqlite3";
static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE: Mutex<Option<WordStore<SqliteSlot>>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Exposes core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - Safe to repeat with the same `level + log_dir`.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Store collection selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreCollection {
    Bookmark,
    WrongLog,
}

impl From<StoreCollection> for Collection {
    fn from(value: StoreCollection) -> Self {
        match value {
            StoreCollection::Bookmark => Collection::Bookmark,
            StoreCollection::WrongLog => Collection::WrongLog,
        }
    }
}

/// Word record as seen by the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordItem {
    pub word: String,
    pub furigana: String,
    pub meaning: String,
}

impl From<Word> for WordItem {
    fn from(value: Word) -> Self {
        Self {
            word: value.word,
            furigana: value.furigana,
            meaning: value.meaning,
        }
    }
}

impl From<WordItem> for Word {
    fn from(value: WordItem) -> Self {
        Word::new(value.word, value.furigana, value.meaning)
    }
}

/// Result envelope for store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreActionResponse {
    /// Whether the operation completed (no-ops included).
    pub ok: bool,
    /// Number of entries added or removed.
    pub changed: u32,
    pub message: String,
}

impl StoreActionResponse {
    fn success(changed: usize, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            changed: u32::try_from(changed).unwrap_or(u32::MAX),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            changed: 0,
            message: message.into(),
        }
    }
}

/// Lists one collection in insertion order; empty on store failure.
#[flutter_rust_bridge::frb(sync)]
pub fn store_list(collection: StoreCollection) -> Vec<WordItem> {
    with_store(|store| {
        store
            .list(collection.into())
            .iter()
            .cloned()
            .map(WordItem::from)
            .collect()
    })
    .unwrap_or_else(|err| {
        warn!("event=ffi_store module=ffi status=error op=list error={err}");
        Vec::new()
    })
}

/// Exact-match membership; `false` on store failure.
#[flutter_rust_bridge::frb(sync)]
pub fn store_has(collection: StoreCollection, word: String) -> bool {
    with_store(|store| store.has(collection.into(), word.as_str())).unwrap_or(false)
}

/// Adds one or more words, skipping keys already present.
#[flutter_rust_bridge::frb(sync)]
pub fn store_add(collection: StoreCollection, words: Vec<WordItem>) -> StoreActionResponse {
    respond("store_add", |store| {
        store
            .add_all(collection.into(), words.into_iter().map(Word::from))
            .map_err(|err| err.to_string())
    })
}

/// Removes one word by key; absent keys are a successful no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn store_remove(collection: StoreCollection, word: String) -> StoreActionResponse {
    respond("store_remove", |store| {
        store
            .remove(collection.into(), word.as_str())
            .map(usize::from)
            .map_err(|err| err.to_string())
    })
}

/// Clears one collection.
#[flutter_rust_bridge::frb(sync)]
pub fn store_remove_all(collection: StoreCollection) -> StoreActionResponse {
    respond("store_remove_all", |store| {
        let collection = Collection::from(collection);
        let removed = store.list(collection).len();
        store
            .remove_all(collection)
            .map(|()| removed)
            .map_err(|err| err.to_string())
    })
}

/// Bookmarks every word currently in the wrong log.
#[flutter_rust_bridge::frb(sync)]
pub fn store_bookmark_wrong_log() -> StoreActionResponse {
    respond("store_bookmark_wrong_log", |store| {
        store.bookmark_wrong_log().map_err(|err| err.to_string())
    })
}

/// Resolves reserved word-set keys (`bookmarks`, `wrongLog`).
///
/// Returns `None` for keys the shell must fetch remotely.
#[flutter_rust_bridge::frb(sync)]
pub fn store_word_set(key: String) -> Option<Vec<WordItem>> {
    with_store(|store| store.word_set(key.trim()))
        .ok()
        .flatten()
        .map(|words| words.into_iter().map(WordItem::from).collect())
}

fn respond(
    op: &str,
    f: impl FnOnce(&mut WordStore<SqliteSlot>) -> Result<usize, String>,
) -> StoreActionResponse {
    match with_store(f).and_then(|result| result) {
        Ok(0) => StoreActionResponse::success(0, "No change."),
        Ok(changed) => StoreActionResponse::success(changed, format!("Updated {changed} word(s).")),
        Err(err) => StoreActionResponse::failure(format!("{op} failed: {err}")),
    }
}

fn resolve_store_db_path() -> PathBuf {
    STORE_DB_PATH.get_or_init(default_store_db_path).clone()
}

#[cfg(not(test))]
fn default_store_db_path() -> PathBuf {
    if let Ok(raw) = std::env::var("WORDBOOK_DB_PATH") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(STORE_DB_FILE_NAME)
}

/// Unit tests get a fresh per-process database instead of the shared one.
#[cfg(test)]
fn default_store_db_path() -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "wordbook_store-test-{}.sqlite3",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    path
}

fn with_store<T>(f: impl FnOnce(&mut WordStore<SqliteSlot>) -> T) -> Result<T, String> {
    let mut guard = STORE
        .lock()
        .map_err(|_| "store lock poisoned".to_string())?;

    if guard.is_none() {
        let slot = SqliteSlot::open(resolve_store_db_path(), STORE_SLOT_KEY)
            .map_err(|err| format!("store DB open failed: {err}"))?;
        *guard = Some(WordStore::init(StoreGateway::new(slot)));
    }

    match guard.as_mut() {
        Some(store) => Ok(f(store)),
        None => Err("store is not initialized".to_string()),
    }
}

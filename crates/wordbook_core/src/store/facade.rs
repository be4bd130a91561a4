//! In-memory store handle exposed to the UI layer.
//!
//! # Responsibility
//! - Hold the single cached `LatestStore`, hydrated once at startup.
//! - Provide list/has/add/remove/remove_all over bookmark and wrong log.
//! - Write the full document through the gateway after every change.
//!
//! # Invariants
//! - `word` keys are unique within each collection.
//! - The cache only advances after the slot write succeeded, so memory and
//!   persistence never diverge.
//! - Operations that change nothing do not write.

use super::gateway::StoreGateway;
use super::slot::{SlotResult, StorageSlot};
use crate::model::word::Word;
use crate::schema::LatestStore;
use log::{debug, error, warn};
use std::collections::HashSet;

/// Word collections held by the latest store shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Bookmark,
    WrongLog,
}

impl Collection {
    pub fn label(self) -> &'static str {
        match self {
            Self::Bookmark => "bookmark",
            Self::WrongLog => "wrong_log",
        }
    }

    /// Reserved word-set key served from this collection.
    pub fn word_set_key(self) -> &'static str {
        match self {
            Self::Bookmark => "bookmarks",
            Self::WrongLog => "wrongLog",
        }
    }

    pub fn from_word_set_key(key: &str) -> Option<Self> {
        [Self::Bookmark, Self::WrongLog]
            .into_iter()
            .find(|collection| collection.word_set_key() == key)
    }

    fn words(self, store: &LatestStore) -> &Vec<Word> {
        match self {
            Self::Bookmark => &store.bookmark,
            Self::WrongLog => &store.wrong_logs,
        }
    }

    fn words_mut(self, store: &mut LatestStore) -> &mut Vec<Word> {
        match self {
            Self::Bookmark => &mut store.bookmark,
            Self::WrongLog => &mut store.wrong_logs,
        }
    }
}

/// Explicitly constructed store passed by reference to its users.
pub struct WordStore<S: StorageSlot> {
    gateway: StoreGateway<S>,
    cache: LatestStore,
}

impl<S: StorageSlot> WordStore<S> {
    /// Loads (and migrates or resets) the persisted document.
    ///
    /// Repeated or empty `word` keys in the persisted document are dropped,
    /// keeping the first occurrence, and the cleaned document is written back.
    pub fn init(mut gateway: StoreGateway<S>) -> Self {
        let loaded = gateway.load();
        let cache = normalized(loaded.clone());
        if cache != loaded {
            match gateway.save(&cache) {
                Ok(()) => warn!(
                    "event=store_normalize module=store status=ok dropped={}",
                    entry_count(&loaded) - entry_count(&cache)
                ),
                Err(err) => error!(
                    "event=store_normalize module=store status=error error_code=slot_write_failed error={}",
                    err
                ),
            }
        }
        Self { gateway, cache }
    }

    /// Read-only view of the whole cached document.
    pub fn document(&self) -> &LatestStore {
        &self.cache
    }

    pub fn gateway(&self) -> &StoreGateway<S> {
        &self.gateway
    }

    pub fn bookmark(&mut self) -> CollectionHandle<'_, S> {
        self.collection(Collection::Bookmark)
    }

    pub fn wrong_log(&mut self) -> CollectionHandle<'_, S> {
        self.collection(Collection::WrongLog)
    }

    pub fn collection(&mut self, collection: Collection) -> CollectionHandle<'_, S> {
        CollectionHandle {
            store: self,
            collection,
        }
    }

    /// Words of `collection` in insertion order.
    pub fn list(&self, collection: Collection) -> &[Word] {
        collection.words(&self.cache)
    }

    /// Exact-match membership by `word` key.
    pub fn has(&self, collection: Collection, word: &str) -> bool {
        self.list(collection).iter().any(|entry| entry.word == word)
    }

    /// Appends `word` unless its key is already present.
    ///
    /// Returns whether the word was inserted.
    pub fn add(&mut self, collection: Collection, word: Word) -> SlotResult<bool> {
        Ok(self.add_all(collection, [word])? == 1)
    }

    /// Appends every word whose key is not yet present, skipping repeats
    /// within the batch and records with an empty `word`.
    ///
    /// Returns the number of inserted words.
    pub fn add_all(
        &mut self,
        collection: Collection,
        words: impl IntoIterator<Item = Word>,
    ) -> SlotResult<usize> {
        let mut seen: HashSet<String> = self
            .list(collection)
            .iter()
            .map(|entry| entry.word.clone())
            .collect();

        let mut fresh = Vec::new();
        for word in words {
            if word.validate().is_err() {
                warn!(
                    "event=store_mutation module=store status=skipped op=add collection={} reason=empty_word",
                    collection.label()
                );
                continue;
            }
            if seen.insert(word.word.clone()) {
                fresh.push(word);
            }
        }

        let added = fresh.len();
        if added == 0 {
            return Ok(0);
        }

        let mut next = self.cache.clone();
        collection.words_mut(&mut next).extend(fresh);
        self.commit(next, "add", collection)?;
        Ok(added)
    }

    /// Removes the entry keyed by `word`; absent keys are a no-op.
    ///
    /// Returns whether an entry was removed.
    pub fn remove(&mut self, collection: Collection, word: &str) -> SlotResult<bool> {
        if !self.has(collection, word) {
            return Ok(false);
        }

        let mut next = self.cache.clone();
        collection
            .words_mut(&mut next)
            .retain(|entry| entry.word != word);
        self.commit(next, "remove", collection)?;
        Ok(true)
    }

    /// Empties `collection`, leaving the other collection untouched.
    pub fn remove_all(&mut self, collection: Collection) -> SlotResult<()> {
        if self.list(collection).is_empty() {
            return Ok(());
        }

        let mut next = self.cache.clone();
        collection.words_mut(&mut next).clear();
        self.commit(next, "remove_all", collection)
    }

    /// Bookmarks every word currently in the wrong log.
    pub fn bookmark_wrong_log(&mut self) -> SlotResult<usize> {
        let wrong = self.cache.wrong_logs.clone();
        self.add_all(Collection::Bookmark, wrong)
    }

    /// Resolves a reserved word-set key to a copy of its collection.
    ///
    /// Returns `None` for keys served by the remote word-list loader.
    pub fn word_set(&self, key: &str) -> Option<Vec<Word>> {
        Collection::from_word_set_key(key).map(|collection| self.list(collection).to_vec())
    }

    /// Replaces the whole document, dropping empty or repeated keys.
    pub fn replace(&mut self, store: LatestStore) -> SlotResult<()> {
        let next = normalized(store);
        if next == self.cache {
            return Ok(());
        }
        self.commit_all(next)
    }

    fn commit(
        &mut self,
        next: LatestStore,
        op: &str,
        collection: Collection,
    ) -> SlotResult<()> {
        if let Err(err) = self.gateway.save(&next) {
            warn!(
                "event=store_save module=store status=error op={} collection={} error={}",
                op,
                collection.label(),
                err
            );
            return Err(err);
        }
        self.cache = next;
        debug!(
            "event=store_save module=store status=ok op={} collection={} size={}",
            op,
            collection.label(),
            self.list(collection).len()
        );
        Ok(())
    }

    fn commit_all(&mut self, next: LatestStore) -> SlotResult<()> {
        self.gateway.save(&next)?;
        self.cache = next;
        debug!(
            "event=store_save module=store status=ok op=replace bookmarks={} wrong_logs={}",
            self.cache.bookmark.len(),
            self.cache.wrong_logs.len()
        );
        Ok(())
    }
}

/// Borrowed view over one collection of a `WordStore`.
pub struct CollectionHandle<'a, S: StorageSlot> {
    store: &'a mut WordStore<S>,
    collection: Collection,
}

impl<S: StorageSlot> CollectionHandle<'_, S> {
    pub fn list(&self) -> &[Word] {
        self.store.list(self.collection)
    }

    pub fn has(&self, word: &str) -> bool {
        self.store.has(self.collection, word)
    }

    pub fn add(&mut self, word: Word) -> SlotResult<bool> {
        self.store.add(self.collection, word)
    }

    pub fn add_all(&mut self, words: impl IntoIterator<Item = Word>) -> SlotResult<usize> {
        self.store.add_all(self.collection, words)
    }

    pub fn remove(&mut self, word: &str) -> SlotResult<bool> {
        self.store.remove(self.collection, word)
    }

    pub fn remove_all(&mut self) -> SlotResult<()> {
        self.store.remove_all(self.collection)
    }
}

fn normalized(store: LatestStore) -> LatestStore {
    LatestStore {
        bookmark: unique_words(store.bookmark),
        wrong_logs: unique_words(store.wrong_logs),
    }
}

fn entry_count(store: &LatestStore) -> usize {
    store.bookmark.len() + store.wrong_logs.len()
}

fn unique_words(words: Vec<Word>) -> Vec<Word> {
    let mut seen = HashSet::new();
    words
        .into_iter()
        .filter(|word| word.validate().is_ok() && seen.insert(word.word.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{Collection, WordStore};
    use crate::model::word::Word;
    use crate::schema::{latest_default, parse, StoreDocument, LATEST};
    use crate::store::gateway::StoreGateway;
    use crate::store::slot::MemorySlot;

    fn empty_store() -> WordStore<MemorySlot> {
        WordStore::init(StoreGateway::new(MemorySlot::new()))
    }

    fn fire() -> Word {
        Word::new("火", "ひ", "fire")
    }

    #[test]
    fn add_then_has() {
        let mut store = empty_store();
        assert!(store.bookmark().add(fire()).unwrap());
        assert!(store.bookmark().has("火"));
        assert!(!store.wrong_log().has("火"));
    }

    #[test]
    fn duplicate_add_keeps_one_entry_and_skips_write() {
        let mut store = empty_store();
        store.bookmark().add(fire()).unwrap();
        let writes = store.gateway().slot().writes();

        assert!(!store.bookmark().add(Word::new("火", "か", "tuesday")).unwrap());
        assert_eq!(store.bookmark().list(), &[fire()]);
        assert_eq!(store.gateway().slot().writes(), writes);
    }

    #[test]
    fn batch_add_dedups_within_the_call() {
        let mut store = empty_store();
        let added = store
            .wrong_log()
            .add_all(vec![
                Word::new("A", "", "first"),
                Word::new("A", "", "second"),
                Word::new("B", "", "third"),
            ])
            .unwrap();

        assert_eq!(added, 2);
        let keys: Vec<&str> = store
            .list(Collection::WrongLog)
            .iter()
            .map(|w| w.word.as_str())
            .collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(store.list(Collection::WrongLog)[0].meaning, "first");
        assert_eq!(store.gateway().slot().writes(), 1);
    }

    #[test]
    fn add_skips_empty_word() {
        let mut store = empty_store();
        assert!(!store.bookmark().add(Word::new("", "", "blank")).unwrap());
        assert!(store.bookmark().list().is_empty());
    }

    #[test]
    fn remove_missing_is_a_noop() {
        let mut store = empty_store();
        assert!(!store.bookmark().remove("nonexistent").unwrap());
        assert!(store.bookmark().list().is_empty());
        assert_eq!(store.gateway().slot().writes(), 0);
    }

    #[test]
    fn remove_deletes_only_the_matching_entry() {
        let mut store = empty_store();
        store
            .bookmark()
            .add_all(vec![fire(), Word::new("水", "みず", "water")])
            .unwrap();

        assert!(store.bookmark().remove("火").unwrap());
        assert!(!store.bookmark().has("火"));
        assert!(store.bookmark().has("水"));
    }

    #[test]
    fn remove_all_clears_one_collection_and_keeps_version() {
        let mut store = empty_store();
        store.bookmark().add(fire()).unwrap();
        store.wrong_log().add(Word::new("水", "みず", "water")).unwrap();

        store.bookmark().remove_all().unwrap();
        assert!(store.bookmark().list().is_empty());
        assert_eq!(store.wrong_log().list().len(), 1);

        let persisted: serde_json::Value =
            serde_json::from_str(store.gateway().slot().value().unwrap()).unwrap();
        assert_eq!(persisted["version"], LATEST);
        assert_eq!(persisted["bookmark"], serde_json::json!([]));
    }

    #[test]
    fn failed_write_leaves_cache_unchanged() {
        let mut store = empty_store();
        store.bookmark().add(fire()).unwrap();

        let mut slot = store.gateway().slot().clone();
        slot.set_fail_writes(true);
        let mut store = WordStore::init(StoreGateway::new(slot));

        assert!(store.bookmark().add(Word::new("水", "みず", "water")).is_err());
        assert!(store.bookmark().remove("火").is_err());
        assert_eq!(store.bookmark().list(), &[fire()]);
    }

    #[test]
    fn bookmark_wrong_log_copies_missing_words() {
        let mut store = empty_store();
        store.bookmark().add(fire()).unwrap();
        store
            .wrong_log()
            .add_all(vec![fire(), Word::new("水", "みず", "water")])
            .unwrap();

        assert_eq!(store.bookmark_wrong_log().unwrap(), 1);
        assert_eq!(store.bookmark().list().len(), 2);
        assert_eq!(store.wrong_log().list().len(), 2);
    }

    #[test]
    fn word_set_serves_reserved_keys_only() {
        let mut store = empty_store();
        store.wrong_log().add(fire()).unwrap();

        assert_eq!(store.word_set("wrongLog"), Some(vec![fire()]));
        assert_eq!(store.word_set("bookmarks"), Some(Vec::new()));
        assert_eq!(store.word_set("n5-verbs"), None);
    }

    #[test]
    fn init_drops_repeated_and_empty_keys_from_loaded_document() {
        let raw = r#"{"version":2,"bookmark":[
            {"word":"火","furigana":"ひ","meaning":"fire"},
            {"word":"火","furigana":"か","meaning":"tuesday"},
            {"word":"","furigana":"","meaning":"blank"}
        ],"wrongLogs":[
            {"word":"水","furigana":"みず","meaning":"water"},
            {"word":"水","furigana":"みず","meaning":"water"}
        ]}"#;
        let mut store = WordStore::init(StoreGateway::new(MemorySlot::with_value(raw)));

        assert_eq!(store.bookmark().list(), &[fire()]);
        assert_eq!(store.wrong_log().list().len(), 1);
        assert!(!store.bookmark().add(fire()).unwrap());
        assert_eq!(store.bookmark().list().len(), 1);

        let persisted = parse(store.gateway().slot().value().unwrap()).unwrap();
        assert_eq!(persisted, StoreDocument::V2(store.document().clone()));
    }

    #[test]
    fn init_leaves_clean_document_unwritten() {
        let mut seeded = empty_store();
        seeded.bookmark().add(fire()).unwrap();
        let slot = MemorySlot::with_value(seeded.gateway().slot().value().unwrap());

        let store = WordStore::init(StoreGateway::new(slot));
        assert_eq!(store.gateway().slot().writes(), 0);
    }

    #[test]
    fn word_set_keys_resolve_back_to_their_collection() {
        for collection in [Collection::Bookmark, Collection::WrongLog] {
            assert_eq!(
                Collection::from_word_set_key(collection.word_set_key()),
                Some(collection)
            );
        }
        assert_eq!(Collection::from_word_set_key("bookmark"), None);
    }

    #[test]
    fn replace_normalizes_and_persists() {
        let mut store = empty_store();
        let mut next = latest_default();
        next.bookmark = vec![fire(), fire(), Word::new("", "", "")];

        store.replace(next).unwrap();
        assert_eq!(store.document().bookmark, vec![fire()]);

        let reloaded = WordStore::init(StoreGateway::new(store.gateway().slot().clone()));
        assert_eq!(reloaded.document(), store.document());
    }
}

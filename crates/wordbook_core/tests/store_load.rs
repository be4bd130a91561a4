use serde_json::{json, Value};
use wordbook_core::schema::{encode, latest_default};
use wordbook_core::{
    parse, Collection, SqliteSlot, StorageSlot, StoreDocument, StoreGateway, Word, WordStore,
    LATEST, STORE_SLOT_KEY,
};

fn slot_with(dir: &tempfile::TempDir, raw: Option<&str>) -> SqliteSlot {
    let mut slot = SqliteSlot::open(dir.path().join("wordbook.sqlite3"), STORE_SLOT_KEY).unwrap();
    if let Some(raw) = raw {
        slot.write(raw).unwrap();
    }
    slot
}

fn slot_json(slot: &SqliteSlot) -> Option<Value> {
    slot.read()
        .unwrap()
        .map(|text| serde_json::from_str(&text).unwrap())
}

#[test]
fn v1_slot_is_migrated_and_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let raw = r#"{"version":1,"bookmark":[{"word":"犬","furigana":"いぬ","meaning":"dog"}],"logs":[{"word":"犬","o":3,"x":1}]}"#;
    let store = WordStore::init(StoreGateway::new(slot_with(&dir, Some(raw))));

    assert_eq!(store.list(Collection::Bookmark), &[Word::new("犬", "いぬ", "dog")]);
    assert!(store.list(Collection::WrongLog).is_empty());
    assert_eq!(
        slot_json(store.gateway().slot()),
        Some(json!({
            "version": 2,
            "bookmark": [{"word": "犬", "furigana": "いぬ", "meaning": "dog"}],
            "wrongLogs": []
        }))
    );
}

#[test]
fn absent_slot_stays_absent_after_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = WordStore::init(StoreGateway::new(slot_with(&dir, None)));

    assert_eq!(store.document(), &latest_default());
    assert_eq!(store.gateway().slot().read().unwrap(), None);
}

#[test]
fn corrupt_slots_reset_to_latest_defaults() {
    let cases = [
        "",
        "not json at all",
        "[1,2,3]",
        r#"{"version":"one"}"#,
        r#"{"version":3,"bookmark":[],"wrongLogs":[]}"#,
        r#"{"version":2,"bookmark":[{"word":"火"}],"wrongLogs":[]}"#,
    ];

    for raw in cases {
        let dir = tempfile::tempdir().unwrap();
        let store = WordStore::init(StoreGateway::new(slot_with(&dir, Some(raw))));

        assert_eq!(store.document(), &latest_default(), "input {raw:?}");
        let persisted = slot_json(store.gateway().slot()).unwrap();
        assert_eq!(persisted["version"], LATEST, "input {raw:?}");
        assert_eq!(persisted["bookmark"], json!([]));
        assert_eq!(persisted["wrongLogs"], json!([]));
    }
}

#[test]
fn mutations_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();

    let mut store = WordStore::init(StoreGateway::new(slot_with(&dir, None)));
    store
        .bookmark()
        .add_all(vec![
            Word::new("火", "ひ", "fire"),
            Word::new("水", "みず", "water"),
        ])
        .unwrap();
    store.wrong_log().add(Word::new("木", "き", "tree")).unwrap();
    store.bookmark().remove("火").unwrap();
    drop(store);

    let reopened = WordStore::init(StoreGateway::new(slot_with(&dir, None)));
    assert_eq!(
        reopened.list(Collection::Bookmark),
        &[Word::new("水", "みず", "water")]
    );
    assert!(reopened.has(Collection::WrongLog, "木"));
}

#[test]
fn latest_document_roundtrips_through_the_encoding() {
    let mut doc = latest_default();
    doc.bookmark.push(Word::new("ありがとう", "", "thank you"));
    doc.wrong_logs.push(Word::new("漢字", "かんじ", "kanji"));

    let decoded = parse(&encode(&doc).unwrap()).unwrap();
    assert_eq!(decoded, StoreDocument::V2(doc));
}

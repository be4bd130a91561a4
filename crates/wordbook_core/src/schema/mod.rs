//! Versioned store shapes and their registry.
//!
//! # Responsibility
//! - Declare every store document shape ever persisted, one closed variant
//!   per version.
//! - Expose a shape descriptor and a default instance for each version.
//! - Encode documents into the persisted JSON form.
//!
//! # Invariants
//! - `SCHEMAS` is ordered by `version`, contiguous from 1, and ends at `LATEST`.
//! - Only `LatestStore` is observed by code outside `schema`/`migrate`/`store`.
//!
//! # Adding a version
//! Add the shape struct, its `StoreDocument` variant, its `SchemaVersion`
//! entry, bump `LATEST`, then register one step in `migrate`.

use crate::model::word::Word;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod validate;

pub use validate::{parse, validate};

/// Highest store version known by this binary.
pub const LATEST: u32 = 2;

/// Latest in-memory store shape.
pub type LatestStore = StoreV2;

/// Per-word answer tally kept by v1 stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub word: String,
    /// Correct answer count.
    pub o: i64,
    /// Incorrect answer count.
    pub x: i64,
}

/// Store shape v1: bookmarks plus answer tallies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreV1 {
    pub bookmark: Vec<Word>,
    pub logs: Vec<LogEntry>,
}

/// Store shape v2: bookmarks plus the words most recently answered wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreV2 {
    pub bookmark: Vec<Word>,
    #[serde(rename = "wrongLogs")]
    pub wrong_logs: Vec<Word>,
}

/// A validated store document at its native version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreDocument {
    V1(StoreV1),
    V2(StoreV2),
}

impl StoreDocument {
    pub fn version(&self) -> u32 {
        match self {
            Self::V1(_) => StoreV1::VERSION,
            Self::V2(_) => StoreV2::VERSION,
        }
    }

    /// Encodes this document with its `version` discriminant.
    pub fn encode(&self) -> serde_json::Result<String> {
        match self {
            Self::V1(body) => encode(body),
            Self::V2(body) => encode(body),
        }
    }
}

/// One concrete version shape.
pub trait VersionedShape: Serialize + DeserializeOwned + Default {
    const VERSION: u32;

    fn into_document(self) -> StoreDocument;
}

impl VersionedShape for StoreV1 {
    const VERSION: u32 = 1;

    fn into_document(self) -> StoreDocument {
        StoreDocument::V1(self)
    }
}

impl VersionedShape for StoreV2 {
    const VERSION: u32 = 2;

    fn into_document(self) -> StoreDocument {
        StoreDocument::V2(self)
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    version: u32,
    #[serde(flatten)]
    body: &'a T,
}

/// Encodes one shape as a persisted JSON document.
pub fn encode<T: VersionedShape>(body: &T) -> serde_json::Result<String> {
    serde_json::to_string(&Envelope {
        version: T::VERSION,
        body,
    })
}

/// Scalar field kinds used by record shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    /// JSON number with no fractional part.
    Integer,
}

impl FieldType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Integer => "integer",
        }
    }
}

/// Required fields of a collection element.
#[derive(Debug)]
pub struct RecordShape {
    pub fields: &'static [(&'static str, FieldType)],
}

/// A required top-level array field.
#[derive(Debug)]
pub struct CollectionField {
    pub name: &'static str,
    pub record: &'static RecordShape,
}

/// Registry entry describing one store version.
#[derive(Debug)]
pub struct SchemaVersion {
    pub version: u32,
    pub collections: &'static [CollectionField],
    decode: fn(Value) -> serde_json::Result<StoreDocument>,
    default: fn() -> StoreDocument,
}

impl SchemaVersion {
    /// Default empty document of this version.
    pub fn default_document(&self) -> StoreDocument {
        (self.default)()
    }

    pub(crate) fn decode(&self, canonical: Value) -> serde_json::Result<StoreDocument> {
        (self.decode)(canonical)
    }
}

pub const WORD_SHAPE: RecordShape = RecordShape {
    fields: &[
        ("word", FieldType::Text),
        ("furigana", FieldType::Text),
        ("meaning", FieldType::Text),
    ],
};

pub const LOG_ENTRY_SHAPE: RecordShape = RecordShape {
    fields: &[
        ("word", FieldType::Text),
        ("o", FieldType::Integer),
        ("x", FieldType::Integer),
    ],
};

pub const SCHEMAS: &[SchemaVersion] = &[
    SchemaVersion {
        version: StoreV1::VERSION,
        collections: &[
            CollectionField {
                name: "bookmark",
                record: &WORD_SHAPE,
            },
            CollectionField {
                name: "logs",
                record: &LOG_ENTRY_SHAPE,
            },
        ],
        decode: decode_shape::<StoreV1>,
        default: default_shape::<StoreV1>,
    },
    SchemaVersion {
        version: StoreV2::VERSION,
        collections: &[
            CollectionField {
                name: "bookmark",
                record: &WORD_SHAPE,
            },
            CollectionField {
                name: "wrongLogs",
                record: &WORD_SHAPE,
            },
        ],
        decode: decode_shape::<StoreV2>,
        default: default_shape::<StoreV2>,
    },
];

/// Returns the registry entry for `version`, if known.
pub fn schema_for(version: u32) -> Option<&'static SchemaVersion> {
    SCHEMAS.iter().find(|schema| schema.version == version)
}

/// Returns the latest version declared in the registry.
pub fn latest_version() -> u32 {
    SCHEMAS.last().map_or(0, |schema| schema.version)
}

/// Default empty latest-version document.
pub fn latest_default() -> LatestStore {
    LatestStore::default()
}

fn decode_shape<T: VersionedShape>(canonical: Value) -> serde_json::Result<StoreDocument> {
    serde_json::from_value::<T>(canonical).map(VersionedShape::into_document)
}

fn default_shape<T: VersionedShape>() -> StoreDocument {
    T::default().into_document()
}

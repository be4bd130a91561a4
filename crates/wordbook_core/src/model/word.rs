//! Word record and input-boundary helpers.
//!
//! # Responsibility
//! - Define the canonical `{word, furigana, meaning}` record.
//! - Reject records that cannot act as a collection key.
//!
//! # Invariants
//! - `word` is non-empty for every record stored in a collection.
//! - `furigana` and `meaning` are free text and may be empty.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One vocabulary learning item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Word {
    /// Identity key within a collection.
    pub word: String,
    /// Pronunciation annotation, may be empty.
    pub furigana: String,
    /// Translation or definition text.
    pub meaning: String,
}

/// Validation error for `Word` records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordValidationError {
    EmptyWord,
}

impl Display for WordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyWord => write!(f, "word text cannot be empty"),
        }
    }
}

impl Error for WordValidationError {}

impl Word {
    pub fn new(
        word: impl Into<String>,
        furigana: impl Into<String>,
        meaning: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            furigana: furigana.into(),
            meaning: meaning.into(),
        }
    }

    /// Checks that this record can be used as a collection entry.
    pub fn validate(&self) -> Result<(), WordValidationError> {
        if self.word.is_empty() {
            return Err(WordValidationError::EmptyWord);
        }
        Ok(())
    }
}

/// Filters an incoming word-set down to records with a non-empty `word`.
///
/// Order is preserved. `furigana` and `meaning` are not inspected.
pub fn usable_words(words: impl IntoIterator<Item = Word>) -> Vec<Word> {
    words
        .into_iter()
        .filter(|word| word.validate().is_ok())
        .collect()
}

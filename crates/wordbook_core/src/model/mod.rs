//! Vocabulary domain model.
//!
//! # Responsibility
//! - Define the learning-item record shared by every store collection.
//! - Filter incoming word-sets at the input boundary.
//!
//! # Invariants
//! - A `Word` is identified by its exact `word` text; there is no secondary key.

pub mod word;

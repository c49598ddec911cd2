//! Classifier-facing types.
//!
//! The classifier itself lives outside this crate. This module holds the
//! vocabulary it was trained on, the ranking contract for its score vectors,
//! and the adapter that validates its output before a session sees it.

mod adapter;
mod ranker;
mod vocabulary;

pub use adapter::ClassifierAdapter;
pub use ranker::{ConfidenceBreakdown, Prediction, TopKRanker, DEFAULT_TOP_K};
pub use vocabulary::{Symbol, Vocabulary, VocabularyCoverage, DEFAULT_SIGNS};

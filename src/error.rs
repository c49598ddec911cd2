//! Error types shared across the engine.
//!
//! Only the control plane and the classifier boundary can fail. Processing an
//! observation inside a session never returns an error.

use thiserror::Error;

/// Rejected confidence-threshold update. The previous threshold stays in place.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ThresholdError {
    #[error("confidence threshold {0} is outside [0, 1]")]
    OutOfRange(f32),
}

/// Invalid engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("window capacity must be at least 1")]
    ZeroWindowCapacity,

    #[error("window capacity {capacity} exceeds the maximum of {max}")]
    WindowCapacityTooLarge { capacity: usize, max: usize },

    #[error("min filtered count {min} must be between 1 and the window capacity {capacity}")]
    MinFilteredCount { min: usize, capacity: usize },

    #[error("consensus ratio {0} is outside [0, 1]")]
    ConsensusRatio(f32),

    #[error("top-k must be at least 1")]
    ZeroTopK,

    #[error(transparent)]
    Threshold(#[from] ThresholdError),

    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The classifier's label set could not be used to start a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    #[error("vocabulary is empty")]
    Empty,

    #[error("vocabulary contains an empty label at index {0}")]
    EmptyLabel(usize),

    #[error("vocabulary contains '{0}' more than once")]
    Duplicate(String),
}

/// Classifier output that violates the observation contract.
///
/// Raised at the adapter boundary, before anything reaches a session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObservationError {
    #[error("confidence {confidence} for '{label}' is outside [0, 1]")]
    ConfidenceOutOfRange { label: String, confidence: f32 },

    #[error("observation label is empty")]
    EmptyLabel,

    #[error("label '{0}' is not part of the vocabulary")]
    UnknownLabel(String),

    #[error("expected {expected} scores (one per vocabulary entry), got {actual}")]
    ScoreCountMismatch { expected: usize, actual: usize },
}

/// Failures surfaced by the multi-session manager.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session with id {0}")]
    UnknownSession(u64),

    #[error("session {0} is no longer running")]
    Closed(u64),

    #[error("batch of {size} frames exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    Threshold(#[from] ThresholdError),
}

use crate::classifier::{Prediction, Symbol};
use std::time::Instant;

/// One classifier result held in the prediction window.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub label: Symbol,
    /// Always within `[0, 1]`; enforced by the classifier adapter.
    pub confidence: f32,
    pub timestamp: Instant,
}

/// Everything a session receives for a frame in which a hand was detected.
///
/// Frames without a hand are passed to the session as `None`.
#[derive(Debug, Clone)]
pub struct FrameInput {
    pub label: Symbol,
    pub confidence: f32,
    pub top_k: Vec<Prediction>,
    pub timestamp: Instant,
}

impl FrameInput {
    pub fn new(label: impl Into<Symbol>, confidence: f32, timestamp: Instant) -> Self {
        Self {
            label: label.into(),
            confidence,
            top_k: Vec::new(),
            timestamp,
        }
    }

    pub fn observation(&self) -> Observation {
        Observation {
            label: self.label.clone(),
            confidence: self.confidence,
            timestamp: self.timestamp,
        }
    }
}

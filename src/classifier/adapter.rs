//! Boundary between the external classifier and the decision engine.
//!
//! Everything a session consumes passes through here first. Sessions assume
//! the contract holds (confidence in `[0, 1]`, label from the vocabulary), so
//! violations are turned into [`ObservationError`] before they get that far.

use super::ranker::{ConfidenceBreakdown, Prediction, TopKRanker};
use super::vocabulary::{Symbol, Vocabulary};
use crate::engine::FrameInput;
use crate::error::ObservationError;
use log::debug;
use std::time::Instant;

/// Validates and normalizes classifier output for one vocabulary.
#[derive(Debug, Clone)]
pub struct ClassifierAdapter {
    vocabulary: Vocabulary,
    top_k: usize,
}

impl ClassifierAdapter {
    pub fn new(vocabulary: Vocabulary, top_k: usize) -> Self {
        Self {
            vocabulary,
            top_k: top_k.max(1),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Accept an already-decided `(label, confidence)` pair plus optional
    /// alternatives. Alternatives are re-ranked before being cut to top-k, so
    /// callers may pass them in any order.
    pub fn frame(
        &self,
        label: impl Into<Symbol>,
        confidence: f32,
        top_k: Vec<Prediction>,
        timestamp: Instant,
    ) -> Result<FrameInput, ObservationError> {
        let label = label.into();
        self.check(&label, confidence)?;
        for alternative in &top_k {
            self.check(&alternative.label, alternative.confidence)?;
        }

        let mut top_k = top_k;
        TopKRanker::sort(&mut top_k, &self.vocabulary);
        top_k.truncate(self.top_k);

        Ok(FrameInput {
            label,
            confidence,
            top_k,
            timestamp,
        })
    }

    /// Accept a raw probability vector aligned with the vocabulary. The best
    /// label becomes the frame's label and the ranked head becomes its top-k.
    pub fn frame_from_scores(
        &self,
        scores: &[f32],
        timestamp: Instant,
    ) -> Result<FrameInput, ObservationError> {
        self.check_scores(scores)?;

        let top_k = TopKRanker::top_k(scores, &self.vocabulary, self.top_k)?;
        let best = top_k
            .first()
            .cloned()
            .ok_or(ObservationError::ScoreCountMismatch {
                expected: self.vocabulary.len(),
                actual: 0,
            })?;

        debug!(
            "Classifier scores resolved to '{}' ({:.3})",
            best.label, best.confidence
        );

        Ok(FrameInput {
            label: best.label,
            confidence: best.confidence,
            top_k,
            timestamp,
        })
    }

    /// Rank every label and split at `threshold`.
    pub fn breakdown(
        &self,
        scores: &[f32],
        threshold: f32,
    ) -> Result<ConfidenceBreakdown, ObservationError> {
        self.check_scores(scores)?;
        let ranked = TopKRanker::rank_all(scores, &self.vocabulary)?;
        Ok(ConfidenceBreakdown::from_ranked(ranked, threshold))
    }

    fn check(&self, label: &str, confidence: f32) -> Result<(), ObservationError> {
        if label.trim().is_empty() {
            return Err(ObservationError::EmptyLabel);
        }
        if !self.vocabulary.contains(label) {
            return Err(ObservationError::UnknownLabel(label.to_string()));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ObservationError::ConfidenceOutOfRange {
                label: label.to_string(),
                confidence,
            });
        }
        Ok(())
    }

    fn check_scores(&self, scores: &[f32]) -> Result<(), ObservationError> {
        if scores.len() != self.vocabulary.len() {
            return Err(ObservationError::ScoreCountMismatch {
                expected: self.vocabulary.len(),
                actual: scores.len(),
            });
        }
        for (label, &score) in self.vocabulary.labels().iter().zip(scores) {
            if !(0.0..=1.0).contains(&score) {
                return Err(ObservationError::ConfidenceOutOfRange {
                    label: label.clone(),
                    confidence: score,
                });
            }
        }
        Ok(())
    }
}

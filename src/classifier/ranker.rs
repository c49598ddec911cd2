//! Ranking of raw classifier scores.

use super::vocabulary::{Symbol, Vocabulary};
use crate::error::ObservationError;
use serde::{Deserialize, Serialize};

/// Number of alternatives shown next to the current sign.
pub const DEFAULT_TOP_K: usize = 3;

/// One labelled classifier score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Symbol,
    pub confidence: f32,
}

impl Prediction {
    pub fn new(label: impl Into<Symbol>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Orders a score vector aligned with a [`Vocabulary`].
///
/// Highest confidence first. Equal confidences keep vocabulary order, so the
/// result never depends on sort stability or hashing.
pub struct TopKRanker;

impl TopKRanker {
    /// Return the `k` best predictions. `k` larger than the vocabulary yields
    /// every label.
    pub fn top_k(
        scores: &[f32],
        vocabulary: &Vocabulary,
        k: usize,
    ) -> Result<Vec<Prediction>, ObservationError> {
        if scores.len() != vocabulary.len() {
            return Err(ObservationError::ScoreCountMismatch {
                expected: vocabulary.len(),
                actual: scores.len(),
            });
        }

        let mut indices: Vec<usize> = (0..scores.len()).collect();
        indices.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]).then(a.cmp(&b)));

        Ok(indices
            .into_iter()
            .take(k)
            .filter_map(|i| {
                vocabulary
                    .get(i)
                    .map(|label| Prediction::new(label.clone(), scores[i]))
            })
            .collect())
    }

    /// Put already-labelled predictions into ranking order in place. Labels
    /// missing from `vocabulary` sort after every known label of equal score.
    pub fn sort(predictions: &mut [Prediction], vocabulary: &Vocabulary) {
        let rank = |p: &Prediction| vocabulary.index_of(&p.label).unwrap_or(usize::MAX);
        predictions.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| rank(a).cmp(&rank(b)))
        });
    }

    /// Every label, ranked.
    pub fn rank_all(
        scores: &[f32],
        vocabulary: &Vocabulary,
    ) -> Result<Vec<Prediction>, ObservationError> {
        Self::top_k(scores, vocabulary, vocabulary.len())
    }
}

/// Full per-label view of one classification, split at the active threshold.
#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceBreakdown {
    pub ranked: Vec<Prediction>,
    pub highest: Option<Prediction>,
    pub above_threshold: Vec<Prediction>,
    pub confidence_threshold: f32,
}

impl ConfidenceBreakdown {
    pub fn from_ranked(ranked: Vec<Prediction>, confidence_threshold: f32) -> Self {
        let above_threshold = ranked
            .iter()
            .filter(|p| p.confidence > confidence_threshold)
            .cloned()
            .collect();

        Self {
            highest: ranked.first().cloned(),
            ranked,
            above_threshold,
            confidence_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vocabulary {
        Vocabulary::new(["HELLO", "YES", "NO", "THANKS"]).unwrap()
    }

    #[test]
    fn test_top_k_descending() {
        let ranked = TopKRanker::top_k(&[0.1, 0.6, 0.05, 0.25], &vocab(), 3).unwrap();
        let labels: Vec<&str> = ranked.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["YES", "THANKS", "HELLO"]);
        assert_eq!(ranked[0].confidence, 0.6);
    }

    #[test]
    fn test_ties_prefer_lower_vocabulary_index() {
        let ranked = TopKRanker::top_k(&[0.3, 0.1, 0.3, 0.3], &vocab(), 3).unwrap();
        let labels: Vec<&str> = ranked.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["HELLO", "NO", "THANKS"]);
    }

    #[test]
    fn test_k_larger_than_vocabulary() {
        let ranked = TopKRanker::top_k(&[0.25; 4], &vocab(), 10).unwrap();
        assert_eq!(ranked.len(), 4);
        assert_eq!(ranked[3].label, "THANKS");
    }

    #[test]
    fn test_sort_labelled_predictions() {
        let mut predictions = vec![
            Prediction::new("THANKS", 0.2),
            Prediction::new("NO", 0.5),
            Prediction::new("YES", 0.2),
            Prediction::new("HELLO", 0.1),
        ];
        TopKRanker::sort(&mut predictions, &vocab());
        let labels: Vec<&str> = predictions.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["NO", "YES", "THANKS", "HELLO"]);
    }

    #[test]
    fn test_score_count_mismatch() {
        let err = TopKRanker::top_k(&[0.5, 0.5], &vocab(), 3).unwrap_err();
        assert_eq!(
            err,
            ObservationError::ScoreCountMismatch {
                expected: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn test_breakdown_splits_at_threshold() {
        let ranked = TopKRanker::rank_all(&[0.1, 0.75, 0.7, 0.05], &vocab()).unwrap();
        let breakdown = ConfidenceBreakdown::from_ranked(ranked, 0.7);

        assert_eq!(breakdown.highest.as_ref().unwrap().label, "YES");
        // strictly above: 0.7 itself does not pass
        assert_eq!(breakdown.above_threshold.len(), 1);
        assert_eq!(breakdown.ranked.len(), 4);
    }
}

use super::snapshot::ResultSnapshot;
use serde::Serialize;

/// Most frames accepted by a single batch call.
pub const MAX_BATCH_FRAMES: usize = 10;

/// Aggregate over one batch of processed frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_frames: usize,
    pub hand_detections: usize,
    pub confident_detections: usize,
    /// `hand_detections / total_frames`.
    pub detection_rate: f64,
    /// `confident_detections / hand_detections`, with the denominator floored at 1.
    pub confidence_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub results: Vec<ResultSnapshot>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn from_results(results: Vec<ResultSnapshot>) -> Self {
        let total_frames = results.len();
        let hand_detections = results.iter().filter(|r| r.hand_detected).count();
        let confident_detections = results
            .iter()
            .filter(|r| r.hand_detected && r.current_confidence > r.confidence_threshold)
            .count();

        let detection_rate = if total_frames == 0 {
            0.0
        } else {
            hand_detections as f64 / total_frames as f64
        };

        Self {
            results,
            summary: BatchSummary {
                total_frames,
                hand_detections,
                confident_detections,
                detection_rate,
                confidence_rate: confident_detections as f64 / hand_detections.max(1) as f64,
            },
        }
    }
}

//! Serializable end-of-session report.

use crate::classifier::Symbol;
use crate::config::EngineConfig;
use crate::engine::{RecognizedSequence, SessionStats};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub duration_seconds: f64,
    /// `HH:MM:SS`
    pub duration_formatted: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecognitionResults {
    pub recognized_text: String,
    pub symbols: Vec<Symbol>,
    pub total_symbols_recognized: usize,
    pub unique_symbols_used: Vec<Symbol>,
    pub unique_symbols_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceStats {
    pub total_observations: u64,
    pub accepted_observations: u64,
    pub success_rate: f64,
    pub observations_per_minute: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub vocabulary_size: usize,
    pub vocabulary: Vec<Symbol>,
    pub confidence_threshold: f32,
    pub window_capacity: usize,
    pub cooldown_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionExport {
    pub session_info: SessionInfo,
    pub recognition_results: RecognitionResults,
    pub performance_stats: PerformanceStats,
    pub model_info: ModelInfo,
    pub export_timestamp: DateTime<Utc>,
}

impl SessionExport {
    pub fn new(
        sequence: &RecognizedSequence,
        stats: &SessionStats,
        config: &EngineConfig,
        confidence_threshold: f32,
    ) -> Self {
        let now = Utc::now();
        let unique: Vec<Symbol> = stats.distinct_symbols.iter().cloned().collect();

        Self {
            session_info: SessionInfo {
                session_start: stats.session_start,
                session_end: now,
                duration_seconds: stats.elapsed_secs,
                duration_formatted: format_duration(stats.elapsed_secs),
            },
            recognition_results: RecognitionResults {
                recognized_text: sequence.text(),
                symbols: sequence.symbols().to_vec(),
                total_symbols_recognized: sequence.len(),
                unique_symbols_count: unique.len(),
                unique_symbols_used: unique,
            },
            performance_stats: PerformanceStats {
                total_observations: stats.total_observations,
                accepted_observations: stats.accepted_observations,
                success_rate: stats.success_rate,
                observations_per_minute: stats.observations_per_minute,
            },
            model_info: ModelInfo {
                vocabulary_size: config.vocabulary.len(),
                vocabulary: config.vocabulary.labels().to_vec(),
                confidence_threshold,
                window_capacity: config.window_capacity,
                cooldown_ms: config.cooldown_ms,
            },
            export_timestamp: now,
        }
    }
}

/// Whole seconds as `HH:MM:SS`. Hours are not wrapped at 24.
pub fn format_duration(seconds: f64) -> String {
    let d = ChronoDuration::seconds(seconds.max(0.0) as i64);
    format!(
        "{:02}:{:02}:{:02}",
        d.num_hours(),
        d.num_minutes() % 60,
        d.num_seconds() % 60
    )
}

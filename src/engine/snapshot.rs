use super::stats::SessionStats;
use crate::classifier::{Prediction, Symbol};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Where a session is in its recognition cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// Fewer trusted observations than a vote needs.
    Idle,
    /// Enough trusted observations, no commit yet.
    Observing,
    /// A symbol was committed and the cooldown is still running.
    Committed,
}

/// What a session reports after every processed cycle.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSnapshot {
    pub hand_detected: bool,
    pub current_label: Option<Symbol>,
    pub current_confidence: f32,
    pub top_k: Vec<Prediction>,
    pub committed_this_cycle: bool,
    pub committed_symbol: Option<Symbol>,
    /// Share of the winning label among trusted observations, when a vote took place.
    pub consensus_ratio: Option<f32>,
    pub recognized_text: String,
    pub recognized_symbols: Vec<Symbol>,
    pub session_stats: SessionStats,
    pub confidence_threshold: f32,
    pub state: EngineState,
    pub timestamp: DateTime<Utc>,
}

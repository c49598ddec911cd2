//! Running per-session counters.

use crate::classifier::Symbol;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// Point-in-time copy of a session's statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub total_observations: u64,
    pub accepted_observations: u64,
    pub distinct_symbols: BTreeSet<Symbol>,
    pub success_rate: f64,
    pub observations_per_minute: f64,
    pub elapsed_secs: f64,
    pub session_start: DateTime<Utc>,
}

/// Counters for frames seen and frames trusted since the session started.
///
/// Counters never decrease until `reset`.
#[derive(Debug, Clone)]
pub struct SessionStatsTracker {
    total_observations: u64,
    accepted_observations: u64,
    distinct_symbols: BTreeSet<Symbol>,
    started: Instant,
    started_at: DateTime<Utc>,
}

impl SessionStatsTracker {
    pub fn new() -> Self {
        Self {
            total_observations: 0,
            accepted_observations: 0,
            distinct_symbols: BTreeSet::new(),
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Count one processed cycle. Frames without a hand pass `None`.
    pub fn record_observation(&mut self, above_threshold: bool, symbol: Option<&str>) {
        self.total_observations += 1;

        if let (true, Some(symbol)) = (above_threshold, symbol) {
            self.accepted_observations += 1;
            if !self.distinct_symbols.contains(symbol) {
                self.distinct_symbols.insert(symbol.to_string());
            }
        }
    }

    pub fn total_observations(&self) -> u64 {
        self.total_observations
    }

    pub fn accepted_observations(&self) -> u64 {
        self.accepted_observations
    }

    pub fn distinct_symbols(&self) -> &BTreeSet<Symbol> {
        &self.distinct_symbols
    }

    pub fn session_start(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// `accepted / total`, or 0 before anything was recorded.
    pub fn success_rate(&self) -> f64 {
        if self.total_observations == 0 {
            return 0.0;
        }
        self.accepted_observations as f64 / self.total_observations as f64
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn observations_per_minute(&self) -> f64 {
        self.observations_per_minute_over(self.elapsed())
    }

    /// Rate over `elapsed`, which is floored at one minute so that a session a
    /// few seconds old does not report a burst rate.
    pub fn observations_per_minute_over(&self, elapsed: Duration) -> f64 {
        let minutes = (elapsed.as_secs_f64() / 60.0).max(1.0);
        self.total_observations as f64 / minutes
    }

    pub fn snapshot(&self) -> SessionStats {
        let elapsed = self.elapsed();
        SessionStats {
            total_observations: self.total_observations,
            accepted_observations: self.accepted_observations,
            distinct_symbols: self.distinct_symbols.clone(),
            success_rate: self.success_rate(),
            observations_per_minute: self.observations_per_minute_over(elapsed),
            elapsed_secs: elapsed.as_secs_f64(),
            session_start: self.started_at,
        }
    }

    /// Zero every counter and restart the session clock.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for SessionStatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

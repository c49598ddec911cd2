//! Consensus voting over the prediction window.
//!
//! Turns raw per-frame observations into commit decisions.

use super::observation::Observation;
use crate::classifier::Symbol;
use crate::config::EngineConfig;
use log::debug;
use std::time::{Duration, Instant};

/// Winning label among the above-threshold entries of a window.
#[derive(Debug, Clone, PartialEq)]
pub struct Consensus {
    pub label: Symbol,
    /// Entries that voted for `label`.
    pub votes: usize,
    /// Entries above the confidence threshold.
    pub filtered: usize,
    /// `votes / filtered`.
    pub ratio: f32,
}

/// Why a consensus was found but not committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    /// The consensus label is the last committed symbol.
    RepeatOfLast,
    /// The previous commit is too recent.
    CoolingDown,
    /// The winning label does not hold a large enough share of the votes.
    WeakConsensus,
}

/// Outcome of one smoothing pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Not enough trusted observations to vote.
    Insufficient { filtered: usize },
    /// A consensus exists but must not be committed yet.
    Hold {
        consensus: Consensus,
        reason: HoldReason,
    },
    /// Commit `consensus.label`.
    Commit(Consensus),
}

impl Decision {
    pub fn consensus(&self) -> Option<&Consensus> {
        match self {
            Decision::Insufficient { .. } => None,
            Decision::Hold { consensus, .. } | Decision::Commit(consensus) => Some(consensus),
        }
    }

    pub fn filtered(&self) -> usize {
        match self {
            Decision::Insufficient { filtered } => *filtered,
            Decision::Hold { consensus, .. } | Decision::Commit(consensus) => consensus.filtered,
        }
    }

    pub fn is_commit(&self) -> bool {
        matches!(self, Decision::Commit(_))
    }
}

/// Majority-vote smoother with a cooldown between commits.
///
/// Holds only fixed parameters. The last committed symbol and its time are
/// owned by the session and passed in on every call.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    min_filtered_count: usize,
    consensus_ratio: f32,
    cooldown: Duration,
}

impl TemporalSmoother {
    pub fn new(min_filtered_count: usize, consensus_ratio: f32, cooldown: Duration) -> Self {
        Self {
            min_filtered_count,
            consensus_ratio,
            cooldown,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.min_filtered_count,
            config.consensus_ratio,
            config.cooldown(),
        )
    }

    pub fn min_filtered_count(&self) -> usize {
        self.min_filtered_count
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether the cooldown after a commit made at `last_commit_time` is over.
    /// No previous commit counts as elapsed.
    pub fn cooldown_elapsed(&self, last_commit_time: Option<Instant>, now: Instant) -> bool {
        match last_commit_time {
            Some(at) => now.saturating_duration_since(at) > self.cooldown,
            None => true,
        }
    }

    pub fn decide(
        &self,
        window: &[Observation],
        threshold: f32,
        last_committed: Option<&str>,
        last_commit_time: Option<Instant>,
        now: Instant,
    ) -> Decision {
        let trusted: Vec<&Observation> = window
            .iter()
            .filter(|o| o.confidence > threshold)
            .collect();

        if trusted.len() < self.min_filtered_count {
            return Decision::Insufficient {
                filtered: trusted.len(),
            };
        }

        let Some(consensus) = majority(&trusted) else {
            return Decision::Insufficient { filtered: 0 };
        };

        let reason = if last_committed == Some(consensus.label.as_str()) {
            Some(HoldReason::RepeatOfLast)
        } else if !self.cooldown_elapsed(last_commit_time, now) {
            Some(HoldReason::CoolingDown)
        } else if consensus.ratio <= self.consensus_ratio {
            Some(HoldReason::WeakConsensus)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                debug!(
                    "Holding '{}' ({}/{} = {:.2}): {:?}",
                    consensus.label, consensus.votes, consensus.filtered, consensus.ratio, reason
                );
                Decision::Hold { consensus, reason }
            }
            None => Decision::Commit(consensus),
        }
    }
}

/// Mode of the trusted labels. On equal counts the label that appears first
/// in window order wins.
fn majority(trusted: &[&Observation]) -> Option<Consensus> {
    // first-seen order is preserved by only ever appending
    let mut tally: Vec<(&str, usize)> = Vec::new();
    for observation in trusted {
        match tally.iter_mut().find(|(label, _)| *label == observation.label) {
            Some((_, count)) => *count += 1,
            None => tally.push((observation.label.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for &(label, count) in &tally {
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((label, count));
        }
    }

    best.map(|(label, votes)| Consensus {
        label: label.to_string(),
        votes,
        filtered: trusted.len(),
        ratio: votes as f32 / trusted.len() as f32,
    })
}

//! One recognition session.
//!
//! Wires the window, smoother, sequence and statistics together and owns the
//! commit bookkeeping the smoother leaves to its caller.

use super::batch::{BatchReport, MAX_BATCH_FRAMES};
use super::observation::FrameInput;
use super::sequence::RecognizedSequence;
use super::smoother::{Decision, TemporalSmoother};
use super::snapshot::{EngineState, ResultSnapshot};
use super::stats::{SessionStats, SessionStatsTracker};
use super::threshold::ThresholdController;
use super::window::PredictionWindow;
use crate::classifier::Symbol;
use crate::config::EngineConfig;
use crate::error::{ConfigError, SessionError, ThresholdError};
use crate::export::SessionExport;
use chrono::Utc;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;

/// Per-session decision state.
///
/// Every method that changes state takes `&mut self`, so one owner processes
/// a session's frames strictly in order. Only the threshold is shared, through
/// an `Arc<ThresholdController>`.
pub struct SignSession {
    config: EngineConfig,
    smoother: TemporalSmoother,
    window: PredictionWindow,
    sequence: RecognizedSequence,
    stats: SessionStatsTracker,
    threshold: Arc<ThresholdController>,
    last_committed: Option<Symbol>,
    last_commit_time: Option<Instant>,
    state: EngineState,
}

impl SignSession {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let threshold = Arc::new(ThresholdController::new(config.confidence_threshold)?);
        Self::with_threshold(config, threshold)
    }

    /// Build a session around an existing controller, so that a control plane
    /// holding another handle to it can retune the session while it runs.
    pub fn with_threshold(
        config: EngineConfig,
        threshold: Arc<ThresholdController>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        debug!(
            "SignSession created: window={}, min_filtered={}, ratio>{}, cooldown={}ms, threshold={:.2}",
            config.window_capacity,
            config.min_filtered_count,
            config.consensus_ratio,
            config.cooldown_ms,
            threshold.get()
        );

        Ok(Self {
            smoother: TemporalSmoother::from_config(&config),
            window: PredictionWindow::new(config.window_capacity),
            sequence: RecognizedSequence::new(),
            stats: SessionStatsTracker::new(),
            threshold,
            last_committed: None,
            last_commit_time: None,
            state: EngineState::Idle,
            config,
        })
    }

    /// Run one cycle. `None` means no hand was detected in this frame.
    pub fn process(&mut self, frame: Option<FrameInput>) -> ResultSnapshot {
        // read once so the whole cycle uses a single value
        let threshold = self.threshold.get();

        let Some(frame) = frame else {
            self.stats.record_observation(false, None);
            return self.snapshot(None, None, threshold);
        };

        debug_assert!(
            (0.0..=1.0).contains(&frame.confidence),
            "confidence must be validated by the classifier adapter"
        );

        let above_threshold = frame.confidence > threshold;
        self.stats
            .record_observation(above_threshold, Some(frame.label.as_str()));
        self.window.push(frame.observation());

        let now = frame.timestamp;
        let decision = self.smoother.decide(
            &self.window.snapshot(),
            threshold,
            self.last_committed.as_deref(),
            self.last_commit_time,
            now,
        );

        let mut committed = None;
        if let Decision::Commit(consensus) = &decision {
            if self.sequence.append(consensus.label.clone(), now) {
                info!(
                    "Committed '{}' ({}/{} = {:.2})",
                    consensus.label, consensus.votes, consensus.filtered, consensus.ratio
                );
                self.last_committed = Some(consensus.label.clone());
                self.last_commit_time = Some(now);
                committed = Some(consensus.label.clone());
            } else {
                warn!("Refusing to commit an empty symbol");
            }
        }

        self.advance_state(&decision, committed.is_some(), now);

        let ratio = decision.consensus().map(|c| c.ratio);
        let mut snapshot = self.snapshot(Some(frame), ratio, threshold);
        snapshot.committed_this_cycle = committed.is_some();
        snapshot.committed_symbol = committed;
        snapshot
    }

    /// Process up to [`MAX_BATCH_FRAMES`] frames in order.
    pub fn process_batch(
        &mut self,
        frames: Vec<Option<FrameInput>>,
    ) -> Result<BatchReport, SessionError> {
        if frames.len() > MAX_BATCH_FRAMES {
            return Err(SessionError::BatchTooLarge {
                size: frames.len(),
                limit: MAX_BATCH_FRAMES,
            });
        }

        let results = frames.into_iter().map(|f| self.process(f)).collect();
        Ok(BatchReport::from_results(results))
    }

    fn advance_state(&mut self, decision: &Decision, committed: bool, now: Instant) {
        let next = if committed {
            EngineState::Committed
        } else if self.state == EngineState::Committed
            && !self.smoother.cooldown_elapsed(self.last_commit_time, now)
        {
            EngineState::Committed
        } else if decision.filtered() >= self.smoother.min_filtered_count() {
            EngineState::Observing
        } else {
            EngineState::Idle
        };

        if next != self.state {
            debug!("SignSession: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn snapshot(
        &self,
        frame: Option<FrameInput>,
        consensus_ratio: Option<f32>,
        threshold: f32,
    ) -> ResultSnapshot {
        let (hand_detected, current_label, current_confidence, top_k) = match frame {
            Some(f) => (true, Some(f.label), f.confidence, f.top_k),
            None => (false, None, 0.0, Vec::new()),
        };

        ResultSnapshot {
            hand_detected,
            current_label,
            current_confidence,
            top_k,
            committed_this_cycle: false,
            committed_symbol: None,
            consensus_ratio,
            recognized_text: self.sequence.text(),
            recognized_symbols: self.sequence.symbols().to_vec(),
            session_stats: self.stats.snapshot(),
            confidence_threshold: threshold,
            state: self.state,
            timestamp: Utc::now(),
        }
    }

    /// Clear window, sequence, statistics and commit memory together.
    ///
    /// Returns the statistics of the session that was just closed.
    pub fn reset(&mut self) -> SessionStats {
        let previous = self.stats.snapshot();

        self.window.clear();
        self.sequence.clear();
        self.stats.reset();
        self.last_committed = None;
        self.last_commit_time = None;
        self.state = EngineState::Idle;

        info!(
            "Session reset ({} observations, {} accepted)",
            previous.total_observations, previous.accepted_observations
        );
        previous
    }

    pub fn set_threshold(&self, value: f32) -> Result<(), ThresholdError> {
        self.threshold.set(value)
    }

    pub fn cycle_threshold(&self) -> f32 {
        self.threshold.cycle_preset()
    }

    pub fn threshold(&self) -> f32 {
        self.threshold.get()
    }

    pub fn threshold_controller(&self) -> Arc<ThresholdController> {
        self.threshold.clone()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.snapshot()
    }

    pub fn recognized_text(&self) -> String {
        self.sequence.text()
    }

    pub fn sequence(&self) -> &RecognizedSequence {
        &self.sequence
    }

    pub fn window(&self) -> &PredictionWindow {
        &self.window
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn export(&self) -> SessionExport {
        SessionExport::new(
            &self.sequence,
            &self.stats.snapshot(),
            &self.config,
            self.threshold.get(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Clock {
        now: Instant,
    }

    impl Clock {
        fn new() -> Self {
            Self {
                now: Instant::now(),
            }
        }

        /// Advance by one frame at ~30 fps.
        fn tick(&mut self) -> Instant {
            self.now += Duration::from_millis(33);
            self.now
        }

        fn advance(&mut self, by: Duration) {
            self.now += by;
        }
    }

    fn session() -> SignSession {
        SignSession::new(EngineConfig::default()).unwrap()
    }

    fn feed(
        session: &mut SignSession,
        clock: &mut Clock,
        label: &str,
        conf: f32,
    ) -> ResultSnapshot {
        session.process(Some(FrameInput::new(label, conf, clock.tick())))
    }

    /// Four HELLO and one YES at 0.9; the last frame commits HELLO.
    fn commit_hello(session: &mut SignSession, clock: &mut Clock) -> ResultSnapshot {
        for _ in 0..4 {
            let r = feed(session, clock, "HELLO", 0.9);
            assert!(!r.committed_this_cycle);
        }
        feed(session, clock, "YES", 0.9)
    }

    #[test]
    fn test_commits_majority() {
        let mut s = session();
        let mut clock = Clock::new();

        let r = commit_hello(&mut s, &mut clock);
        assert!(r.committed_this_cycle);
        assert_eq!(r.committed_symbol.as_deref(), Some("HELLO"));
        assert_eq!(r.recognized_text, "HELLO");
        assert_eq!(r.recognized_symbols, vec!["HELLO".to_string()]);
        assert_eq!(r.state, EngineState::Committed);
        assert!((r.consensus_ratio.unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_no_commit_during_cooldown() {
        let mut s = session();
        let mut clock = Clock::new();
        commit_hello(&mut s, &mut clock);

        let r = feed(&mut s, &mut clock, "HELLO", 0.95);
        assert!(!r.committed_this_cycle);
        assert_eq!(r.recognized_text, "HELLO");
    }

    #[test]
    fn test_low_confidence_never_commits() {
        let mut s = session();
        let mut clock = Clock::new();
        assert_eq!(s.threshold(), 0.7);

        for _ in 0..5 {
            let r = feed(&mut s, &mut clock, "HELLO", 0.5);
            assert!(r.hand_detected);
            assert!(!r.committed_this_cycle);
            assert_eq!(r.recognized_text, "");
            assert_eq!(r.state, EngineState::Idle);
        }
        assert_eq!(s.stats().accepted_observations, 0);
        assert_eq!(s.stats().total_observations, 5);
    }

    #[test]
    fn test_reset_mid_run() {
        let mut s = session();
        let mut clock = Clock::new();
        commit_hello(&mut s, &mut clock);

        let previous = s.reset();
        assert_eq!(previous.total_observations, 5);
        assert_eq!(s.recognized_text(), "");
        assert_eq!(s.stats().total_observations, 0);
        assert!(s.window().is_empty());
        assert_eq!(s.state(), EngineState::Idle);

        // still inside the old cooldown, and HELLO again: eligible after reset
        for _ in 0..4 {
            assert!(!feed(&mut s, &mut clock, "HELLO", 0.9).committed_this_cycle);
        }
        let r = feed(&mut s, &mut clock, "HELLO", 0.9);
        assert!(r.committed_this_cycle);
        assert_eq!(r.recognized_text, "HELLO");
    }

    #[test]
    fn test_no_detection_cycle() {
        let mut s = session();
        let r = s.process(None);
        assert!(!r.hand_detected);
        assert!(r.current_label.is_none());
        assert!(!r.committed_this_cycle);
        assert_eq!(r.session_stats.total_observations, 1);
        assert_eq!(r.session_stats.accepted_observations, 0);
    }

    #[test]
    fn test_next_symbol_after_cooldown() {
        let mut s = session();
        let mut clock = Clock::new();
        commit_hello(&mut s, &mut clock);

        clock.advance(Duration::from_millis(2100));
        // window holds 4 HELLO + 1 YES; add YES until it wins the vote
        let mut committed = Vec::new();
        for _ in 0..20 {
            let r = feed(&mut s, &mut clock, "YES", 0.9);
            if r.committed_this_cycle {
                committed.push(r.committed_symbol.unwrap());
            }
        }
        assert_eq!(committed, vec!["YES".to_string()]);
        assert_eq!(s.recognized_text(), "HELLO YES");
    }

    #[test]
    fn test_commits_are_separated_by_cooldown() {
        let mut s = session();
        let mut clock = Clock::new();
        let cooldown = s.config().cooldown();

        let labels = ["HELLO", "YES", "NO", "THANKS"];
        let mut commit_times = Vec::new();
        for i in 0..600 {
            // switch sign every 40 frames
            let label = labels[(i / 40) % labels.len()];
            let now = clock.tick();
            let r = s.process(Some(FrameInput::new(label, 0.9, now)));
            if r.committed_this_cycle {
                commit_times.push(now);
            }
        }

        assert!(commit_times.len() > 1);
        for pair in commit_times.windows(2) {
            assert!(pair[1] - pair[0] > cooldown);
        }
    }

    #[test]
    fn test_never_commits_same_label_twice_in_a_row() {
        let mut s = session();
        let mut clock = Clock::new();

        for _ in 0..200 {
            feed(&mut s, &mut clock, "HELLO", 0.9);
        }
        assert_eq!(s.recognized_text(), "HELLO");
    }

    #[test]
    fn test_state_machine_transitions() {
        let mut s = session();
        let mut clock = Clock::new();
        assert_eq!(s.state(), EngineState::Idle);

        for _ in 0..4 {
            feed(&mut s, &mut clock, "HELLO", 0.9);
        }
        assert_eq!(s.state(), EngineState::Idle);

        // 5th trusted frame: vote happens and commits
        feed(&mut s, &mut clock, "HELLO", 0.9);
        assert_eq!(s.state(), EngineState::Committed);

        // no-hand frames do not move the state
        s.process(None);
        assert_eq!(s.state(), EngineState::Committed);

        clock.advance(Duration::from_millis(2500));
        feed(&mut s, &mut clock, "HELLO", 0.9);
        assert_eq!(s.state(), EngineState::Observing);
    }

    #[test]
    fn test_threshold_change_applies_to_next_frame() {
        let mut s = session();
        let mut clock = Clock::new();

        assert!(s.set_threshold(1.1).is_err());
        assert_eq!(s.threshold(), 0.7);

        s.set_threshold(0.4).unwrap();
        let mut last = None;
        for _ in 0..5 {
            last = Some(feed(&mut s, &mut clock, "NO", 0.5));
        }
        let last = last.unwrap();
        assert_eq!(last.confidence_threshold, 0.4);
        assert!(last.committed_this_cycle);
        assert_eq!(s.stats().accepted_observations, 5);
    }

    #[test]
    fn test_shared_controller_retunes_session() {
        let mut s = session();
        let controller = s.threshold_controller();
        controller.set(0.95).unwrap();

        let mut clock = Clock::new();
        let r = feed(&mut s, &mut clock, "HELLO", 0.9);
        assert_eq!(r.confidence_threshold, 0.95);
        assert_eq!(r.session_stats.accepted_observations, 0);
    }

    #[test]
    fn test_stats_monotonic_and_bounded() {
        let mut s = session();
        let mut clock = Clock::new();
        let mut previous = s.stats();

        for i in 0..100 {
            let confidence = (i % 10) as f32 / 10.0;
            let frame = if i % 7 == 0 {
                None
            } else {
                Some(FrameInput::new("YES", confidence, clock.tick()))
            };
            let stats = s.process(frame).session_stats;
            assert!(stats.total_observations >= previous.total_observations);
            assert!(stats.accepted_observations >= previous.accepted_observations);
            assert!(stats.accepted_observations <= stats.total_observations);
            previous = stats;
        }
    }

    #[test]
    fn test_batch() {
        let mut s = session();
        let mut clock = Clock::new();

        let frames = vec![
            Some(FrameInput::new("HELLO", 0.9, clock.tick())),
            None,
            Some(FrameInput::new("HELLO", 0.5, clock.tick())),
            Some(FrameInput::new("HELLO", 0.8, clock.tick())),
        ];
        let report = s.process_batch(frames).unwrap();
        assert_eq!(report.summary.total_frames, 4);
        assert_eq!(report.summary.hand_detections, 3);
        assert_eq!(report.summary.confident_detections, 2);
        assert!((report.summary.detection_rate - 0.75).abs() < 1e-9);

        let too_many: Vec<Option<FrameInput>> = (0..11).map(|_| None).collect();
        assert!(matches!(
            s.process_batch(too_many),
            Err(SessionError::BatchTooLarge { size: 11, limit: 10 })
        ));
    }

    #[test]
    fn test_oversized_window_is_rejected() {
        let mut config = EngineConfig::default();
        config.window_capacity = usize::MAX / 2;
        assert!(matches!(
            SignSession::new(config),
            Err(ConfigError::WindowCapacityTooLarge { .. })
        ));
    }

    #[test]
    fn test_export() {
        let mut s = session();
        let mut clock = Clock::new();
        commit_hello(&mut s, &mut clock);

        let export = s.export();
        assert_eq!(export.recognition_results.recognized_text, "HELLO");
        assert_eq!(export.performance_stats.total_observations, 5);
        assert_eq!(export.performance_stats.accepted_observations, 5);
    }
}

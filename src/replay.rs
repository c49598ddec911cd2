//! Replay of recorded classifier output.
//!
//! Input is JSON lines. Each line is one of:
//!
//! ```text
//! null                                              no hand in this frame
//! {"label": "HELLO", "confidence": 0.9, "t_ms": 33} classifier decision
//! {"scores": [0.1, 0.7, ...], "t_ms": 66}           raw scores, one per label
//! {"control": "reset"}                              control-plane command
//! {"control": "cycle_threshold"}
//! {"control": {"set_threshold": 0.8}}
//! ```
//!
//! `t_ms` is milliseconds since the start of the recording. Lines without it
//! are stamped with the time they are read. Frame times never go backwards:
//! a frame stamped earlier than the previous one takes the previous time.

use crate::classifier::{ClassifierAdapter, Prediction};
use crate::engine::{FrameInput, SignSession};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Deserialize;
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayControl {
    Reset,
    CycleThreshold,
    SetThreshold(f32),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReplayLine {
    Control {
        control: ReplayControl,
    },
    Scores {
        scores: Vec<f32>,
        #[serde(default)]
        t_ms: Option<u64>,
    },
    Frame {
        label: String,
        confidence: f32,
        #[serde(default)]
        top_k: Vec<Prediction>,
        #[serde(default)]
        t_ms: Option<u64>,
    },
}

/// Parse one line. `Ok(None)` is a frame without a hand.
pub fn parse_line(line: &str) -> Result<Option<ReplayLine>, serde_json::Error> {
    serde_json::from_str(line)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: usize,
    pub commits: usize,
    pub controls: usize,
    /// Frames the classifier adapter refused.
    pub rejected: usize,
}

/// Drives one session from a JSON-lines reader, writing a snapshot per frame.
pub struct Replayer<'a> {
    session: &'a mut SignSession,
    adapter: &'a ClassifierAdapter,
    started: Instant,
    last_frame: Option<Instant>,
}

impl<'a> Replayer<'a> {
    pub fn new(session: &'a mut SignSession, adapter: &'a ClassifierAdapter) -> Self {
        Self {
            session,
            adapter,
            started: Instant::now(),
            last_frame: None,
        }
    }

    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        output: &mut W,
    ) -> Result<ReplaySummary> {
        let mut summary = ReplaySummary::default();

        for (index, line) in input.lines().enumerate() {
            let line_no = index + 1;
            let line = line.with_context(|| format!("failed to read line {}", line_no))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let parsed =
                parse_line(line).with_context(|| format!("invalid replay line {}", line_no))?;

            let frame = match parsed {
                Some(ReplayLine::Control { control }) => {
                    self.apply_control(control);
                    summary.controls += 1;
                    continue;
                }
                Some(ReplayLine::Frame {
                    label,
                    confidence,
                    top_k,
                    t_ms,
                }) => {
                    let at = self.timestamp(t_ms);
                    self.adapter.frame(label, confidence, top_k, at)
                }
                Some(ReplayLine::Scores { scores, t_ms }) => {
                    let at = self.timestamp(t_ms);
                    self.adapter.frame_from_scores(&scores, at)
                }
                None => {
                    self.emit(None, output, &mut summary)?;
                    continue;
                }
            };

            match frame {
                Ok(frame) => self.emit(Some(frame), output, &mut summary)?,
                Err(e) => {
                    warn!("Skipping line {}: {}", line_no, e);
                    summary.rejected += 1;
                }
            }
        }

        output.flush().context("failed to flush output")?;
        info!(
            "Replay finished: {} frames, {} commits, {} controls, {} rejected",
            summary.frames, summary.commits, summary.controls, summary.rejected
        );
        Ok(summary)
    }

    fn emit<W: Write>(
        &mut self,
        frame: Option<FrameInput>,
        output: &mut W,
        summary: &mut ReplaySummary,
    ) -> Result<()> {
        let snapshot = self.session.process(frame);
        summary.frames += 1;
        if snapshot.committed_this_cycle {
            summary.commits += 1;
        }

        serde_json::to_writer(&mut *output, &snapshot).context("failed to write snapshot")?;
        writeln!(output).context("failed to write snapshot")?;
        Ok(())
    }

    fn apply_control(&mut self, control: ReplayControl) {
        match control {
            ReplayControl::Reset => {
                let previous = self.session.reset();
                debug!(
                    "Replay reset; previous session had {} observations",
                    previous.total_observations
                );
            }
            ReplayControl::CycleThreshold => {
                self.session.cycle_threshold();
            }
            ReplayControl::SetThreshold(value) => {
                if let Err(e) = self.session.set_threshold(value) {
                    warn!("Ignoring threshold update: {}", e);
                }
            }
        }
    }

    fn timestamp(&mut self, t_ms: Option<u64>) -> Instant {
        let at = match t_ms {
            Some(ms) => self.started + Duration::from_millis(ms),
            None => Instant::now(),
        };
        let at = self.last_frame.map_or(at, |last| at.max(last));
        self.last_frame = Some(at);
        at
    }
}

//! Temporal decision engine.
//!
//! Turns a noisy stream of per-frame classifications into a stable sequence
//! of committed signs.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                           SignSession                                │
//! │                                                                      │
//! │  FrameInput ──▶ ┌──────────────────┐     ┌──────────────────────┐    │
//! │                 │ PredictionWindow │────▶│  TemporalSmoother    │    │
//! │                 │ (last N frames)  │     │  (vote + cooldown)   │    │
//! │                 └──────────────────┘     └──────────────────────┘    │
//! │                          ▲                          │ commit         │
//! │  ┌─────────────────────┐ │                          ▼                │
//! │  │ ThresholdController │─┘               ┌──────────────────────┐    │
//! │  │ (shared, atomic)    │                 │ RecognizedSequence   │    │
//! │  └─────────────────────┘                 └──────────────────────┘    │
//! │                                                                      │
//! │  SessionStatsTracker ◀── every cycle ──▶ ResultSnapshot              │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

mod batch;
mod observation;
mod sequence;
mod session;
mod smoother;
mod snapshot;
mod stats;
pub mod threshold;
mod window;

pub use batch::{BatchReport, BatchSummary, MAX_BATCH_FRAMES};
pub use observation::{FrameInput, Observation};
pub use sequence::RecognizedSequence;
pub use session::SignSession;
pub use smoother::{Consensus, Decision, HoldReason, TemporalSmoother};
pub use snapshot::{EngineState, ResultSnapshot};
pub use stats::{SessionStats, SessionStatsTracker};
pub use threshold::{ThresholdController, DEFAULT_CONFIDENCE_THRESHOLD, THRESHOLD_PRESETS};
pub use window::{PredictionWindow, DEFAULT_WINDOW_CAPACITY, MAX_WINDOW_CAPACITY};

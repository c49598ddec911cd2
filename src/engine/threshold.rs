use crate::error::ThresholdError;
use log::info;
use std::sync::atomic::{AtomicU32, Ordering};

/// Default minimum confidence for an observation to be trusted.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Presets stepped through by [`ThresholdController::cycle_preset`].
pub const THRESHOLD_PRESETS: [f32; 5] = [0.5, 0.6, 0.7, 0.8, 0.9];

/// Confidence threshold shared between a session and its control plane.
///
/// The value is stored as raw `f32` bits in an atomic, so readers always see
/// either the old or the new threshold.
pub struct ThresholdController(AtomicU32);

impl ThresholdController {
    pub fn new(value: f32) -> Result<Self, ThresholdError> {
        validate(value)?;
        Ok(Self(AtomicU32::new(value.to_bits())))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::SeqCst))
    }

    /// Replace the threshold. Out-of-range values leave the current one in place.
    pub fn set(&self, value: f32) -> Result<(), ThresholdError> {
        validate(value)?;
        let previous = f32::from_bits(self.0.swap(value.to_bits(), Ordering::SeqCst));
        info!(
            "Confidence threshold changed from {:.2} to {:.2}",
            previous, value
        );
        Ok(())
    }

    /// Step to the next preset and return it. A current value that is not a
    /// preset restarts the rotation from the middle entry.
    pub fn cycle_preset(&self) -> f32 {
        let result = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |bits| {
                Some(next_preset(f32::from_bits(bits)).to_bits())
            });
        // the closure always returns Some
        let previous = match result {
            Ok(bits) | Err(bits) => f32::from_bits(bits),
        };
        let next = next_preset(previous);
        info!("Confidence threshold set to preset {:.1}", next);
        next
    }
}

impl Default for ThresholdController {
    fn default() -> Self {
        Self(AtomicU32::new(DEFAULT_CONFIDENCE_THRESHOLD.to_bits()))
    }
}

impl std::fmt::Debug for ThresholdController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ThresholdController").field(&self.get()).finish()
    }
}

/// Accept only values within `[0, 1]`. NaN fails the range check.
pub fn validate(value: f32) -> Result<(), ThresholdError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ThresholdError::OutOfRange(value))
    }
}

fn next_preset(current: f32) -> f32 {
    let index = THRESHOLD_PRESETS
        .iter()
        .position(|p| (p - current).abs() < 1e-6)
        .unwrap_or(2);
    THRESHOLD_PRESETS[(index + 1) % THRESHOLD_PRESETS.len()]
}

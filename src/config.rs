use crate::classifier::{Vocabulary, DEFAULT_TOP_K};
use crate::engine::{
    threshold, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_WINDOW_CAPACITY, MAX_WINDOW_CAPACITY,
};
use crate::error::ConfigError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Parameters of one recognition session.
///
/// Everything except `confidence_threshold` is fixed for the lifetime of a
/// session; the threshold is only the initial value of the session's
/// `ThresholdController`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,
    #[serde(default = "default_min_filtered_count")]
    pub min_filtered_count: usize,
    #[serde(default = "default_consensus_ratio")]
    pub consensus_ratio: f32,
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub vocabulary: Vocabulary,
}

fn default_window_capacity() -> usize {
    DEFAULT_WINDOW_CAPACITY
}

fn default_min_filtered_count() -> usize {
    5
}

fn default_consensus_ratio() -> f32 {
    0.6
}

fn default_cooldown_ms() -> u64 {
    2000
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_capacity: default_window_capacity(),
            min_filtered_count: default_min_filtered_count(),
            consensus_ratio: default_consensus_ratio(),
            cooldown_ms: default_cooldown_ms(),
            confidence_threshold: default_confidence_threshold(),
            top_k: default_top_k(),
            vocabulary: Vocabulary::default(),
        }
    }
}

impl EngineConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_capacity == 0 {
            return Err(ConfigError::ZeroWindowCapacity);
        }
        if self.window_capacity > MAX_WINDOW_CAPACITY {
            return Err(ConfigError::WindowCapacityTooLarge {
                capacity: self.window_capacity,
                max: MAX_WINDOW_CAPACITY,
            });
        }
        if self.min_filtered_count == 0 || self.min_filtered_count > self.window_capacity {
            return Err(ConfigError::MinFilteredCount {
                min: self.min_filtered_count,
                capacity: self.window_capacity,
            });
        }
        if !(0.0..=1.0).contains(&self.consensus_ratio) {
            return Err(ConfigError::ConsensusRatio(self.consensus_ratio));
        }
        if self.top_k == 0 {
            return Err(ConfigError::ZeroTopK);
        }
        threshold::validate(self.confidence_threshold)?;
        Ok(())
    }

    /// Read and validate a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&raw)?;
        config.validate()?;

        debug!("Loaded engine config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Like [`EngineConfig::load`], but falls back to defaults when `path`
    /// is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

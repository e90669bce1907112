//! Engine construction settings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Everything the engine needs to know before it renders its first block.
///
/// Deserialises with per-field defaults, so a config file only has to name
/// what it changes:
///
/// ```
/// # #[cfg(feature = "serde")] {
/// let config: flowgraph::EngineConfig =
///     serde_json::from_str(r#"{ "sample_rate": 44100 }"#).unwrap();
/// assert_eq!(config.sample_rate, 44_100.0);
/// assert_eq!(config.heartbeat_interval, 1.0);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Seconds of audio between heartbeats.
    pub heartbeat_interval: f32,
    pub control_capacity: usize,
    pub notification_capacity: usize,
    /// Lower bound. [`channel`](crate::channel) raises it to whatever a full
    /// control queue can hand back.
    pub retire_capacity: usize,
    /// Seeds noise, sample-and-hold, grain scatter and string bursts.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            heartbeat_interval: 1.0,
            control_capacity: 64,
            notification_capacity: 1024,
            retire_capacity: 256,
            seed: 0x5eed,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    /// Heartbeat period in frames, at least one.
    pub fn heartbeat_frames(&self) -> u64 {
        (self.heartbeat_interval.max(0.0) * self.sample_rate).round().max(1.0) as u64
    }
}

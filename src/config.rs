//! Session configuration, speed presets, and input generation.

use crate::algo::Algorithm;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const MIN_ARRAY_SIZE: usize = 5;
pub const MAX_ARRAY_SIZE: usize = 45;
pub const DEFAULT_ARRAY_SIZE: usize = 20;

pub const MIN_VALUE: u32 = 10;
pub const MAX_VALUE: u32 = 400;

/// Delay at the fast end of the speed slider.
pub const FASTEST_DELAY_MS: u64 = 5;
/// Delay at the slow end of the speed slider.
pub const SLOWEST_DELAY_MS: u64 = 500;
pub const DEFAULT_DELAY_MS: u64 = 80;

/// Invalid [`SessionConfig`] values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("array size {size} outside {min}..={max}")]
    ArraySize { size: usize, min: usize, max: usize },

    #[error("delay of {delay_ms} ms outside {min}..={max} ms")]
    Delay { delay_ms: u64, min: u64, max: u64 },

    #[error("value range {min}..={max} is empty")]
    ValueRange { min: u32, max: u32 },
}

/// Settings a session starts from.
///
/// Every field has a default, so a partial JSON document is a valid config:
///
/// ```
/// use sortviz::config::SessionConfig;
/// use sortviz::algo::Algorithm;
///
/// let config: SessionConfig = serde_json::from_str(r#"{ "algorithm": "heap", "array_size": 8 }"#).unwrap();
/// assert_eq!(config.algorithm, Algorithm::Heap);
/// assert_eq!(config.delay_ms, 80);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub algorithm: Algorithm,

    /// Number of random values generated for a new array
    #[serde(default = "default_array_size")]
    pub array_size: usize,

    /// Pacing delay per step, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    #[serde(default = "default_min_value")]
    pub min_value: u32,

    #[serde(default = "default_max_value")]
    pub max_value: u32,

    /// Seed for reproducible arrays; OS entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_array_size() -> usize {
    DEFAULT_ARRAY_SIZE
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_min_value() -> u32 {
    MIN_VALUE
}

fn default_max_value() -> u32 {
    MAX_VALUE
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            array_size: DEFAULT_ARRAY_SIZE,
            delay_ms: DEFAULT_DELAY_MS,
            min_value: MIN_VALUE,
            max_value: MAX_VALUE,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_array_size(self.array_size)?;
        self.validate_pacing_and_values()
    }

    /// Checks every setting except `array_size`, for sessions whose array is
    /// supplied by the caller.
    pub fn validate_pacing_and_values(&self) -> Result<(), ConfigError> {
        if !(FASTEST_DELAY_MS..=SLOWEST_DELAY_MS).contains(&self.delay_ms) {
            return Err(ConfigError::Delay {
                delay_ms: self.delay_ms,
                min: FASTEST_DELAY_MS,
                max: SLOWEST_DELAY_MS,
            });
        }
        if self.min_value > self.max_value {
            return Err(ConfigError::ValueRange {
                min: self.min_value,
                max: self.max_value,
            });
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

pub(crate) fn validate_array_size(size: usize) -> Result<(), ConfigError> {
    if (MIN_ARRAY_SIZE..=MAX_ARRAY_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(ConfigError::ArraySize {
            size,
            min: MIN_ARRAY_SIZE,
            max: MAX_ARRAY_SIZE,
        })
    }
}

/// Coarse description of a pacing delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedLabel {
    Blazing,
    Fast,
    Medium,
    Slow,
    Crawl,
}

impl SpeedLabel {
    pub fn for_delay(delay: Duration) -> Self {
        match delay.as_millis() {
            0..=20 => SpeedLabel::Blazing,
            21..=60 => SpeedLabel::Fast,
            61..=150 => SpeedLabel::Medium,
            151..=300 => SpeedLabel::Slow,
            _ => SpeedLabel::Crawl,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpeedLabel::Blazing => "BLAZING",
            SpeedLabel::Fast => "FAST",
            SpeedLabel::Medium => "MEDIUM",
            SpeedLabel::Slow => "SLOW",
            SpeedLabel::Crawl => "CRAWL",
        }
    }
}

/// Maps a 0..=100 speed slider (higher is faster) onto a pacing delay.
///
/// Values above 100 are treated as 100.
pub fn delay_from_slider(percent: u8) -> Duration {
    let percent = f64::from(percent.min(100));
    let span = (SLOWEST_DELAY_MS - FASTEST_DELAY_MS) as f64;
    let ms = (SLOWEST_DELAY_MS as f64 - percent / 100.0 * span).round();
    Duration::from_millis(ms as u64)
}

/// Inverse of [`delay_from_slider`], clamped to the slider's range.
pub fn slider_from_delay(delay: Duration) -> u8 {
    let ms = (delay.as_millis() as u64).clamp(FASTEST_DELAY_MS, SLOWEST_DELAY_MS);
    let span = (SLOWEST_DELAY_MS - FASTEST_DELAY_MS) as f64;
    (((SLOWEST_DELAY_MS - ms) as f64 / span) * 100.0).round() as u8
}

/// `size` uniform values in `min..=max`.
pub fn random_array<R: Rng + ?Sized>(rng: &mut R, size: usize, min: u32, max: u32) -> Vec<u32> {
    (0..size).map(|_| rng.random_range(min..=max)).collect()
}

/// Formats a run duration the way the statistics panel shows it.
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    if ms < 1000 {
        format!("{ms} ms")
    } else {
        format!("{:.2} s", ms as f64 / 1000.0)
    }
}

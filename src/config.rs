//! Game configuration constants and validation.
//!
//! `GameConfig::default()` reproduces the stock game: a one minute round, a
//! spawn attempt every 1.2 s and the built-in kid-friendly word tables. Pages
//! can override any subset of fields through JSON (`serde_json` feature).

use std::ops::Range;

use thiserror::Error;

use crate::words::{BASE_WORDS, WEIGHTED_WORDS, WeightedWordPool};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("word pool is empty; configure at least one base or weighted word")]
    EmptyWordPool,
    #[error("weighted word '{0}' must have a positive weight")]
    ZeroWeight(String),
    #[error("round duration must be positive, got {0}s")]
    InvalidDuration(f64),
    #[error("spawn interval must be positive")]
    InvalidSpawnInterval,
    #[error("bubble rise range {start}..{end}s is empty or non-positive")]
    InvalidRiseRange { start: f64, end: f64 },
    #[cfg(feature = "serde_json")]
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Round length in seconds.
    pub duration_secs: f64,
    pub spawn_interval_ms: u32,
    pub base_words: Vec<String>,
    /// How many times each base word is repeated in the pool.
    pub base_repeat: u32,
    pub weighted_words: Vec<(String, u32)>,
    /// Bubble rise animation duration, sampled uniformly per bubble.
    pub rise_secs: Range<f64>,
    pub speech_rate: f32,
    pub speech_pitch: f32,
    /// Viewport width (px) at or below which the on-screen keyboard is shown.
    pub touch_keyboard_max_width: f64,
    /// Delay before the round starts automatically after page load. `None` disables autostart.
    pub autostart_delay_ms: Option<u32>,
    /// `tracing_subscriber::EnvFilter` directive used by the browser console logger.
    pub log_filter: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            duration_secs: 60.0,
            spawn_interval_ms: 1200,
            base_words: BASE_WORDS.iter().map(|w| w.to_string()).collect(),
            base_repeat: 2,
            weighted_words: WEIGHTED_WORDS
                .iter()
                .map(|(w, weight)| (w.to_string(), *weight))
                .collect(),
            rise_secs: 12.0..18.0,
            speech_rate: 0.9,
            speech_pitch: 1.1,
            touch_keyboard_max_width: 700.0,
            autostart_delay_ms: Some(150),
            log_filter: "info".to_string(),
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON object; missing fields keep their defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.duration_secs > 0.0) {
            return Err(ConfigError::InvalidDuration(self.duration_secs));
        }
        if self.spawn_interval_ms == 0 {
            return Err(ConfigError::InvalidSpawnInterval);
        }
        let Range { start, end } = self.rise_secs;
        if !(start > 0.0 && end > start) {
            return Err(ConfigError::InvalidRiseRange { start, end });
        }
        self.word_pool().map(|_| ())
    }

    pub fn word_pool(&self) -> Result<WeightedWordPool, ConfigError> {
        WeightedWordPool::new(&self.base_words, self.base_repeat, &self.weighted_words)
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_secs * 1000.0
    }
}

//! Decoder configuration types
//!
//! Everything here can be deserialized from a config file; missing keys fall
//! back to the reference values (20 fps, `;` delimiter, `#` comments, 2 s
//! notify gates).

use crate::input::delimited::{DEFAULT_COMMENT_MARKER, DEFAULT_DELIMITER};
use crate::types::{DecoderError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FRAMES_PER_SECOND: u32 = 20;
pub const DEFAULT_MIN_DURATION: f32 = 2.0;
pub const DEFAULT_SUCCESS_THRESHOLD: f32 = 0.5;

/// Configuration for the decoder library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Video frame rate used to turn frame indices into seconds
    pub frames_per_second: u32,

    /// Field separator in input records
    pub delimiter: String,

    /// Lines starting with this character are ignored
    pub comment_marker: char,

    pub eyes_closed: EyesClosedConfig,

    pub looking_away: LookingAwayConfig,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            delimiter: DEFAULT_DELIMITER.to_string(),
            comment_marker: DEFAULT_COMMENT_MARKER,
            eyes_closed: EyesClosedConfig::default(),
            looking_away: LookingAwayConfig::default(),
        }
    }
}

/// Settings for the "Eyes closed" condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyesClosedConfig {
    pub enabled: bool,
    /// Episodes must last strictly longer than this to be published
    pub min_duration: f32,
    /// Confidences/probabilities must exceed this to count
    pub success_threshold: f32,
}

impl Default for EyesClosedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_duration: DEFAULT_MIN_DURATION,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
        }
    }
}

/// Settings for the "Looking away" condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookingAwayConfig {
    pub enabled: bool,
    pub min_duration: f32,
    pub success_threshold: f32,
    /// Yaw limit in radians (0.35 rad ≈ 20°)
    pub yaw_threshold: f32,
    /// Pitch limit in radians (0.5 rad ≈ 28°)
    pub pitch_threshold: f32,
    /// Consecutive non-away frames tolerated before the episode ends
    pub miss_tolerance: u32,
}

impl Default for LookingAwayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_duration: DEFAULT_MIN_DURATION,
            success_threshold: DEFAULT_SUCCESS_THRESHOLD,
            yaw_threshold: 0.35,
            pitch_threshold: 0.5,
            miss_tolerance: 2,
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the frame rate
    pub fn with_frame_rate(mut self, frames_per_second: u32) -> Self {
        self.frames_per_second = frames_per_second;
        self
    }

    /// Builder method: set the field delimiter
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Builder method: set the comment marker
    pub fn with_comment_marker(mut self, marker: char) -> Self {
        self.comment_marker = marker;
        self
    }

    /// Builder method: enable or disable the eyes-closed condition
    pub fn with_eyes_closed(mut self, enabled: bool) -> Self {
        self.eyes_closed.enabled = enabled;
        self
    }

    /// Builder method: enable or disable the looking-away condition
    pub fn with_looking_away(mut self, enabled: bool) -> Self {
        self.looking_away.enabled = enabled;
        self
    }

    /// Builder method: notify gate for eyes-closed episodes
    pub fn with_eyes_closed_min_duration(mut self, seconds: f32) -> Self {
        self.eyes_closed.min_duration = seconds;
        self
    }

    /// Builder method: notify gate for looking-away episodes
    pub fn with_looking_away_min_duration(mut self, seconds: f32) -> Self {
        self.looking_away.min_duration = seconds;
        self
    }

    /// Reject settings the decoder cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.frames_per_second == 0 {
            return Err(DecoderError::InvalidConfig(
                "frames_per_second must be greater than 0".to_string(),
            ));
        }
        if self.delimiter.is_empty() {
            return Err(DecoderError::InvalidConfig(
                "delimiter must not be empty".to_string(),
            ));
        }

        let durations = [
            ("eyes_closed.min_duration", self.eyes_closed.min_duration),
            ("looking_away.min_duration", self.looking_away.min_duration),
        ];
        for (key, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(DecoderError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    key, value
                )));
            }
        }

        let thresholds = [
            ("eyes_closed.success_threshold", self.eyes_closed.success_threshold),
            ("looking_away.success_threshold", self.looking_away.success_threshold),
            ("looking_away.yaw_threshold", self.looking_away.yaw_threshold),
            ("looking_away.pitch_threshold", self.looking_away.pitch_threshold),
        ];
        for (key, value) in thresholds {
            if !value.is_finite() {
                return Err(DecoderError::InvalidConfig(format!(
                    "{} must be finite, got {}",
                    key, value
                )));
            }
        }

        Ok(())
    }
}

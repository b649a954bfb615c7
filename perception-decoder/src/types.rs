//! Core types for the perception decoder library
//!
//! This module defines the values that flow between the frame source, the
//! conditions, the decoder run-loop and the notification bus.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that can occur while reading frames or evaluating conditions
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Malformed value {value:?} for field {field} on line {line}")]
    MalformedValue {
        field: String,
        value: String,
        line: usize,
    },

    #[error("Missing value for field {field} on line {line}")]
    MissingValue { field: String, line: usize },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DecoderError {
    /// True for errors caused by the contents of a single record.
    ///
    /// Callers reading untrusted input may skip such a frame; every other
    /// kind means the run is misconfigured and should be aborted.
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            DecoderError::MalformedValue { .. } | DecoderError::MissingValue { .. }
        )
    }
}

/// Edge reported by a condition for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// An episode began on this frame
    Start,
    /// No edge on this frame
    NoChange,
    /// The current episode ended on this frame
    End,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Start => write!(f, "Start"),
            Transition::NoChange => write!(f, "NoChange"),
            Transition::End => write!(f, "End"),
        }
    }
}

/// A completed episode that passed its condition's notify gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Condition name (e.g. "Eyes closed")
    pub name: String,
    /// Episode start, seconds since the first frame
    pub start_time: f32,
    /// Episode end, seconds since the first frame
    pub end_time: f32,
}

impl Notification {
    pub fn new(name: impl Into<String>, start_time: f32, end_time: f32) -> Self {
        Self {
            name: name.into(),
            start_time,
            end_time,
        }
    }

    /// Episode length in seconds
    pub fn duration(&self) -> f32 {
        self.end_time - self.start_time
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event : {} started at {} ended at {}",
            self.name, self.start_time, self.end_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_classification() {
        let malformed = DecoderError::MalformedValue {
            field: "Person.confidence".to_string(),
            value: "abc".to_string(),
            line: 3,
        };
        let missing = DecoderError::MissingValue {
            field: "Person.confidence".to_string(),
            line: 3,
        };
        assert!(malformed.is_frame_error());
        assert!(missing.is_frame_error());
        assert!(!DecoderError::UnknownField("Foo".to_string()).is_frame_error());
        assert!(!DecoderError::InvalidConfig("fps".to_string()).is_frame_error());
    }

    #[test]
    fn test_notification_display() {
        let n = Notification::new("Eyes closed", 0.5, 2.55);
        assert_eq!(
            n.to_string(),
            "Event : Eyes closed started at 0.5 ended at 2.55"
        );
    }

    #[test]
    fn test_notification_json() {
        let n = Notification::new("Looking away", 1.0, 4.0);
        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, r#"{"name":"Looking away","start_time":1.0,"end_time":4.0}"#);
        assert_eq!(n.duration(), 3.0);
    }
}

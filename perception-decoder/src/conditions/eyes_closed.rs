//! "Eyes closed" condition
//!
//! Each eye keeps a latched closed/open flag. The flags only change when the
//! person, the head and both eyes are detected; on occluded frames the last
//! known state is kept so the episode does not flicker. A frame without a
//! person clears both flags.
//!
//! `Eye*.state.probUnknown` is part of the schema but not read here.

use super::{Detector, Predicate};
use crate::config::EyesClosedConfig;
use crate::input::FrameSource;
use crate::schema::{
    HEAD_CONFIDENCE, LEFT_EYE_CONFIDENCE, LEFT_EYE_PROB_CLOSED, LEFT_EYE_PROB_OPEN,
    PERSON_CONFIDENCE, RIGHT_EYE_CONFIDENCE, RIGHT_EYE_PROB_CLOSED, RIGHT_EYE_PROB_OPEN,
};
use crate::types::Result;

pub const EYES_CLOSED: &str = "Eyes closed";

pub type EyesClosedCondition = Detector<EyesClosed>;

#[derive(Debug, Clone, PartialEq)]
pub struct EyesClosed {
    success_threshold: f32,
    left_closed: bool,
    right_closed: bool,
}

impl EyesClosed {
    pub fn new(success_threshold: f32) -> Self {
        Self {
            success_threshold,
            left_closed: false,
            right_closed: false,
        }
    }

    pub fn left_closed(&self) -> bool {
        self.left_closed
    }

    pub fn right_closed(&self) -> bool {
        self.right_closed
    }

    fn detected(&self, frame: &dyn FrameSource, field: &str) -> Result<bool> {
        Ok(frame.field(field)? > self.success_threshold)
    }

    /// `Some(true)` closed, `Some(false)` open, `None` undecided
    fn eye_state(&self, frame: &dyn FrameSource, closed: &str, open: &str) -> Result<Option<bool>> {
        if self.detected(frame, closed)? {
            Ok(Some(true))
        } else if self.detected(frame, open)? {
            Ok(Some(false))
        } else {
            Ok(None)
        }
    }
}

impl Default for EyesClosed {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SUCCESS_THRESHOLD)
    }
}

impl Predicate for EyesClosed {
    fn evaluate(&mut self, frame: &dyn FrameSource) -> Result<bool> {
        let mut left = self.left_closed;
        let mut right = self.right_closed;

        if !self.detected(frame, PERSON_CONFIDENCE)? {
            left = false;
            right = false;
        } else if self.detected(frame, HEAD_CONFIDENCE)?
            && self.detected(frame, LEFT_EYE_CONFIDENCE)?
            && self.detected(frame, RIGHT_EYE_CONFIDENCE)?
        {
            left = self
                .eye_state(frame, LEFT_EYE_PROB_CLOSED, LEFT_EYE_PROB_OPEN)?
                .unwrap_or(left);
            right = self
                .eye_state(frame, RIGHT_EYE_PROB_CLOSED, RIGHT_EYE_PROB_OPEN)?
                .unwrap_or(right);
        }

        // Commit only once every lookup succeeded
        self.left_closed = left;
        self.right_closed = right;

        Ok(left && right)
    }

    fn reset(&mut self) {
        self.left_closed = false;
        self.right_closed = false;
    }
}

impl Detector<EyesClosed> {
    pub fn from_config(config: &EyesClosedConfig) -> Self {
        Detector::new(
            EYES_CLOSED,
            EyesClosed::new(config.success_threshold),
            config.min_duration,
        )
    }
}

impl Default for Detector<EyesClosed> {
    fn default() -> Self {
        Self::from_config(&EyesClosedConfig::default())
    }
}

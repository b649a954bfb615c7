//! "Looking away" condition
//!
//! The head counts as turned away when head orientation or gaze exceeds the
//! yaw or pitch limit in either direction. Short glances back at the road are
//! absorbed by a miss counter: the episode only ends after more than
//! `miss_tolerance` consecutive non-away frames. Frames without a detected
//! person or head leave both the latch and the counter untouched.

use super::{Detector, Predicate};
use crate::config::LookingAwayConfig;
use crate::input::FrameSource;
use crate::schema::{
    HEAD_CONFIDENCE, HEAD_GAZE_PITCH, HEAD_GAZE_YAW, HEAD_ORIENTATION_PITCH, HEAD_ORIENTATION_YAW,
    PERSON_CONFIDENCE,
};
use crate::types::Result;

pub const LOOKING_AWAY: &str = "Looking away";

pub type LookingAwayCondition = Detector<LookingAway>;

#[derive(Debug, Clone, PartialEq)]
pub struct LookingAway {
    success_threshold: f32,
    yaw_threshold: f32,
    pitch_threshold: f32,
    miss_tolerance: u32,
    looking_away: bool,
    misses: u32,
}

impl LookingAway {
    pub fn new(config: &LookingAwayConfig) -> Self {
        Self {
            success_threshold: config.success_threshold,
            yaw_threshold: config.yaw_threshold,
            pitch_threshold: config.pitch_threshold,
            miss_tolerance: config.miss_tolerance,
            looking_away: false,
            misses: 0,
        }
    }

    /// Consecutive non-away frames seen since the head was last turned
    pub fn misses(&self) -> u32 {
        self.misses
    }

    fn detected(&self, frame: &dyn FrameSource, field: &str) -> Result<bool> {
        Ok(frame.field(field)? > self.success_threshold)
    }

    fn head_turned(&self, frame: &dyn FrameSource) -> Result<bool> {
        let limits = [
            (HEAD_ORIENTATION_YAW, self.yaw_threshold),
            (HEAD_GAZE_YAW, self.yaw_threshold),
            (HEAD_ORIENTATION_PITCH, self.pitch_threshold),
            (HEAD_GAZE_PITCH, self.pitch_threshold),
        ];

        for (field, limit) in limits {
            if frame.field(field)?.abs() > limit {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Default for LookingAway {
    fn default() -> Self {
        Self::new(&LookingAwayConfig::default())
    }
}

impl Predicate for LookingAway {
    fn evaluate(&mut self, frame: &dyn FrameSource) -> Result<bool> {
        if self.detected(frame, PERSON_CONFIDENCE)? && self.detected(frame, HEAD_CONFIDENCE)? {
            if self.head_turned(frame)? {
                self.looking_away = true;
                self.misses = 0;
            } else {
                self.misses = self.misses.saturating_add(1);
                if self.misses > self.miss_tolerance {
                    self.looking_away = false;
                }
            }
        }

        Ok(self.looking_away)
    }

    fn reset(&mut self) {
        self.looking_away = false;
        self.misses = 0;
    }
}

impl Detector<LookingAway> {
    pub fn from_config(config: &LookingAwayConfig) -> Self {
        Detector::new(LOOKING_AWAY, LookingAway::new(config), config.min_duration)
    }
}

impl Default for Detector<LookingAway> {
    fn default() -> Self {
        Self::from_config(&LookingAwayConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::test_support::frame;
    use crate::conditions::Condition;
    use crate::types::Transition;

    fn head(yaw: f32, pitch: f32, gaze_yaw: f32, gaze_pitch: f32) -> Vec<(&'static str, f32)> {
        vec![
            (PERSON_CONFIDENCE, 0.9),
            (HEAD_CONFIDENCE, 0.9),
            (HEAD_ORIENTATION_YAW, yaw),
            (HEAD_ORIENTATION_PITCH, pitch),
            (HEAD_GAZE_YAW, gaze_yaw),
            (HEAD_GAZE_PITCH, gaze_pitch),
        ]
    }

    fn away() -> Vec<(&'static str, f32)> {
        head(0.6, 0.0, 0.0, 0.0)
    }

    fn forward() -> Vec<(&'static str, f32)> {
        head(0.0, 0.0, 0.0, 0.0)
    }

    fn run(
        condition: &mut LookingAwayCondition,
        frames: &[Vec<(&'static str, f32)>],
    ) -> Vec<Transition> {
        frames
            .iter()
            .enumerate()
            .map(|(i, values)| condition.check(&frame(values), i as f32 * 0.05).unwrap())
            .collect()
    }

    #[test]
    fn test_every_axis_and_sign_counts() {
        let turned = [
            head(0.36, 0.0, 0.0, 0.0),
            head(-0.36, 0.0, 0.0, 0.0),
            head(0.0, 0.51, 0.0, 0.0),
            head(0.0, -0.51, 0.0, 0.0),
            head(0.0, 0.0, 0.36, 0.0),
            head(0.0, 0.0, -0.36, 0.0),
            head(0.0, 0.0, 0.0, 0.51),
            head(0.0, 0.0, 0.0, -0.51),
        ];
        for values in &turned {
            let mut condition = LookingAwayCondition::default();
            assert_eq!(
                condition.check(&frame(values), 0.0).unwrap(),
                Transition::Start,
                "{:?}",
                values
            );
        }

        let mut condition = LookingAwayCondition::default();
        let within = head(0.35, -0.5, -0.35, 0.5);
        assert_eq!(condition.check(&frame(&within), 0.0).unwrap(), Transition::NoChange);
    }

    #[test]
    fn test_single_glance_back_does_not_end_episode() {
        let mut condition = LookingAwayCondition::default();
        let transitions = run(&mut condition, &[away(), away(), forward(), away(), away()]);

        assert_eq!(transitions[0], Transition::Start);
        assert!(!transitions.contains(&Transition::End));
        assert!(condition.is_active());
        assert_eq!(condition.predicate().misses(), 0);
    }

    #[test]
    fn test_four_forward_frames_end_exactly_once() {
        let mut condition = LookingAwayCondition::default();
        let transitions = run(
            &mut condition,
            &[away(), away(), forward(), forward(), forward(), forward()],
        );

        let ends: Vec<usize> = transitions
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Transition::End)
            .map(|(i, _)| i)
            .collect();
        // Third consecutive forward frame exceeds the tolerance of 2
        assert_eq!(ends, vec![4]);
        assert_eq!(condition.start_time(), 0.0);
        assert_eq!(condition.end_time(), 0.2);
        assert!(!condition.is_active());
    }

    #[test]
    fn test_missing_head_carries_state_over() {
        let mut condition = LookingAwayCondition::default();
        let mut no_head = forward();
        no_head[1] = (HEAD_CONFIDENCE, 0.1);
        let mut no_person = forward();
        no_person[0] = (PERSON_CONFIDENCE, 0.0);

        let transitions = run(
            &mut condition,
            &[away(), forward(), no_head.clone(), no_person.clone(), no_head, no_person],
        );

        assert_eq!(transitions[0], Transition::Start);
        assert!(!transitions.contains(&Transition::End));
        assert_eq!(condition.predicate().misses(), 1);
        assert!(condition.is_active());
    }

    #[test]
    fn test_custom_tolerance() {
        let config = LookingAwayConfig {
            miss_tolerance: 0,
            ..LookingAwayConfig::default()
        };
        let mut condition = LookingAwayCondition::from_config(&config);
        let transitions = run(&mut condition, &[away(), forward()]);
        assert_eq!(transitions, vec![Transition::Start, Transition::End]);
    }
}

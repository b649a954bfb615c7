//! Conditions: debounced per-event state machines
//!
//! Every condition follows the same protocol: compute an "active" verdict for
//! the current frame, compare it against the previous frame's verdict and
//! report `Start` on false→true, `End` on true→false, `NoChange` otherwise.
//! That edge detection lives in [`EpisodeTracker`]. A new condition only has
//! to implement [`Predicate`]; wrapping it in a [`Detector`] gives a full
//! [`Condition`] with a minimum-duration notify gate.

use crate::input::FrameSource;
use crate::types::{Notification, Result, Transition};

pub mod eyes_closed;
pub mod looking_away;

pub use eyes_closed::{EyesClosed, EyesClosedCondition, EYES_CLOSED};
pub use looking_away::{LookingAway, LookingAwayCondition, LOOKING_AWAY};

/// A named classifier evaluated once per frame by the decoder
pub trait Condition {
    /// Event key published on the bus
    fn name(&self) -> &str;

    /// Feed one frame
    ///
    /// Called once per frame, in registration order, with non-decreasing
    /// `current_time`. Field lookup errors are returned unchanged.
    fn check(&mut self, frame: &dyn FrameSource, current_time: f32) -> Result<Transition>;

    /// Whether the episode that just ended is worth publishing
    fn should_notify(&self) -> bool;

    fn start_time(&self) -> f32;

    fn end_time(&self) -> f32;

    /// Length of the last completed episode; meaningful after `End`
    fn duration(&self) -> f32 {
        self.end_time() - self.start_time()
    }

    /// True while an episode is in progress
    fn is_active(&self) -> bool;

    /// Return to the freshly constructed state
    fn reset(&mut self);

    fn notification(&self) -> Notification {
        Notification::new(self.name(), self.start_time(), self.end_time())
    }
}

/// Per-frame verdict of a condition, with whatever debounce state it needs
pub trait Predicate {
    fn evaluate(&mut self, frame: &dyn FrameSource) -> Result<bool>;

    fn reset(&mut self);
}

/// Edge detector shared by all conditions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpisodeTracker {
    active: bool,
    start_time: f32,
    end_time: f32,
}

impl EpisodeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `active` against the previous verdict and record edge times
    pub fn update(&mut self, active: bool, time: f32) -> Transition {
        let was_active = self.active;
        self.active = active;

        match (was_active, active) {
            (false, true) => {
                self.start_time = time;
                Transition::Start
            }
            (true, false) => {
                self.end_time = time;
                Transition::End
            }
            _ => Transition::NoChange,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    pub fn end_time(&self) -> f32 {
        self.end_time
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A [`Predicate`] turned into a [`Condition`]
///
/// Episodes are published when they last strictly longer than
/// `min_duration` seconds.
#[derive(Debug, Clone)]
pub struct Detector<P> {
    name: String,
    predicate: P,
    tracker: EpisodeTracker,
    min_duration: f32,
}

impl<P: Predicate> Detector<P> {
    pub fn new(name: impl Into<String>, predicate: P, min_duration: f32) -> Self {
        Self {
            name: name.into(),
            predicate,
            tracker: EpisodeTracker::new(),
            min_duration,
        }
    }

    pub fn predicate(&self) -> &P {
        &self.predicate
    }

    pub fn min_duration(&self) -> f32 {
        self.min_duration
    }
}

impl<P: Predicate> Condition for Detector<P> {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&mut self, frame: &dyn FrameSource, current_time: f32) -> Result<Transition> {
        let active = self.predicate.evaluate(frame)?;
        let transition = self.tracker.update(active, current_time);

        match transition {
            Transition::Start => {
                log::debug!("{}: episode started at {:.3}s", self.name, current_time)
            }
            Transition::End => log::debug!(
                "{}: episode ended at {:.3}s ({:.3}s)",
                self.name,
                current_time,
                self.duration()
            ),
            Transition::NoChange => {}
        }

        Ok(transition)
    }

    fn should_notify(&self) -> bool {
        self.duration() > self.min_duration
    }

    fn start_time(&self) -> f32 {
        self.tracker.start_time()
    }

    fn end_time(&self) -> f32 {
        self.tracker.end_time()
    }

    fn is_active(&self) -> bool {
        self.tracker.is_active()
    }

    fn reset(&mut self) {
        self.tracker.reset();
        self.predicate.reset();
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DecoderError;

    /// Active whenever the scripted verdict says so
    struct Scripted {
        verdicts: Vec<bool>,
        next: usize,
    }

    impl Predicate for Scripted {
        fn evaluate(&mut self, _frame: &dyn FrameSource) -> Result<bool> {
            let verdict = self.verdicts[self.next];
            self.next += 1;
            Ok(verdict)
        }

        fn reset(&mut self) {
            self.next = 0;
        }
    }

    struct Failing;

    impl Predicate for Failing {
        fn evaluate(&mut self, frame: &dyn FrameSource) -> Result<bool> {
            frame.field("No.such.field").map(|_| true)
        }

        fn reset(&mut self) {}
    }

    #[test]
    fn test_tracker_edges() {
        let mut tracker = EpisodeTracker::new();
        assert_eq!(tracker.update(false, 0.0), Transition::NoChange);
        assert_eq!(tracker.update(true, 0.5), Transition::Start);
        assert_eq!(tracker.update(true, 1.0), Transition::NoChange);
        assert_eq!(tracker.update(false, 1.5), Transition::End);
        assert_eq!(tracker.update(false, 2.0), Transition::NoChange);

        assert_eq!(tracker.start_time(), 0.5);
        assert_eq!(tracker.end_time(), 1.5);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_start_and_end_alternate() {
        let verdicts = vec![
            false, true, true, false, true, false, false, true, true, true, false,
        ];
        let n = verdicts.len();
        let mut detector = Detector::new("scripted", Scripted { verdicts, next: 0 }, 0.0);
        let frame = test_support::frame(&[]);

        let mut last_edge = None;
        let mut last_start = 0.0;
        for i in 0..n {
            let time = i as f32 * 0.1;
            let transition = detector.check(&frame, time).unwrap();
            if transition != Transition::NoChange {
                assert_ne!(last_edge, Some(transition), "repeated {} at frame {}", transition, i);
                last_edge = Some(transition);
            }
            if transition == Transition::Start {
                assert!(detector.start_time() >= last_start);
                last_start = detector.start_time();
            }
            if transition == Transition::End {
                assert!(detector.end_time() >= detector.start_time());
                assert_eq!(
                    detector.duration(),
                    detector.end_time() - detector.start_time()
                );
            }
        }
        assert_eq!(last_edge, Some(Transition::End));
    }

    #[test]
    fn test_notify_gate_is_strict() {
        let verdicts = vec![true, true, false];
        let mut detector = Detector::new("gate", Scripted { verdicts, next: 0 }, 1.0);
        let frame = test_support::frame(&[]);

        detector.check(&frame, 0.0).unwrap();
        detector.check(&frame, 0.5).unwrap();
        assert_eq!(detector.check(&frame, 1.0).unwrap(), Transition::End);
        assert_eq!(detector.duration(), 1.0);
        assert!(!detector.should_notify());

        detector.reset();
        detector.check(&frame, 0.0).unwrap();
        detector.check(&frame, 0.5).unwrap();
        assert_eq!(detector.check(&frame, 1.05).unwrap(), Transition::End);
        assert!(detector.should_notify());
        assert_eq!(detector.notification(), Notification::new("gate", 0.0, 1.05));
    }

    #[test]
    fn test_reset_clears_episode() {
        let scripted = Scripted {
            verdicts: vec![true, true],
            next: 0,
        };
        let mut detector = Detector::new("reset", scripted, 0.0);
        let frame = test_support::frame(&[]);

        assert_eq!(detector.check(&frame, 3.0).unwrap(), Transition::Start);
        assert!(detector.is_active());

        detector.reset();
        assert!(!detector.is_active());
        assert_eq!(detector.start_time(), 0.0);
        assert_eq!(detector.check(&frame, 0.0).unwrap(), Transition::Start);
    }

    #[test]
    fn test_lookup_error_propagates() {
        let mut detector = Detector::new("failing", Failing, 0.0);
        let frame = test_support::frame(&[]);
        assert!(matches!(
            detector.check(&frame, 0.0),
            Err(DecoderError::UnknownField(_))
        ));
    }
}

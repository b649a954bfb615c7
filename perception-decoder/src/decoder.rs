//! Main decoder API
//!
//! The [`Decoder`] owns a frame source and the registered conditions. Each
//! step reads one frame, converts its index to seconds, evaluates every
//! condition in registration order and publishes the episodes that pass their
//! notify gate before the next frame is read.

use crate::bus::EventBus;
use crate::conditions::{Condition, EyesClosedCondition, LookingAwayCondition};
use crate::config::DecoderConfig;
use crate::input::FrameSource;
use crate::types::{DecoderError, Notification, Result, Transition};
use std::sync::atomic::{AtomicBool, Ordering};

/// Converts frame indices to seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBase {
    frames_per_second: u32,
}

impl TimeBase {
    pub fn new(frames_per_second: u32) -> Result<Self> {
        if frames_per_second == 0 {
            return Err(DecoderError::InvalidConfig(
                "frames_per_second must be greater than 0".to_string(),
            ));
        }
        Ok(Self { frames_per_second })
    }

    pub fn frames_per_second(&self) -> u32 {
        self.frames_per_second
    }

    /// Seconds elapsed at zero-based frame `index`
    pub fn time_of(&self, index: u64) -> f32 {
        (index as f64 / self.frames_per_second as f64) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    Running,
    Finished,
}

/// Outcome of a complete run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Frames read since construction or the last reset
    pub frames: u64,
    /// Notifications published on the bus
    pub notifications: usize,
    /// Conditions whose episode never ended before input ran out
    pub open_episodes: Vec<String>,
    /// True if the run stopped on a cancel request
    pub cancelled: bool,
}

/// Time-based run-loop over a frame source
pub struct Decoder<S: FrameSource> {
    source: S,
    time_base: TimeBase,
    conditions: Vec<Box<dyn Condition>>,
    state: DecoderState,
    frames: u64,
    notifications: usize,
}

impl<S: FrameSource> Decoder<S> {
    /// Create a decoder with no conditions registered
    pub fn new(source: S, frames_per_second: u32) -> Result<Self> {
        Ok(Self {
            source,
            time_base: TimeBase::new(frames_per_second)?,
            conditions: Vec::new(),
            state: DecoderState::Running,
            frames: 0,
            notifications: 0,
        })
    }

    /// Create a decoder and register the conditions enabled in `config`
    ///
    /// # Example
    /// ```no_run
    /// use perception_decoder::{Decoder, DecoderConfig, DelimitedFrameSource, EventBus, Schema};
    /// use std::path::Path;
    ///
    /// let config = DecoderConfig::new().with_frame_rate(20);
    /// let source = DelimitedFrameSource::open_with_config(
    ///     Path::new("perception_results.txt"),
    ///     Schema::perception(),
    ///     &config,
    /// ).unwrap();
    ///
    /// let mut bus: EventBus<perception_decoder::Notification> = EventBus::new();
    /// bus.register(|n| {
    ///     println!("{}", n);
    ///     false
    /// });
    ///
    /// let mut decoder = Decoder::from_config(source, &config).unwrap();
    /// decoder.run(&mut bus).unwrap();
    /// ```
    pub fn from_config(source: S, config: &DecoderConfig) -> Result<Self> {
        config.validate()?;
        let mut decoder = Self::new(source, config.frames_per_second)?;

        if config.eyes_closed.enabled {
            decoder.register_condition(Box::new(EyesClosedCondition::from_config(
                &config.eyes_closed,
            )));
        }
        if config.looking_away.enabled {
            decoder.register_condition(Box::new(LookingAwayCondition::from_config(
                &config.looking_away,
            )));
        }

        Ok(decoder)
    }

    pub fn register_condition(&mut self, condition: Box<dyn Condition>) {
        if self.condition(condition.name()).is_some() {
            log::warn!("Condition {:?} registered more than once", condition.name());
        }
        log::debug!("Registered condition: {}", condition.name());
        self.conditions.push(condition);
    }

    /// Remove the first condition called `name`
    pub fn remove_condition(&mut self, name: &str) -> Option<Box<dyn Condition>> {
        let position = self.conditions.iter().position(|c| c.name() == name)?;
        log::debug!("Removed condition: {}", name);
        Some(self.conditions.remove(position))
    }

    pub fn condition(&self, name: &str) -> Option<&dyn Condition> {
        self.conditions
            .iter()
            .find(|c| c.name() == name)
            .map(|c| &**c as &dyn Condition)
    }

    /// Registered conditions in evaluation order
    pub fn conditions(&self) -> impl Iterator<Item = &dyn Condition> + '_ {
        self.conditions.iter().map(|c| &**c as &dyn Condition)
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn time_base(&self) -> TimeBase {
        self.time_base
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Swap in a new source, returning the old one. Call `reset` to restart
    /// the clock.
    pub fn replace_source(&mut self, source: S) -> S {
        std::mem::replace(&mut self.source, source)
    }

    /// Reset every condition, the clock and the state; the source is not
    /// rewound
    pub fn reset(&mut self) {
        for condition in self.conditions.iter_mut() {
            condition.reset();
        }
        self.state = DecoderState::Running;
        self.frames = 0;
        self.notifications = 0;
    }

    /// Process a single frame
    pub fn step(&mut self, bus: &mut EventBus<Notification>) -> Result<DecoderState> {
        if self.state == DecoderState::Finished {
            return Ok(DecoderState::Finished);
        }

        if !self.source.read_next_frame()? {
            log::debug!("Input exhausted after {} frames", self.frames);
            self.state = DecoderState::Finished;
            return Ok(DecoderState::Finished);
        }

        let time = self.time_base.time_of(self.frames);
        self.frames += 1;
        log::trace!("Frame {} at {:.3}s", self.frames - 1, time);

        for condition in self.conditions.iter_mut() {
            if condition.check(&self.source, time)? != Transition::End {
                continue;
            }

            if condition.should_notify() {
                let notification = condition.notification();
                log::info!(
                    "{} from {:.3}s to {:.3}s",
                    notification.name,
                    notification.start_time,
                    notification.end_time
                );
                bus.fire(&notification);
                self.notifications += 1;
            } else {
                log::debug!(
                    "{}: {:.3}s episode below notify threshold",
                    condition.name(),
                    condition.duration()
                );
            }
        }

        Ok(DecoderState::Running)
    }

    /// Step until the source is exhausted
    pub fn run(&mut self, bus: &mut EventBus<Notification>) -> Result<RunSummary> {
        self.run_loop(bus, None)
    }

    /// Step until the source is exhausted or `cancel` is set
    ///
    /// The flag is checked between frames, never while a frame is in flight.
    pub fn run_with_cancel(
        &mut self,
        bus: &mut EventBus<Notification>,
        cancel: &AtomicBool,
    ) -> Result<RunSummary> {
        self.run_loop(bus, Some(cancel))
    }

    fn run_loop(
        &mut self,
        bus: &mut EventBus<Notification>,
        cancel: Option<&AtomicBool>,
    ) -> Result<RunSummary> {
        log::info!(
            "Decoding at {} fps with {} condition(s)",
            self.time_base.frames_per_second(),
            self.conditions.len()
        );

        let mut cancelled = false;
        loop {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                log::info!("Run cancelled after {} frames", self.frames);
                cancelled = true;
                break;
            }
            if self.step(bus)? == DecoderState::Finished {
                break;
            }
        }

        let summary = self.summary(cancelled);
        for name in &summary.open_episodes {
            log::warn!("{}: episode still open at end of input", name);
        }
        log::info!(
            "Processed {} frames, {} notification(s)",
            summary.frames,
            summary.notifications
        );

        Ok(summary)
    }

    fn summary(&self, cancelled: bool) -> RunSummary {
        RunSummary {
            frames: self.frames,
            notifications: self.notifications,
            open_episodes: self
                .conditions
                .iter()
                .filter(|c| c.is_active())
                .map(|c| c.name().to_string())
                .collect(),
            cancelled,
        }
    }
}

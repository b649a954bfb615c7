//! Perception Event Decoder Library
//!
//! Turns per-frame driver-perception telemetry (person, head, eye and hand
//! detections with their confidences) into temporal events such as
//! "Eyes closed" or "Looking away", and publishes the episodes that last long
//! enough to matter.
//!
//! # Architecture
//!
//! Data flows one way per frame:
//!
//! ```text
//! FrameSource -> Decoder -> Condition(s) -> EventBus -> subscriber(s)
//! ```
//!
//! - [`FrameSource`] yields one record of named `f32` fields at a time
//! - [`Condition`]s are independent debounced state machines that report
//!   `Start`/`NoChange`/`End` edges
//! - [`Decoder`] derives time from the frame index and the frame rate and
//!   routes gated `End` edges to the bus
//! - [`EventBus`] multicasts each [`Notification`] to every subscriber
//!
//! The library does NOT:
//! - Print or store notifications (that is up to the subscribers)
//! - Correlate events across conditions
//! - Use wall-clock time
//!
//! # Example Usage
//!
//! ```no_run
//! use perception_decoder::{
//!     Decoder, DecoderConfig, DelimitedFrameSource, EventBus, Notification, Schema,
//! };
//! use std::path::Path;
//!
//! let config = DecoderConfig::new().with_frame_rate(20);
//! let source = DelimitedFrameSource::open_with_config(
//!     Path::new("perception_results.txt"),
//!     Schema::perception(),
//!     &config,
//! )
//! .unwrap();
//!
//! let mut bus: EventBus<Notification> = EventBus::new();
//! bus.register(|n| {
//!     println!("{}", n);
//!     false
//! });
//!
//! let mut decoder = Decoder::from_config(source, &config).unwrap();
//! let summary = decoder.run(&mut bus).unwrap();
//! println!("{} frames, {} events", summary.frames, summary.notifications);
//! ```

// Public modules
pub mod bus;
pub mod conditions;
pub mod config;
pub mod decoder;
pub mod input;
pub mod schema;
pub mod types;

// Re-export main types for convenience
pub use bus::{EventBus, SubscriptionId};
pub use conditions::{
    Condition, Detector, EpisodeTracker, EyesClosedCondition, LookingAwayCondition, Predicate,
    EYES_CLOSED, LOOKING_AWAY,
};
pub use config::{DecoderConfig, EyesClosedConfig, LookingAwayConfig};
pub use decoder::{Decoder, DecoderState, RunSummary, TimeBase};
pub use input::{DelimitedFrameSource, FrameSource, MemoryFrameSource};
pub use schema::Schema;
pub use types::{DecoderError, Notification, Result, Transition};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Perception record schema
//!
//! Field names are dotted paths in the fixed column order of the perception
//! pipeline's output. The constants below are the fields read by the built-in
//! conditions.

use crate::types::{DecoderError, Result};
use std::collections::HashMap;

pub const PERSON_CONFIDENCE: &str = "Person.confidence";
pub const HEAD_CONFIDENCE: &str = "Head.detection.confidence";
pub const HEAD_ORIENTATION_YAW: &str = "Head.orientation.yaw";
pub const HEAD_ORIENTATION_PITCH: &str = "Head.orientation.pitch";
pub const HEAD_GAZE_YAW: &str = "Head.gaze.yaw";
pub const HEAD_GAZE_PITCH: &str = "Head.gaze.pitch";
pub const LEFT_EYE_CONFIDENCE: &str = "Eye1.detection.confidence";
pub const LEFT_EYE_PROB_CLOSED: &str = "Eye1.state.probClosed";
pub const LEFT_EYE_PROB_OPEN: &str = "Eye1.state.probOpen";
pub const RIGHT_EYE_CONFIDENCE: &str = "Eye2.detection.confidence";
pub const RIGHT_EYE_PROB_CLOSED: &str = "Eye2.state.probClosed";
pub const RIGHT_EYE_PROB_OPEN: &str = "Eye2.state.probOpen";

/// Column layout of the reference perception output
pub const PERCEPTION_FIELDS: [&str; 45] = [
    "Camera.probBlocked",
    "Person.confidence",
    "Person.bbox.x",
    "Person.bbox.y",
    "Person.bbox.width",
    "Person.bbox.height",
    "Head.detection.confidence",
    "Head.detection.bbox.x",
    "Head.detection.bbox.y",
    "Head.detection.bbox.width",
    "Head.detection.bbox.height",
    "Head.position.x",
    "Head.position.y",
    "Head.position.z",
    "Head.orientation.yaw",
    "Head.orientation.pitch",
    "Head.orientation.roll",
    "Head.gaze.yaw",
    "Head.gaze.pitch",
    "Hand1.confidence",
    "Hand1.bbox.x",
    "Hand1.bbox.y",
    "Hand1.bbox.width",
    "Hand1.bbox.height",
    "Hand2.confidence",
    "Hand2.bbox.x",
    "Hand2.bbox.y",
    "Hand2.bbox.width",
    "Hand2.bbox.height",
    "Eye1.detection.confidence",
    "Eye1.detection.bbox.x",
    "Eye1.detection.bbox.y",
    "Eye1.detection.bbox.width",
    "Eye1.detection.bbox.height",
    "Eye1.state.probClosed",
    "Eye1.state.probOpen",
    "Eye1.state.probUnknown",
    "Eye2.detection.confidence",
    "Eye2.detection.bbox.x",
    "Eye2.detection.bbox.y",
    "Eye2.detection.bbox.width",
    "Eye2.detection.bbox.height",
    "Eye2.state.probClosed",
    "Eye2.state.probOpen",
    "Eye2.state.probUnknown",
];

/// Ordered set of field names with O(1) name → column lookup
#[derive(Debug, Clone)]
pub struct Schema {
    names: Vec<String>,
    columns: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema from field names in column order
    ///
    /// Fails if a name is empty or appears twice.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut columns = HashMap::with_capacity(names.len());

        for (column, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(DecoderError::InvalidSchema(format!(
                    "empty field name at column {}",
                    column
                )));
            }
            if columns.insert(name.clone(), column).is_some() {
                return Err(DecoderError::InvalidSchema(format!(
                    "duplicate field name: {}",
                    name
                )));
            }
        }

        Ok(Self { names, columns })
    }

    /// The reference perception schema
    pub fn perception() -> Self {
        // PERCEPTION_FIELDS has unique, non-empty names
        let names: Vec<String> = PERCEPTION_FIELDS.iter().map(|s| s.to_string()).collect();
        let columns = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self { names, columns }
    }

    /// Column of a field, or `UnknownField`
    pub fn column(&self, name: &str) -> Result<usize> {
        self.columns
            .get(name)
            .copied()
            .ok_or_else(|| DecoderError::UnknownField(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::perception()
    }
}

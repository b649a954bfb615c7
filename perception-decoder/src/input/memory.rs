//! In-memory frame source
//!
//! Rows are queued by the caller (e.g. straight from a live perception
//! pipeline) and consumed in FIFO order.

use super::FrameSource;
use crate::schema::Schema;
use crate::types::{DecoderError, Result};
use std::collections::VecDeque;

pub struct MemoryFrameSource {
    schema: Schema,
    pending: VecDeque<Vec<f32>>,
    current: Option<Vec<f32>>,
    frame_index: Option<u64>,
    finished: bool,
}

impl MemoryFrameSource {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            pending: VecDeque::new(),
            current: None,
            frame_index: None,
            finished: false,
        }
    }

    /// Source pre-loaded with `rows`
    pub fn from_rows(schema: Schema, rows: impl IntoIterator<Item = Vec<f32>>) -> Self {
        let mut source = Self::new(schema);
        source.pending.extend(rows);
        source
    }

    /// Queue one row, values in schema column order
    pub fn push(&mut self, row: Vec<f32>) {
        self.pending.push_back(row);
        self.finished = false;
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl FrameSource for MemoryFrameSource {
    fn read_next_frame(&mut self) -> Result<bool> {
        match self.pending.pop_front() {
            Some(row) => {
                self.current = Some(row);
                self.frame_index = Some(self.frame_index.map_or(0, |i| i + 1));
                Ok(true)
            }
            None => {
                self.finished = true;
                Ok(false)
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn field(&self, name: &str) -> Result<f32> {
        let column = self.schema.column(name)?;

        self.current
            .as_ref()
            .and_then(|row| row.get(column))
            .copied()
            .ok_or_else(|| DecoderError::MissingValue {
                field: name.to_string(),
                line: self.line_number(),
            })
    }

    fn frame_index(&self) -> Option<u64> {
        self.frame_index
    }

    fn line_number(&self) -> usize {
        self.frame_index.map_or(0, |i| i as usize + 1)
    }
}

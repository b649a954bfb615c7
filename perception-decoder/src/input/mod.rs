//! Frame sources
//!
//! A frame source yields one record of named `f32` fields at a time. The
//! decoder only talks to the [`FrameSource`] trait; the concrete sources here
//! read delimited text ([`DelimitedFrameSource`]) or rows pushed from memory
//! ([`MemoryFrameSource`]).

use crate::types::Result;

pub mod delimited;
pub mod memory;

pub use delimited::DelimitedFrameSource;
pub use memory::MemoryFrameSource;

/// Sequential reader of perception records
pub trait FrameSource {
    /// Advance to the next record
    ///
    /// Returns `Ok(false)` once the source is exhausted. Exhaustion is not an
    /// error.
    fn read_next_frame(&mut self) -> Result<bool>;

    /// True once `read_next_frame` has hit the end of input
    fn is_finished(&self) -> bool;

    /// Value of `name` in the current record
    ///
    /// Fails with `UnknownField` for names outside the schema, whether or not
    /// a record has been read.
    fn field(&self, name: &str) -> Result<f32>;

    /// Zero-based index of the current record, `None` before the first one
    fn frame_index(&self) -> Option<u64>;

    /// Location of the current record for error messages (0 if unknown)
    fn line_number(&self) -> usize {
        0
    }
}

//! Delimited text frame source
//!
//! One record per line, values separated by a delimiter (`;` by default) in
//! the column order of the schema. Lines starting with the comment marker and
//! blank lines are skipped and never count as frames.
//!
//! ## Splitting rule
//! Every token between two delimiters is kept, including empty ones, so a
//! missing value never shifts later columns. A single empty token after a
//! trailing delimiter is dropped. Reading an empty token is a
//! `MissingValue` error.
//!
//! Bytes that are not valid UTF-8 are replaced with U+FFFD, so only the
//! fields that contain them fail to parse (`MalformedValue`) and the line
//! still counts as a record.

use super::FrameSource;
use crate::config::DecoderConfig;
use crate::schema::Schema;
use crate::types::{DecoderError, Result};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const DEFAULT_DELIMITER: &str = ";";
pub const DEFAULT_COMMENT_MARKER: char = '#';

/// Frame source over any buffered reader
pub struct DelimitedFrameSource<R: BufRead> {
    reader: R,
    schema: Schema,
    delimiter: String,
    comment_marker: char,
    raw: Vec<u8>,
    line: String,
    tokens: Vec<String>,
    line_number: usize,
    frame_index: Option<u64>,
    finished: bool,
}

impl DelimitedFrameSource<BufReader<File>> {
    /// Open a perception results file
    pub fn open(
        path: &Path,
        schema: Schema,
        delimiter: &str,
        comment_marker: char,
    ) -> Result<Self> {
        log::info!("Opening perception file: {:?}", path);

        let file = File::open(path)?;
        Self::new(BufReader::new(file), schema, delimiter, comment_marker)
    }

    /// Open a file using the delimiter and comment marker from `config`
    pub fn open_with_config(path: &Path, schema: Schema, config: &DecoderConfig) -> Result<Self> {
        Self::open(path, schema, &config.delimiter, config.comment_marker)
    }
}

impl<R: BufRead> DelimitedFrameSource<R> {
    pub fn new(reader: R, schema: Schema, delimiter: &str, comment_marker: char) -> Result<Self> {
        if delimiter.is_empty() {
            return Err(DecoderError::InvalidConfig(
                "delimiter must not be empty".to_string(),
            ));
        }

        Ok(Self::build(reader, schema, delimiter, comment_marker))
    }

    /// Reader with `;` delimiter and `#` comments
    pub fn with_defaults(reader: R, schema: Schema) -> Self {
        Self::build(reader, schema, DEFAULT_DELIMITER, DEFAULT_COMMENT_MARKER)
    }

    fn build(reader: R, schema: Schema, delimiter: &str, comment_marker: char) -> Self {
        Self {
            reader,
            schema,
            delimiter: delimiter.to_string(),
            comment_marker,
            raw: Vec::with_capacity(1024),
            line: String::new(),
            tokens: Vec::with_capacity(64),
            line_number: 0,
            frame_index: None,
            finished: false,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Raw tokens of the current record
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    fn is_skipped(&self, content: &str) -> bool {
        content.trim().is_empty() || content.starts_with(self.comment_marker)
    }

    fn split(&mut self, content_len: usize) {
        self.tokens.clear();
        self.tokens.extend(
            self.line[..content_len]
                .split(self.delimiter.as_str())
                .map(str::to_owned),
        );

        if self.tokens.len() > 1 && self.tokens.last().is_some_and(|t| t.is_empty()) {
            self.tokens.pop();
        }
    }
}

impl<R: BufRead> FrameSource for DelimitedFrameSource<R> {
    fn read_next_frame(&mut self) -> Result<bool> {
        if self.finished {
            return Ok(false);
        }

        loop {
            self.raw.clear();
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.raw)? == 0 {
                log::debug!("End of input after {} lines", self.line_number);
                self.finished = true;
                return Ok(false);
            }
            self.line_number += 1;

            let text = String::from_utf8_lossy(&self.raw);
            if let Cow::Owned(_) = text {
                log::warn!("Line {} is not valid UTF-8", self.line_number);
            }
            self.line.push_str(&text);

            let content_len = self.line.trim_end_matches(['\n', '\r']).len();
            if self.is_skipped(&self.line[..content_len]) {
                log::trace!("Skipping line {}", self.line_number);
                continue;
            }

            self.split(content_len);
            self.frame_index = Some(self.frame_index.map_or(0, |i| i + 1));
            return Ok(true);
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn field(&self, name: &str) -> Result<f32> {
        let column = self.schema.column(name)?;

        let token = match (self.frame_index, self.tokens.get(column)) {
            (Some(_), Some(token)) => token.trim(),
            _ => "",
        };

        if token.is_empty() {
            return Err(DecoderError::MissingValue {
                field: name.to_string(),
                line: self.line_number,
            });
        }

        token.parse::<f32>().map_err(|_| DecoderError::MalformedValue {
            field: name.to_string(),
            value: token.to_string(),
            line: self.line_number,
        })
    }

    fn frame_index(&self) -> Option<u64> {
        self.frame_index
    }

    fn line_number(&self) -> usize {
        self.line_number
    }
}

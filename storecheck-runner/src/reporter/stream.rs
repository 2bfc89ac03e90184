// Copyright (c) The storecheck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading engine events from a JSON Lines stream.

use crate::{errors::EventStreamError, reporter::events::EngineEvent};
use debug_ignore::DebugIgnore;
use std::io::BufRead;

/// Iterator over engine events read from a JSON Lines stream.
///
/// Blank lines are skipped. A line that fails to parse ends the stream with
/// an error carrying its line number; the engine integration is broken at
/// that point and continuing would misattribute results.
#[derive(Debug)]
pub struct EventStream<R> {
    reader: DebugIgnore<R>,
    line_buf: String,
    line_number: usize,
}

impl<R: BufRead> EventStream<R> {
    /// Creates a new stream over a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader: DebugIgnore(reader),
            line_buf: String::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = Result<EngineEvent, EventStreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buf.clear();
            self.line_number += 1;

            match self.reader.read_line(&mut self.line_buf) {
                Ok(0) => return None,
                Ok(_) => {
                    let trimmed = self.line_buf.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return Some(serde_json::from_str(trimmed).map_err(|error| {
                        EventStreamError::Parse {
                            line_number: self.line_number,
                            error,
                        }
                    }));
                }
                Err(error) => {
                    return Some(Err(EventStreamError::Read {
                        line_number: self.line_number,
                        error,
                    }));
                }
            }
        }
    }
}

use anyhow::{Context, Result};
use std::collections::VecDeque;

/// Byte queue that hands out complete lines of a chunked HTTP body
///
/// Network chunks may split a line (or a multi-byte character) anywhere, so
/// bytes are only decoded once a full line is available.
pub struct CircularLineBuffer {
    buffer: VecDeque<u8>,
}

impl CircularLineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Next complete line, trimmed (CRLF endings included)
    ///
    /// Returns None while no newline has arrived yet.
    pub fn next_line(&mut self) -> Option<Result<String>> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        Some(decode_line(line))
    }

    /// Flush whatever is left once the body ends without a trailing newline
    pub fn take_remaining(&mut self) -> Option<Result<String>> {
        if self.buffer.is_empty() {
            return None;
        }
        let line: Vec<u8> = self.buffer.drain(..).collect();
        Some(decode_line(line))
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn decode_line(bytes: Vec<u8>) -> Result<String> {
    let line = String::from_utf8(bytes).context("Invalid UTF-8 in stream line")?;
    Ok(line.trim().to_string())
}

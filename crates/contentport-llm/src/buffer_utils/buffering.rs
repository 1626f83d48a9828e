use anyhow::Result;
use std::collections::VecDeque;

/// Line buffer for SSE byte streams
///
/// Network chunks split lines arbitrarily, so bytes are accumulated until a
/// full `\n`-terminated line is available.
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

    /// Next complete line with surrounding whitespace (and `\r`) trimmed.
    /// Returns None while no newline is buffered.
    pub fn next_line(&mut self) -> Option<Result<String>> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();

        match String::from_utf8(line_bytes) {
            Ok(line) => Some(Ok(line.trim().to_string())),
            Err(e) => Some(Err(anyhow::anyhow!("Invalid UTF-8 in SSE line: {}", e))),
        }
    }

    /// Drain whatever is left once the upstream closed without a trailing newline
    pub fn take_remainder(&mut self) -> Option<Result<String>> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest: Vec<u8> = self.buffer.drain(..).collect();
        match String::from_utf8(rest) {
            Ok(line) => Some(Ok(line.trim().to_string())),
            Err(e) => Some(Err(anyhow::anyhow!("Invalid UTF-8 in SSE line: {}", e))),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

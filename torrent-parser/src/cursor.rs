use std::io::{ErrorKind, Read};

use crate::error::TorrentParserError;

/// Size of a single refill from the underlying source.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Upper bound on the up-front allocation for a declared string length, so a
/// lying length prefix cannot force a huge allocation before the input runs out.
const MAX_PREALLOCATION: usize = 64 * 1024;

/// Sequential read cursor over a [`Read`] source backed by a fixed-size buffer.
///
/// While capture is active every consumed byte is also appended to a side
/// buffer. Refilling is the only place the cursor may block.
pub struct ByteCursor<R> {
    source: R,
    buffer: Vec<u8>,
    pos: usize,
    filled: usize,
    consumed: u64,
    capture: Option<Vec<u8>>,
}

impl<R: Read> ByteCursor<R> {
    pub fn new(source: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, source)
    }

    pub fn with_capacity(capacity: usize, source: R) -> Self {
        ByteCursor {
            source,
            buffer: vec![0; capacity.max(1)],
            pos: 0,
            filled: 0,
            consumed: 0,
            capture: None,
        }
    }

    /// Returns the next byte without advancing.
    pub fn peek(&mut self) -> Result<u8, TorrentParserError> {
        if self.pos == self.filled && !self.refill()? {
            return Err(TorrentParserError::UnexpectedEnd);
        }
        Ok(self.buffer[self.pos])
    }

    /// Returns the next byte and advances past it.
    pub fn consume(&mut self) -> Result<u8, TorrentParserError> {
        let byte = self.peek()?;
        self.pos += 1;
        self.consumed += 1;
        if let Some(capture) = self.capture.as_mut() {
            capture.push(byte);
        }
        Ok(byte)
    }

    /// Consumes exactly `len` bytes, possibly across several refills.
    pub fn take(&mut self, len: usize) -> Result<Vec<u8>, TorrentParserError> {
        let mut out = Vec::with_capacity(len.min(MAX_PREALLOCATION));
        while out.len() < len {
            if self.pos == self.filled && !self.refill()? {
                return Err(TorrentParserError::TruncatedString {
                    expected: len,
                    found: out.len(),
                });
            }
            let available = self.filled - self.pos;
            let wanted = (len - out.len()).min(available);
            let chunk = &self.buffer[self.pos..self.pos + wanted];
            out.extend_from_slice(chunk);
            if let Some(capture) = self.capture.as_mut() {
                capture.extend_from_slice(chunk);
            }
            self.pos += wanted;
            self.consumed += wanted as u64;
        }
        Ok(out)
    }

    pub fn start_capture(&mut self) {
        self.capture = Some(Vec::new());
    }

    /// Stops capturing and hands back everything consumed since [`start_capture`].
    ///
    /// [`start_capture`]: ByteCursor::start_capture
    pub fn finish_capture(&mut self) -> Option<Vec<u8>> {
        self.capture.take()
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    /// Total number of bytes consumed so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    fn refill(&mut self) -> Result<bool, TorrentParserError> {
        loop {
            match self.source.read(&mut self.buffer) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.pos = 0;
                    self.filled = n;
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

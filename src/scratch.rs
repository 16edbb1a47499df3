//! The parser's linear scratch buffer: a bounded accumulator for whichever
//! token (method, path, header field, or header value) is currently being
//! read.
//!
//! Unlike [`crate::buffer::RingBuffer`] this is never a ring: it is reset
//! to position zero at every token boundary, and overflowing its capacity
//! is always an error, never a silent truncation.

use crate::error::{ParserError, Result};

/// Upper bound on a single token (method, path, header field, or header
/// value). Also the scratch buffer's fixed capacity.
pub const HTTP_MAX_HEADER_SIZE: usize = 81920;

/// A bounded linear accumulator for the token currently being parsed.
#[derive(Debug)]
pub struct ScratchBuffer {
    bytes: Vec<u8>,
}

impl ScratchBuffer {
    /// Builds an empty scratch buffer with its capacity reserved up front.
    pub fn new() -> Self {
        Self {
            bytes: Vec::with_capacity(HTTP_MAX_HEADER_SIZE),
        }
    }

    /// Current number of accumulated bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if no bytes have been accumulated since the last reset.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The accumulated bytes, to be handed to a host callback.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Clears the buffer, ready for the next token. Does not shrink the
    /// reserved capacity.
    pub fn reset(&mut self) {
        self.bytes.clear();
    }

    /// Appends a single byte, failing with [`ParserError::PbufferOverflow`]
    /// if doing so would exceed [`HTTP_MAX_HEADER_SIZE`].
    pub fn push(&mut self, byte: u8) -> Result<()> {
        if self.bytes.len() >= HTTP_MAX_HEADER_SIZE {
            return Err(ParserError::PbufferOverflow);
        }
        self.bytes.push(byte);
        Ok(())
    }
}

impl Default for ScratchBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_reset() {
        let mut s = ScratchBuffer::new();
        s.push(b'G').unwrap();
        s.push(b'E').unwrap();
        s.push(b'T').unwrap();
        assert_eq!(s.as_slice(), b"GET");
        s.reset();
        assert!(s.is_empty());
    }

    #[test]
    fn overflow_is_an_error_not_a_truncation() {
        let mut s = ScratchBuffer::new();
        for _ in 0..HTTP_MAX_HEADER_SIZE {
            s.push(b'a').unwrap();
        }
        assert_eq!(s.len(), HTTP_MAX_HEADER_SIZE);
        let err = s.push(b'a').unwrap_err();
        assert_eq!(err, ParserError::PbufferOverflow);
        // The buffer is not silently truncated: the last good content is
        // still there.
        assert_eq!(s.len(), HTTP_MAX_HEADER_SIZE);
    }
}

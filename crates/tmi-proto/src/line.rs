//! Line-based codec for tokio.
//!
//! Reads and writes CRLF-terminated lines. Oversized and non-UTF-8
//! lines are consumed from the buffer before the error is returned, so
//! a caller can log the error and keep decoding; a bad line never
//! forces the connection down.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};

/// Maximum accepted line length in bytes, excluding the CRLF
/// terminator (2048 including it).
pub const MAX_LINE_LEN: usize = 2046;

/// Codec for newline-terminated IRC lines.
pub struct LineCodec {
    /// Index of the next byte to check for a newline.
    next_index: usize,
    /// Maximum line length, excluding the terminator.
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with the default [`MAX_LINE_LEN`] limit.
    pub fn new() -> Self {
        Self {
            next_index: 0,
            max_len: MAX_LINE_LEN,
        }
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
            // No complete line yet, remember where the scan stopped.
            self.next_index = src.len();
            return Ok(None);
        };

        // Extract through the newline; the line no longer counts
        // against the buffer even if it turns out to be bad.
        let line = src.split_to(self.next_index + offset + 1);
        self.next_index = 0;

        let mut end = line.len();
        while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
            end -= 1;
        }

        if end > self.max_len {
            return Err(ProtocolError::LineTooLong {
                actual: end,
                limit: self.max_len,
            });
        }

        let text = String::from_utf8(line[..end].to_vec())?;
        Ok(Some(text))
    }
}

impl Encoder<&str> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: &str, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

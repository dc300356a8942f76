//! Length-prefixed message framing.
//!
//! Every GRAIL message travels as `[length: u32 big-endian][length bytes]`.
//! The decoder accumulates stream bytes in a caller-owned buffer and slices
//! out whole frames as they complete; a malformed payload never
//! desynchronizes the stream because the next frame always starts at
//! `length + 4`.

use bytes::{Bytes, BytesMut};

use crate::error::WireError;

/// Width of the frame length prefix in bytes.
pub const LEN_PREFIX_SIZE: usize = 4;

/// Default maximum frame size (16 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Frame decoder for parsing incoming frames
#[derive(Debug)]
pub struct FrameDecoder {
    max_frame_size: usize,
}

impl FrameDecoder {
    /// Create a new frame decoder with the default size limit
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Create a frame decoder with a custom size limit
    #[must_use]
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    /// Length of the frame at the head of `buf`, prefix included, if the
    /// prefix itself has arrived.
    fn head_len(buf: &[u8]) -> Option<usize> {
        if buf.len() < LEN_PREFIX_SIZE {
            return None;
        }
        let body_len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        Some(LEN_PREFIX_SIZE + body_len)
    }

    /// Returns true if `buf` starts with a complete frame.
    pub fn frame_ready(&self, buf: &[u8]) -> Result<bool, WireError> {
        match Self::head_len(buf) {
            None => Ok(false),
            Some(frame_len) => {
                if frame_len - LEN_PREFIX_SIZE > self.max_frame_size {
                    return Err(WireError::Size(frame_len - LEN_PREFIX_SIZE));
                }
                Ok(buf.len() >= frame_len)
            }
        }
    }

    /// Decode one frame from a buffer.
    ///
    /// Returns `Ok(None)` until a whole frame has accumulated. The returned
    /// bytes include the 4-byte length prefix; decoders expect to read the
    /// length first.
    pub fn decode(&self, buf: &mut BytesMut) -> Result<Option<Bytes>, WireError> {
        if !self.frame_ready(buf)? {
            return Ok(None);
        }
        let frame_len = Self::head_len(buf).expect("frame_ready checked the prefix");
        Ok(Some(buf.split_to(frame_len).freeze()))
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

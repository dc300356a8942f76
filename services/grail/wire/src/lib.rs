//! Endian-aware buffer codec and message framing for the GRAIL platform.
//!
//! This crate provides the byte-level foundation shared by every GRAIL
//! protocol: network-order primitive conversion, an append-only writer and
//! a cursor-based reader over byte buffers, and the length-prefixed frame
//! decoder that turns a byte stream into discrete messages.
//!
//! ## Wire format
//!
//! ```text
//! +----------------------+----------------------------+
//! | u32 frame_len        | length of bytes that follow|
//! +----------------------+----------------------------+
//! | u8 message type      | protocol-specific tag      |
//! +----------------------+----------------------------+
//! | body                 | variable (0..N)            |
//! +----------------------+----------------------------+
//! ```
//!
//! All multi-byte values are big-endian. Strings are UTF-16 code units in
//! network byte order; size prefixes count raw bytes, not code units.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod endian;
pub mod error;
pub mod frame;

// Re-export main types
pub use buffer::{NetReader, NetWriter};
pub use endian::{is_little_endian, Wire};
pub use error::WireError;
pub use frame::{FrameDecoder, DEFAULT_MAX_FRAME_SIZE, LEN_PREFIX_SIZE};

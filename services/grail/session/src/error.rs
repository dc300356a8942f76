//! Transport error types.

use grail_proto::ProtocolId;
use thiserror::Error;

/// Errors surfaced by the framed stream reader and sender.
///
/// Protocol-decode failures are deliberately absent: a malformed message
/// body decodes to an empty record and the stream stays usable, because
/// framing alone delimits messages.
#[derive(Error, Debug)]
pub enum TransportError {
    /// EOF or remote shutdown
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// OS-level I/O failure on the stream
    #[error("stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// A send could not complete within the configured timeout
    #[error("send would block: stream temporarily unavailable")]
    TemporarilyUnavailable,

    /// An incoming frame exceeds the configured size limit
    #[error("frame size limit exceeded: {0}")]
    FrameTooLarge(usize),

    /// The peer's handshake did not match the expected protocol
    #[error("handshake mismatch: expected \"{expected}\"")]
    HandshakeFailed {
        /// The protocol this endpoint speaks.
        expected: ProtocolId,
    },
}

impl From<grail_wire::WireError> for TransportError {
    fn from(err: grail_wire::WireError) -> Self {
        match err {
            grail_wire::WireError::Size(size) => TransportError::FrameTooLarge(size),
        }
    }
}

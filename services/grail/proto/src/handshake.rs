//! Handshake frames opening every GRAIL connection.
//!
//! A handshake frame is `[len: u32][protocol string, ASCII][version: u8]
//! [extension: u8]` with `len = ascii length + 2`, so handshakes flow
//! through the same framing reader as every other message. Each endpoint
//! sends its handshake first; a mismatch closes the connection.

use std::fmt;

use bytes::Bytes;
use grail_wire::{NetWriter, LEN_PREFIX_SIZE};

/// Current handshake version. Both sides must send zero.
pub const HANDSHAKE_VERSION: u8 = 0;

/// Identifies one of the three GRAIL TCP protocols (the world model speaks
/// two sub-protocols with distinct protocol strings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolId {
    /// Sensor -> aggregator.
    Sensor,
    /// Aggregator <-> solver.
    Solver,
    /// Client <-> world model.
    Client,
    /// Solver <-> world model.
    WorldModel,
}

impl ProtocolId {
    /// The literal ASCII protocol string sent in the handshake.
    #[must_use]
    pub const fn protocol_string(self) -> &'static str {
        match self {
            Self::Sensor => "GRAIL sensor protocol",
            Self::Solver => "GRAIL solver protocol",
            Self::Client => "GRAIL client protocol",
            Self::WorldModel => "GRAIL world model protocol",
        }
    }

    /// Encodes the handshake frame for this protocol.
    #[must_use]
    pub fn encode_handshake(self) -> Bytes {
        let ascii = self.protocol_string().as_bytes();
        let mut w = NetWriter::with_capacity(LEN_PREFIX_SIZE + ascii.len() + 2);
        w.append((ascii.len() + 2) as u32);
        w.append_bytes(ascii);
        w.append(HANDSHAKE_VERSION);
        w.append(0u8); // extension
        w.freeze()
    }

    /// Decodes a handshake frame, returning the protocol together with the
    /// peer's version and extension bytes. Returns `None` when the length
    /// prefix is inconsistent or the protocol string is unknown.
    #[must_use]
    pub fn decode_handshake(frame: &[u8]) -> Option<(ProtocolId, u8, u8)> {
        if frame.len() < LEN_PREFIX_SIZE + 3 {
            return None;
        }
        let total = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
        if frame.len() != total + LEN_PREFIX_SIZE {
            return None;
        }
        let ascii = &frame[LEN_PREFIX_SIZE..frame.len() - 2];
        let protocol = [
            Self::Sensor,
            Self::Solver,
            Self::Client,
            Self::WorldModel,
        ]
        .into_iter()
        .find(|p| p.protocol_string().as_bytes() == ascii)?;
        let version = frame[frame.len() - 2];
        let extension = frame[frame.len() - 1];
        Some((protocol, version, extension))
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.protocol_string())
    }
}

//! Framed stream I/O for GRAIL connections.
//!
//! This crate turns a byte stream into a sequence of whole GRAIL messages
//! and back: the [`MessageReceiver`] reassembles length-prefixed frames
//! from partial reads, the [`MessageSender`] serializes writes, and the
//! handshake helpers open a connection in one of the platform's protocols.
//! One receiver and one sender own a connection's two stream halves; all
//! access is serialized internally, so either may be shared across tasks.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod handshake;
pub mod keepalive;
pub mod receiver;
pub mod sender;
pub mod transport;

pub use config::SessionConfig;
pub use error::TransportError;
pub use handshake::exchange_handshake;
pub use keepalive::KeepaliveTimer;
pub use receiver::{CancelFlag, MessageReceiver};
pub use sender::MessageSender;

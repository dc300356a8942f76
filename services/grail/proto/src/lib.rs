//! Message vocabularies for the three GRAIL wire protocols.
//!
//! GRAIL connects sensor aggregators, solvers, and a world model over three
//! structurally similar TCP protocols. All of them share one framing
//! convention, `[len: u32][type: u8][body]` with `len` counting from the
//! type byte onward, and all begin a connection with a handshake exchange.
//!
//! - [`sensor`]: sensor -> aggregator samples (the one tagless frame).
//! - [`aggregator`]: aggregator <-> solver subscriptions and samples.
//! - [`world_model`]: the client and solver vocabularies of the world model.
//!
//! Decoding never fails with an error: a malformed frame decodes to `None`
//! (or to a record with `valid == false` for samples) and the stream stays
//! usable, because framing alone delimits messages. Encoders never fail.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregator;
pub mod alias;
mod codec;
pub mod handshake;
pub mod sensor;
pub mod world_model;

pub use alias::{AliasTable, OriginPreferences, TicketDispenser, TypeRegistry};
pub use handshake::ProtocolId;

//! Shared data model for the GRAIL platform.
//!
//! These are the value types carried by every GRAIL protocol: the 128-bit
//! transmitter/receiver identifier, GRAIL timestamps, UTF-16 strings, radio
//! samples, world-model attributes, and sample subscriptions. The types here
//! carry no identity; codecs create them on decode and consume them on
//! encode.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attribute;
pub mod sample;
pub mod subscription;
pub mod time;
pub mod uint128;
pub mod uri;

// Re-export main types
pub use attribute::{AliasedAttribute, AliasedWorldData, Attribute, WorldData};
pub use sample::{DevicePosition, SampleData};
pub use subscription::{Rule, Subscription, Transmitter, TxMask};
pub use time::{now_grail_time, GrailTime, MAX_GRAIL_TIME};
pub use uint128::{ReceiverId, TransmitterId, Uint128};
pub use uri::{U16String, Uri};

//! Radio-layer observation records.

use crate::time::GrailTime;
use crate::uint128::{ReceiverId, TransmitterId};
use crate::uri::Uri;

/// One observation of a transmitter by a receiver.
///
/// `rx_timestamp` is GRAIL time. `sense_data` is opaque to the codec and
/// its length is inferred from the frame length. `valid` is a decoder
/// output: false when the frame failed the length/type gate or the body was
/// truncated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleData {
    /// Physical layer the observation was made on.
    pub physical_layer: u8,
    /// Observed transmitter.
    pub tx_id: TransmitterId,
    /// Observing receiver.
    pub rx_id: ReceiverId,
    /// Reception time in GRAIL time.
    pub rx_timestamp: GrailTime,
    /// Received signal strength.
    pub rss: f32,
    /// Raw sensed payload, opaque to the codec.
    pub sense_data: Vec<u8>,
    /// False when decoding failed; encoders ignore this field.
    pub valid: bool,
}

/// Reported position of a device within a region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DevicePosition {
    /// Physical layer the device lives on.
    pub physical_layer: u8,
    /// Device identifier.
    pub device_id: TransmitterId,
    /// X coordinate within the region.
    pub x: f32,
    /// Y coordinate within the region.
    pub y: f32,
    /// Z coordinate within the region.
    pub z: f32,
    /// URI of the region the coordinates are relative to.
    pub region_uri: Uri,
    /// False when decoding failed; encoders ignore this field.
    pub valid: bool,
}

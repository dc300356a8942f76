//! Sensor -> aggregator protocol.
//!
//! After the handshake there is exactly one message kind: a sample frame
//! with no type byte. The frame body is the sample record itself, and the
//! sense-data length is whatever remains of the frame after the fixed
//! fields.

use bytes::Bytes;
use grail_types::SampleData;
use grail_wire::{NetReader, NetWriter, LEN_PREFIX_SIZE};

/// Encodes a sample as a sensor frame. The `valid` field is not encoded.
#[must_use]
pub fn encode_sample(sample: &SampleData) -> Bytes {
    let mut w = NetWriter::with_capacity(LEN_PREFIX_SIZE + 45 + sample.sense_data.len());
    w.append(0u32);
    w.append(sample.physical_layer);
    w.append(sample.tx_id);
    w.append(sample.rx_id);
    w.append(sample.rx_timestamp);
    w.append(sample.rss);
    w.append_bytes(&sample.sense_data);
    let total = (w.len() - LEN_PREFIX_SIZE) as u32;
    w.overwrite(total, 0);
    w.freeze()
}

/// Decodes a sensor sample frame. On a length mismatch or truncated body
/// the returned record has `valid == false` and zeroed fields.
#[must_use]
pub fn decode_sample(frame: &[u8]) -> SampleData {
    let mut sample = SampleData::default();
    let mut r = NetReader::new(frame);
    let total = r.read::<u32>() as usize;
    if !r.is_ok() || frame.len() != total + LEN_PREFIX_SIZE {
        return sample;
    }
    sample.physical_layer = r.read();
    sample.tx_id = r.read();
    sample.rx_id = r.read();
    sample.rx_timestamp = r.read();
    sample.rss = r.read();
    sample.sense_data = r.read_bytes(r.remaining());
    sample.valid = r.is_ok();
    if !sample.valid {
        return SampleData::default();
    }
    sample
}

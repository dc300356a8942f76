//! Aggregator <-> solver protocol.
//!
//! A solver subscribes to a set of rules and the aggregator answers with
//! matching samples until the connection closes or a new subscription is
//! issued. The `subscription_response` echoes the subscription the
//! aggregator is actually honoring, which may be a subset of the request.

use bytes::Bytes;
use grail_types::{DevicePosition, Rule, SampleData, Subscription, TxMask};
use grail_wire::{NetReader, NetWriter};

use crate::codec::{encode_frame, frame_tag, open_frame, read_utf16_to_end};

/// Message tags of the aggregator-solver protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageId {
    /// Liveness probe, empty body.
    KeepAlive = 0,
    /// Opaque certificate payload.
    Certificate = 1,
    /// Opaque certificate acknowledgement. There is no denial message;
    /// denial is indicated by closing the connection.
    AckCertificate = 2,
    /// Solver -> aggregator subscription.
    SubscriptionRequest = 3,
    /// Aggregator -> solver echo of the honored subscription.
    SubscriptionResponse = 4,
    /// Reported device position.
    DevicePosition = 5,
    /// A sample matching the subscription.
    ServerSample = 6,
    /// The aggregator dropped samples; empty body.
    BufferOverrun = 7,
}

impl TryFrom<u8> for MessageId {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageId::KeepAlive),
            1 => Ok(MessageId::Certificate),
            2 => Ok(MessageId::AckCertificate),
            3 => Ok(MessageId::SubscriptionRequest),
            4 => Ok(MessageId::SubscriptionResponse),
            5 => Ok(MessageId::DevicePosition),
            6 => Ok(MessageId::ServerSample),
            7 => Ok(MessageId::BufferOverrun),
            other => Err(other),
        }
    }
}

/// One aggregator-solver message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Liveness probe.
    KeepAlive,
    /// Certificate payload, opaque at this layer.
    Certificate(Vec<u8>),
    /// Certificate acknowledgement, opaque at this layer.
    AckCertificate(Vec<u8>),
    /// Subscription requested by a solver.
    SubscriptionRequest(Subscription),
    /// Subscription the aggregator is honoring.
    SubscriptionResponse(Subscription),
    /// Position report for a device.
    DevicePosition(DevicePosition),
    /// A matching sample.
    ServerSample(SampleData),
    /// Samples were dropped.
    BufferOverrun,
}

impl Message {
    /// The tag this message carries on the wire.
    #[must_use]
    pub fn id(&self) -> MessageId {
        match self {
            Message::KeepAlive => MessageId::KeepAlive,
            Message::Certificate(_) => MessageId::Certificate,
            Message::AckCertificate(_) => MessageId::AckCertificate,
            Message::SubscriptionRequest(_) => MessageId::SubscriptionRequest,
            Message::SubscriptionResponse(_) => MessageId::SubscriptionResponse,
            Message::DevicePosition(_) => MessageId::DevicePosition,
            Message::ServerSample(_) => MessageId::ServerSample,
            Message::BufferOverrun => MessageId::BufferOverrun,
        }
    }

    /// Encodes the message as one frame.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let tag = self.id() as u8;
        match self {
            Message::KeepAlive | Message::BufferOverrun => encode_frame(tag, |_| {}),
            Message::Certificate(payload) | Message::AckCertificate(payload) => {
                encode_frame(tag, |w| {
                    w.append_bytes(payload);
                })
            }
            Message::SubscriptionRequest(sub) | Message::SubscriptionResponse(sub) => {
                encode_frame(tag, |w| write_subscription(w, sub))
            }
            Message::DevicePosition(position) => encode_frame(tag, |w| {
                w.append(position.physical_layer);
                w.append(position.device_id);
                w.append(position.x);
                w.append(position.y);
                w.append(position.z);
                w.append_utf16(position.region_uri.units());
            }),
            Message::ServerSample(sample) => encode_frame(tag, |w| {
                w.append(sample.physical_layer);
                w.append(sample.tx_id);
                w.append(sample.rx_id);
                w.append(sample.rx_timestamp);
                w.append(sample.rss);
                w.append_bytes(&sample.sense_data);
            }),
        }
    }

    /// Decodes one frame, dispatching on the tag. Returns `None` for an
    /// unknown tag, a length mismatch, or a body that does not parse.
    #[must_use]
    pub fn decode(frame: &[u8]) -> Option<Message> {
        let id = MessageId::try_from(frame_tag(frame)?).ok()?;
        match id {
            MessageId::KeepAlive => {
                open_frame(frame, id as u8)?;
                Some(Message::KeepAlive)
            }
            MessageId::BufferOverrun => {
                open_frame(frame, id as u8)?;
                Some(Message::BufferOverrun)
            }
            MessageId::Certificate => {
                let mut r = open_frame(frame, id as u8)?;
                let payload = r.read_bytes(r.remaining());
                r.is_ok().then_some(Message::Certificate(payload))
            }
            MessageId::AckCertificate => {
                let mut r = open_frame(frame, id as u8)?;
                let payload = r.read_bytes(r.remaining());
                r.is_ok().then_some(Message::AckCertificate(payload))
            }
            MessageId::SubscriptionRequest => {
                decode_subscription(frame, MessageId::SubscriptionRequest)
                    .map(Message::SubscriptionRequest)
            }
            MessageId::SubscriptionResponse => {
                decode_subscription(frame, MessageId::SubscriptionResponse)
                    .map(Message::SubscriptionResponse)
            }
            MessageId::DevicePosition => {
                let position = decode_device_position(frame);
                position.valid.then_some(Message::DevicePosition(position))
            }
            MessageId::ServerSample => {
                let sample = decode_server_sample(frame);
                sample.valid.then_some(Message::ServerSample(sample))
            }
        }
    }
}

fn write_subscription(w: &mut NetWriter, sub: &Subscription) {
    w.append(sub.rules.len() as u32);
    for rule in &sub.rules {
        w.append(rule.physical_layer);
        w.append(rule.txers.len() as u32);
        for txer in &rule.txers {
            w.append(txer.base_id);
            w.append(txer.mask);
        }
        w.append(rule.update_interval);
    }
}

fn read_subscription(r: &mut NetReader<'_>) -> Subscription {
    let mut sub = Subscription::default();
    let num_rules = r.read::<u32>();
    for _ in 0..num_rules {
        if !r.is_ok() {
            break;
        }
        let mut rule = Rule {
            physical_layer: r.read(),
            ..Rule::default()
        };
        let num_txers = r.read::<u32>();
        for _ in 0..num_txers {
            if !r.is_ok() {
                break;
            }
            rule.txers.push(TxMask {
                base_id: r.read(),
                mask: r.read(),
            });
        }
        rule.update_interval = r.read();
        sub.rules.push(rule);
    }
    sub
}

/// Decodes a subscription frame. Request and response share the body shape;
/// `expected` selects which tag the frame must carry.
#[must_use]
pub fn decode_subscription(frame: &[u8], expected: MessageId) -> Option<Subscription> {
    debug_assert!(matches!(
        expected,
        MessageId::SubscriptionRequest | MessageId::SubscriptionResponse
    ));
    let mut r = open_frame(frame, expected as u8)?;
    let sub = read_subscription(&mut r);
    r.is_ok().then_some(sub)
}

/// Decodes a `server_sample` frame. On a gate failure or truncated body the
/// returned record has `valid == false` and zeroed fields.
#[must_use]
pub fn decode_server_sample(frame: &[u8]) -> SampleData {
    let mut sample = SampleData::default();
    let Some(mut r) = open_frame(frame, MessageId::ServerSample as u8) else {
        return sample;
    };
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

/// Decodes a `device_position` frame; `valid == false` on failure.
#[must_use]
pub fn decode_device_position(frame: &[u8]) -> DevicePosition {
    let mut position = DevicePosition::default();
    let Some(mut r) = open_frame(frame, MessageId::DevicePosition as u8) else {
        return position;
    };
    position.physical_layer = r.read();
    position.device_id = r.read();
    position.x = r.read();
    position.y = r.read();
    position.z = r.read();
    let Some(region) = read_utf16_to_end(&mut r) else {
        return DevicePosition::default();
    };
    position.region_uri = region;
    position.valid = r.is_ok();
    if !position.valid {
        return DevicePosition::default();
    }
    position
}

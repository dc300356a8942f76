//! Client <-> world-model protocol.
//!
//! Clients query the world model three ways: a snapshot of the state at a
//! point in time, a range of attribute events, or a live stream at a
//! requested cadence. Tickets chosen by the client correlate requests with
//! data and completion messages; attribute names and origins are compressed
//! with per-connection aliases announced by the world model.

use bytes::Bytes;
use grail_types::{AliasedAttribute, AliasedWorldData, GrailTime, U16String, Uri};
use grail_wire::NetWriter;

use crate::codec::{
    encode_frame, frame_tag, open_frame, read_sized_u16string, read_sized_uri,
    read_utf16_to_end,
};

/// Message tags of the client protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageId {
    /// Liveness probe, empty body.
    KeepAlive = 0,
    /// State of matching objects at a point in time.
    SnapshotRequest = 1,
    /// All attribute events with creation dates in a range.
    RangeRequest = 2,
    /// Live updates at a requested cadence.
    StreamRequest = 3,
    /// Alias definitions for attribute names.
    AttributeAlias = 4,
    /// Alias definitions for origin strings.
    OriginAlias = 5,
    /// No more data will be sent for a ticket.
    RequestComplete = 6,
    /// Cancels an ongoing request.
    CancelRequest = 7,
    /// Data for one object under one ticket.
    DataResponse = 8,
    /// Regex search over object URIs.
    UriSearch = 9,
    /// URIs matching a search.
    UriResponse = 10,
    /// Client preferences between origins.
    OriginPreference = 11,
}

impl TryFrom<u8> for MessageId {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageId::KeepAlive),
            1 => Ok(MessageId::SnapshotRequest),
            2 => Ok(MessageId::RangeRequest),
            3 => Ok(MessageId::StreamRequest),
            4 => Ok(MessageId::AttributeAlias),
            5 => Ok(MessageId::OriginAlias),
            6 => Ok(MessageId::RequestComplete),
            7 => Ok(MessageId::CancelRequest),
            8 => Ok(MessageId::DataResponse),
            9 => Ok(MessageId::UriSearch),
            10 => Ok(MessageId::UriResponse),
            11 => Ok(MessageId::OriginPreference),
            other => Err(other),
        }
    }
}

/// What a client asks the world model for.
///
/// `object_uri` is a regex pattern over URIs. For stream requests
/// `stop_period` is an update interval in milliseconds; for snapshots and
/// ranges it is an end timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Regex pattern selecting object URIs.
    pub object_uri: Uri,
    /// Attribute names (or patterns) of interest.
    pub attributes: Vec<U16String>,
    /// Start of the time range.
    pub start: GrailTime,
    /// End timestamp, or update period for streams.
    pub stop_period: GrailTime,
}

/// Binds a `u32` alias to a string for the lifetime of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasDefinition {
    /// The alias.
    pub alias: u32,
    /// The string it stands for.
    pub name: U16String,
}

/// An origin name and the client's preference weight for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginWeight {
    /// Origin string.
    pub origin: U16String,
    /// Preference weight; 1 is the default, negative means never return.
    pub weight: i32,
}

/// One client-protocol message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Liveness probe.
    KeepAlive,
    /// Snapshot query.
    SnapshotRequest {
        /// Ticket correlating the reply stream.
        ticket: u32,
        /// The query.
        request: Request,
    },
    /// Range query.
    RangeRequest {
        /// Ticket correlating the reply stream.
        ticket: u32,
        /// The query.
        request: Request,
    },
    /// Streaming query.
    StreamRequest {
        /// Ticket correlating the reply stream.
        ticket: u32,
        /// The query.
        request: Request,
    },
    /// Attribute-name alias announcements.
    AttributeAlias(Vec<AliasDefinition>),
    /// Origin alias announcements.
    OriginAlias(Vec<AliasDefinition>),
    /// The world model finished answering a ticket.
    RequestComplete {
        /// The finished ticket.
        ticket: u32,
    },
    /// The client cancels a ticket; a `request_complete` follows.
    CancelRequest {
        /// The cancelled ticket.
        ticket: u32,
    },
    /// Data for one object.
    DataResponse {
        /// Ticket the data answers.
        ticket: u32,
        /// The object and its alias-compressed attributes.
        data: AliasedWorldData,
    },
    /// Regex search over URIs.
    UriSearch(Uri),
    /// Search results.
    UriResponse(Vec<Uri>),
    /// Origin preference weights. Applies to snapshot and stream requests
    /// only; range requests return all origins.
    OriginPreference(Vec<OriginWeight>),
}

impl Message {
    /// The tag this message carries on the wire.
    #[must_use]
    pub fn id(&self) -> MessageId {
        match self {
            Message::KeepAlive => MessageId::KeepAlive,
            Message::SnapshotRequest { .. } => MessageId::SnapshotRequest,
            Message::RangeRequest { .. } => MessageId::RangeRequest,
            Message::StreamRequest { .. } => MessageId::StreamRequest,
            Message::AttributeAlias(_) => MessageId::AttributeAlias,
            Message::OriginAlias(_) => MessageId::OriginAlias,
            Message::RequestComplete { .. } => MessageId::RequestComplete,
            Message::CancelRequest { .. } => MessageId::CancelRequest,
            Message::DataResponse { .. } => MessageId::DataResponse,
            Message::UriSearch(_) => MessageId::UriSearch,
            Message::UriResponse(_) => MessageId::UriResponse,
            Message::OriginPreference(_) => MessageId::OriginPreference,
        }
    }

    /// Encodes the message as one frame.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let tag = self.id() as u8;
        match self {
            Message::KeepAlive => encode_frame(tag, |_| {}),
            Message::SnapshotRequest { ticket, request }
            | Message::RangeRequest { ticket, request }
            | Message::StreamRequest { ticket, request } => encode_frame(tag, |w| {
                write_request(w, *ticket, request);
            }),
            Message::AttributeAlias(aliases) | Message::OriginAlias(aliases) => {
                encode_frame(tag, |w| {
                    w.append(aliases.len() as u32);
                    for alias in aliases {
                        w.append(alias.alias);
                        w.append_sized_utf16(alias.name.units());
                    }
                })
            }
            Message::RequestComplete { ticket } | Message::CancelRequest { ticket } => {
                encode_frame(tag, |w| {
                    w.append(*ticket);
                })
            }
            Message::DataResponse { ticket, data } => encode_frame(tag, |w| {
                w.append_sized_utf16(data.object_uri.units());
                w.append(*ticket);
                w.append(data.attributes.len() as u32);
                for attr in &data.attributes {
                    w.append(attr.name_alias);
                    w.append(attr.creation_date);
                    w.append(attr.expiration_date);
                    w.append(attr.origin_alias);
                    w.append_sized_bytes(&attr.data);
                }
            }),
            Message::UriSearch(pattern) => encode_frame(tag, |w| {
                w.append_utf16(pattern.units());
            }),
            Message::UriResponse(uris) => encode_frame(tag, |w| {
                for uri in uris {
                    w.append_sized_utf16(uri.units());
                }
            }),
            Message::OriginPreference(weights) => encode_frame(tag, |w| {
                for entry in weights {
                    w.append_sized_utf16(entry.origin.units());
                    w.append(entry.weight);
                }
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
            MessageId::SnapshotRequest => decode_request(frame, id)
                .map(|(ticket, request)| Message::SnapshotRequest { ticket, request }),
            MessageId::RangeRequest => decode_request(frame, id)
                .map(|(ticket, request)| Message::RangeRequest { ticket, request }),
            MessageId::StreamRequest => decode_request(frame, id)
                .map(|(ticket, request)| Message::StreamRequest { ticket, request }),
            MessageId::AttributeAlias => {
                decode_aliases(frame, id).map(Message::AttributeAlias)
            }
            MessageId::OriginAlias => decode_aliases(frame, id).map(Message::OriginAlias),
            MessageId::RequestComplete => {
                let mut r = open_frame(frame, id as u8)?;
                let ticket = r.read();
                r.is_ok().then_some(Message::RequestComplete { ticket })
            }
            MessageId::CancelRequest => {
                let mut r = open_frame(frame, id as u8)?;
                let ticket = r.read();
                r.is_ok().then_some(Message::CancelRequest { ticket })
            }
            MessageId::DataResponse => {
                let mut r = open_frame(frame, id as u8)?;
                let mut data = AliasedWorldData {
                    object_uri: read_sized_uri(&mut r),
                    attributes: Vec::new(),
                };
                let ticket = r.read::<u32>();
                let num_attrs = r.read::<u32>();
                for _ in 0..num_attrs {
                    if !r.is_ok() {
                        break;
                    }
                    data.attributes.push(AliasedAttribute {
                        name_alias: r.read(),
                        creation_date: r.read(),
                        expiration_date: r.read(),
                        origin_alias: r.read(),
                        data: r.read_sized_bytes(),
                    });
                }
                r.is_ok().then_some(Message::DataResponse { ticket, data })
            }
            MessageId::UriSearch => {
                let mut r = open_frame(frame, id as u8)?;
                let pattern = read_utf16_to_end(&mut r)?;
                r.is_ok().then_some(Message::UriSearch(pattern))
            }
            MessageId::UriResponse => {
                let mut r = open_frame(frame, id as u8)?;
                let mut uris = Vec::new();
                // The count is implicit in the remaining length.
                while r.is_ok() && r.remaining() > 0 {
                    uris.push(read_sized_uri(&mut r));
                }
                r.is_ok().then_some(Message::UriResponse(uris))
            }
            MessageId::OriginPreference => {
                let mut r = open_frame(frame, id as u8)?;
                let mut weights = Vec::new();
                while r.is_ok() && r.remaining() > 0 {
                    weights.push(OriginWeight {
                        origin: read_sized_u16string(&mut r),
                        weight: r.read(),
                    });
                }
                r.is_ok().then_some(Message::OriginPreference(weights))
            }
        }
    }
}

fn write_request(w: &mut NetWriter, ticket: u32, request: &Request) {
    w.append(ticket);
    w.append_sized_utf16(request.object_uri.units());
    w.append(request.attributes.len() as u32);
    for attr in &request.attributes {
        w.append_sized_utf16(attr.units());
    }
    w.append(request.start);
    w.append(request.stop_period);
}

// Snapshot, range, and stream requests share this body; only the tag
// differs.
fn decode_request(frame: &[u8], expected: MessageId) -> Option<(u32, Request)> {
    let mut r = open_frame(frame, expected as u8)?;
    let ticket = r.read::<u32>();
    let mut request = Request {
        object_uri: read_sized_uri(&mut r),
        ..Request::default()
    };
    let num_attrs = r.read::<u32>();
    for _ in 0..num_attrs {
        if !r.is_ok() {
            break;
        }
        request.attributes.push(read_sized_u16string(&mut r));
    }
    request.start = r.read();
    request.stop_period = r.read();
    r.is_ok().then_some((ticket, request))
}

// Attribute and origin alias messages share this body; only the tag
// differs.
fn decode_aliases(frame: &[u8], expected: MessageId) -> Option<Vec<AliasDefinition>> {
    let mut r = open_frame(frame, expected as u8)?;
    let num_aliases = r.read::<u32>();
    let mut aliases = Vec::new();
    for _ in 0..num_aliases {
        if !r.is_ok() {
            break;
        }
        aliases.push(AliasDefinition {
            alias: r.read(),
            name: read_sized_u16string(&mut r),
        });
    }
    r.is_ok().then_some(aliases)
}

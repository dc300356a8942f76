//! Solver <-> world-model protocol.
//!
//! A solver announces the attribute types it can produce (each with a
//! per-connection alias and an on-demand flag), then pushes solution data.
//! The world model gates on-demand types with `start_on_demand` and
//! `stop_on_demand` so that data flows only while some client wants it.
//! Solvers may also create, expire, and delete URIs and attributes.

use bytes::Bytes;
use grail_types::{GrailTime, U16String, Uri};

use crate::codec::{
    encode_frame, frame_tag, open_frame, read_sized_u16string, read_sized_uri,
    read_utf16_to_end,
};

/// Message tags of the solver protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageId {
    /// Liveness probe, empty body.
    KeepAlive = 0,
    /// Announces attribute types and their aliases.
    TypeAnnounce = 1,
    /// A client now wants data of these on-demand types.
    StartOnDemand = 2,
    /// No client wants these on-demand types anymore.
    StopOnDemand = 3,
    /// Solution data modifying attributes.
    SolverData = 4,
    /// Creates a URI in the world model.
    CreateUri = 5,
    /// Expires a URI at a point in time.
    ExpireUri = 6,
    /// Removes a URI for all time periods.
    DeleteUri = 7,
    /// Expires one attribute of a URI.
    ExpireAttribute = 8,
    /// Removes one attribute of a URI for all time periods.
    DeleteAttribute = 9,
}

impl TryFrom<u8> for MessageId {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageId::KeepAlive),
            1 => Ok(MessageId::TypeAnnounce),
            2 => Ok(MessageId::StartOnDemand),
            3 => Ok(MessageId::StopOnDemand),
            4 => Ok(MessageId::SolverData),
            5 => Ok(MessageId::CreateUri),
            6 => Ok(MessageId::ExpireUri),
            7 => Ok(MessageId::DeleteUri),
            8 => Ok(MessageId::ExpireAttribute),
            9 => Ok(MessageId::DeleteAttribute),
            other => Err(other),
        }
    }
}

/// A type alias announced by a solver. Unlike the client protocol's alias
/// definitions, this carries the on-demand flag: data of an on-demand type
/// flows only while a matching client request is active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeAlias {
    /// The alias used to refer to this type.
    pub alias: u32,
    /// The attribute type name.
    pub name: U16String,
    /// True if production is gated on client demand.
    pub on_demand: bool,
}

/// One on-demand activation: a type alias and the URI patterns clients
/// asked about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnDemandRequest {
    /// The announced type alias.
    pub type_alias: u32,
    /// Regex patterns over attribute names/URIs the clients requested.
    pub patterns: Vec<U16String>,
}

/// One solution produced by a solver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionData {
    /// Alias naming the solution's type.
    pub type_alias: u32,
    /// When the solution was created.
    pub time: GrailTime,
    /// The URI to modify.
    pub target: Uri,
    /// Raw attribute payload.
    pub data: Vec<u8>,
}

/// One solver-protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Liveness probe.
    KeepAlive,
    /// Type announcement with the solver's origin string.
    TypeAnnounce {
        /// Announced types and aliases.
        types: Vec<TypeAlias>,
        /// The solver's origin string.
        origin: U16String,
    },
    /// Clients now want these on-demand types.
    StartOnDemand(Vec<OnDemandRequest>),
    /// Clients no longer want these on-demand types.
    StopOnDemand(Vec<OnDemandRequest>),
    /// Solution data.
    SolverData {
        /// Create unknown target URIs instead of dropping the solutions.
        create_uris: bool,
        /// The solutions.
        solutions: Vec<SolutionData>,
    },
    /// Creates a URI.
    CreateUri {
        /// The new URI.
        uri: Uri,
        /// Creation time.
        creation: GrailTime,
        /// Origin performing the creation.
        origin: U16String,
    },
    /// Expires a URI.
    ExpireUri {
        /// The URI to expire.
        uri: Uri,
        /// Expiration time.
        expiration: GrailTime,
        /// Origin performing the expiration.
        origin: U16String,
    },
    /// Deletes a URI.
    DeleteUri {
        /// The URI to delete.
        uri: Uri,
        /// Origin performing the deletion.
        origin: U16String,
    },
    /// Expires one attribute of a URI.
    ExpireAttribute {
        /// The URI whose attribute expires.
        uri: Uri,
        /// The attribute name.
        attribute: U16String,
        /// Expiration time.
        expiration: GrailTime,
        /// Origin performing the expiration.
        origin: U16String,
    },
    /// Deletes one attribute of a URI.
    DeleteAttribute {
        /// The URI whose attribute is deleted.
        uri: Uri,
        /// The attribute name.
        attribute: U16String,
        /// Origin performing the deletion.
        origin: U16String,
    },
}

impl Message {
    /// The tag this message carries on the wire.
    #[must_use]
    pub fn id(&self) -> MessageId {
        match self {
            Message::KeepAlive => MessageId::KeepAlive,
            Message::TypeAnnounce { .. } => MessageId::TypeAnnounce,
            Message::StartOnDemand(_) => MessageId::StartOnDemand,
            Message::StopOnDemand(_) => MessageId::StopOnDemand,
            Message::SolverData { .. } => MessageId::SolverData,
            Message::CreateUri { .. } => MessageId::CreateUri,
            Message::ExpireUri { .. } => MessageId::ExpireUri,
            Message::DeleteUri { .. } => MessageId::DeleteUri,
            Message::ExpireAttribute { .. } => MessageId::ExpireAttribute,
            Message::DeleteAttribute { .. } => MessageId::DeleteAttribute,
        }
    }

    /// Encodes the message as one frame.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let tag = self.id() as u8;
        match self {
            Message::KeepAlive => encode_frame(tag, |_| {}),
            Message::TypeAnnounce { types, origin } => encode_frame(tag, |w| {
                w.append(types.len() as u32);
                for entry in types {
                    w.append(entry.alias);
                    w.append_sized_utf16(entry.name.units());
                    w.append(u8::from(entry.on_demand));
                }
                w.append_utf16(origin.units());
            }),
            Message::StartOnDemand(requests) | Message::StopOnDemand(requests) => {
                encode_frame(tag, |w| {
                    w.append(requests.len() as u32);
                    for request in requests {
                        w.append(request.type_alias);
                        w.append(request.patterns.len() as u32);
                        for pattern in &request.patterns {
                            w.append_sized_utf16(pattern.units());
                        }
                    }
                })
            }
            Message::SolverData {
                create_uris,
                solutions,
            } => encode_frame(tag, |w| {
                w.append(u8::from(*create_uris));
                w.append(solutions.len() as u32);
                for solution in solutions {
                    w.append(solution.type_alias);
                    w.append(solution.time);
                    w.append_sized_utf16(solution.target.units());
                    w.append_sized_bytes(&solution.data);
                }
            }),
            Message::CreateUri {
                uri,
                creation,
                origin,
            } => encode_frame(tag, |w| {
                w.append_sized_utf16(uri.units());
                w.append(*creation);
                w.append_utf16(origin.units());
            }),
            Message::ExpireUri {
                uri,
                expiration,
                origin,
            } => encode_frame(tag, |w| {
                w.append_sized_utf16(uri.units());
                w.append(*expiration);
                w.append_utf16(origin.units());
            }),
            Message::DeleteUri { uri, origin } => encode_frame(tag, |w| {
                w.append_sized_utf16(uri.units());
                w.append_utf16(origin.units());
            }),
            Message::ExpireAttribute {
                uri,
                attribute,
                expiration,
                origin,
            } => encode_frame(tag, |w| {
                w.append_sized_utf16(uri.units());
                w.append_sized_utf16(attribute.units());
                w.append(*expiration);
                w.append_utf16(origin.units());
            }),
            Message::DeleteAttribute {
                uri,
                attribute,
                origin,
            } => encode_frame(tag, |w| {
                w.append_sized_utf16(uri.units());
                w.append_sized_utf16(attribute.units());
                w.append_utf16(origin.units());
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
            MessageId::TypeAnnounce => {
                let mut r = open_frame(frame, id as u8)?;
                let num_types = r.read::<u32>();
                let mut types = Vec::new();
                for _ in 0..num_types {
                    if !r.is_ok() {
                        break;
                    }
                    types.push(TypeAlias {
                        alias: r.read(),
                        name: read_sized_u16string(&mut r),
                        on_demand: r.read::<u8>() != 0,
                    });
                }
                let origin = read_utf16_to_end(&mut r)?;
                r.is_ok().then_some(Message::TypeAnnounce { types, origin })
            }
            MessageId::StartOnDemand => {
                decode_on_demand(frame, id).map(Message::StartOnDemand)
            }
            MessageId::StopOnDemand => {
                decode_on_demand(frame, id).map(Message::StopOnDemand)
            }
            MessageId::SolverData => {
                let mut r = open_frame(frame, id as u8)?;
                let create_uris = r.read::<u8>() == 1;
                let num_solutions = r.read::<u32>();
                let mut solutions = Vec::new();
                for _ in 0..num_solutions {
                    if !r.is_ok() {
                        break;
                    }
                    solutions.push(SolutionData {
                        type_alias: r.read(),
                        time: r.read(),
                        target: read_sized_uri(&mut r),
                        data: r.read_sized_bytes(),
                    });
                }
                r.is_ok().then_some(Message::SolverData {
                    create_uris,
                    solutions,
                })
            }
            MessageId::CreateUri => {
                let mut r = open_frame(frame, id as u8)?;
                let uri = read_sized_uri(&mut r);
                let creation = r.read();
                let origin = read_utf16_to_end(&mut r)?;
                r.is_ok().then_some(Message::CreateUri {
                    uri,
                    creation,
                    origin,
                })
            }
            MessageId::ExpireUri => {
                let mut r = open_frame(frame, id as u8)?;
                let uri = read_sized_uri(&mut r);
                let expiration = r.read();
                let origin = read_utf16_to_end(&mut r)?;
                r.is_ok().then_some(Message::ExpireUri {
                    uri,
                    expiration,
                    origin,
                })
            }
            MessageId::DeleteUri => {
                let mut r = open_frame(frame, id as u8)?;
                let uri = read_sized_uri(&mut r);
                let origin = read_utf16_to_end(&mut r)?;
                r.is_ok().then_some(Message::DeleteUri { uri, origin })
            }
            MessageId::ExpireAttribute => {
                let mut r = open_frame(frame, id as u8)?;
                let uri = read_sized_uri(&mut r);
                let attribute = read_sized_u16string(&mut r);
                let expiration = r.read();
                let origin = read_utf16_to_end(&mut r)?;
                r.is_ok().then_some(Message::ExpireAttribute {
                    uri,
                    attribute,
                    expiration,
                    origin,
                })
            }
            MessageId::DeleteAttribute => {
                let mut r = open_frame(frame, id as u8)?;
                let uri = read_sized_uri(&mut r);
                let attribute = read_sized_u16string(&mut r);
                let origin = read_utf16_to_end(&mut r)?;
                r.is_ok().then_some(Message::DeleteAttribute {
                    uri,
                    attribute,
                    origin,
                })
            }
        }
    }
}

// Start and stop share this body; only the tag differs.
fn decode_on_demand(frame: &[u8], expected: MessageId) -> Option<Vec<OnDemandRequest>> {
    let mut r = open_frame(frame, expected as u8)?;
    let num_requests = r.read::<u32>();
    let mut requests = Vec::new();
    for _ in 0..num_requests {
        if !r.is_ok() {
            break;
        }
        let type_alias = r.read();
        let num_patterns = r.read::<u32>();
        let mut patterns = Vec::new();
        for _ in 0..num_patterns {
            if !r.is_ok() {
                break;
            }
            patterns.push(read_sized_u16string(&mut r));
        }
        requests.push(OnDemandRequest {
            type_alias,
            patterns,
        });
    }
    r.is_ok().then_some(requests)
}

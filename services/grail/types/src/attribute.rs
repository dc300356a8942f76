//! World-model attribute records.

use crate::time::GrailTime;
use crate::uri::{U16String, Uri};

/// A typed, timestamped value attached to a world-model object.
///
/// `expiration_date == 0` means the attribute has not been expired. The
/// codec does not enforce any relation between creation and expiration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name; names the data type of `data`.
    pub name: U16String,
    /// When the value was created.
    pub creation_date: GrailTime,
    /// When the value was expired, or 0 if it has not been.
    pub expiration_date: GrailTime,
    /// The solver or service that produced the value.
    pub origin: U16String,
    /// Raw attribute payload.
    pub data: Vec<u8>,
}

/// An [`Attribute`] with its name and origin replaced by per-connection
/// aliases, as sent on the wire for repeated transmissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasedAttribute {
    /// Alias of the attribute name.
    pub name_alias: u32,
    /// When the value was created.
    pub creation_date: GrailTime,
    /// When the value was expired, or 0 if it has not been.
    pub expiration_date: GrailTime,
    /// Alias of the origin string.
    pub origin_alias: u32,
    /// Raw attribute payload.
    pub data: Vec<u8>,
}

/// An object URI together with its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldData {
    /// The object's URI.
    pub object_uri: Uri,
    /// Attributes of the object.
    pub attributes: Vec<Attribute>,
}

/// An object URI together with alias-compressed attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasedWorldData {
    /// The object's URI.
    pub object_uri: Uri,
    /// Alias-compressed attributes of the object.
    pub attributes: Vec<AliasedAttribute>,
}

//! Shared `[len][tag][body]` framing helpers used by every protocol module.

use bytes::Bytes;
use grail_types::{U16String, Uri};
use grail_wire::{NetReader, NetWriter, LEN_PREFIX_SIZE};

/// Builds one framed message: reserves the length prefix, appends the tag,
/// lets `body` append its fields, then backpatches the length with the byte
/// count from the tag onward. Encoding never fails.
pub(crate) fn encode_frame(tag: u8, body: impl FnOnce(&mut NetWriter)) -> Bytes {
    let mut w = NetWriter::with_capacity(64);
    w.append(0u32);
    w.append(tag);
    body(&mut w);
    let total = (w.len() - LEN_PREFIX_SIZE) as u32;
    w.overwrite(total, 0);
    w.freeze()
}

/// The tag byte of a frame, if the frame is long enough to carry one.
pub(crate) fn frame_tag(frame: &[u8]) -> Option<u8> {
    frame.get(LEN_PREFIX_SIZE).copied()
}

/// Opens a frame for body decoding: reads the length prefix and tag, and
/// returns a reader positioned at the body only if the buffer length equals
/// `len + 4` and the tag is the expected one.
pub(crate) fn open_frame(frame: &[u8], expected_tag: u8) -> Option<NetReader<'_>> {
    let mut r = NetReader::new(frame);
    let total = r.read::<u32>() as usize;
    let tag = r.read::<u8>();
    if !r.is_ok() || frame.len() != total + LEN_PREFIX_SIZE || tag != expected_tag {
        return None;
    }
    Some(r)
}

/// Reads a UTF-16 string that consumes the remainder of the frame with no
/// size prefix. The remaining byte count must be even; an odd remainder is
/// a malformed frame.
pub(crate) fn read_utf16_to_end(r: &mut NetReader<'_>) -> Option<U16String> {
    let remaining = r.remaining();
    if remaining % 2 != 0 {
        return None;
    }
    Some(U16String::from_units(r.read_utf16(remaining / 2)))
}

/// Reads a size-prefixed UTF-16 string into a [`U16String`].
pub(crate) fn read_sized_u16string(r: &mut NetReader<'_>) -> U16String {
    U16String::from_units(r.read_sized_utf16())
}

/// Reads a size-prefixed UTF-16 string as a URI.
pub(crate) fn read_sized_uri(r: &mut NetReader<'_>) -> Uri {
    read_sized_u16string(r)
}

//! 128-bit unsigned identifier type.

use std::fmt;
use std::num::ParseIntError;
use std::ops::BitAnd;
use std::str::FromStr;

use grail_wire::Wire;
use serde::{Deserialize, Serialize};

/// A 128-bit unsigned integer stored as a pair of 64-bit words.
///
/// Ordering is lexicographic on `upper`, then `lower`, which matches the
/// numeric order of the full 128-bit value. On the wire it is 16 bytes in
/// network byte order: `upper` first, then `lower`, each big-endian.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Uint128 {
    /// Most significant 64 bits.
    pub upper: u64,
    /// Least significant 64 bits.
    pub lower: u64,
}

impl Uint128 {
    /// The zero identifier.
    pub const ZERO: Self = Self { upper: 0, lower: 0 };

    /// All bits set; masks every bit when used as a transmitter mask.
    pub const MAX: Self = Self {
        upper: u64::MAX,
        lower: u64::MAX,
    };

    /// Builds a value from its two 64-bit halves.
    #[must_use]
    pub const fn new(upper: u64, lower: u64) -> Self {
        Self { upper, lower }
    }

    /// The text form as UTF-16, for naming world-model objects after
    /// transmitter ids.
    #[must_use]
    pub fn to_u16string(self) -> crate::uri::U16String {
        crate::uri::U16String::from(self.to_string())
    }
}

impl From<u64> for Uint128 {
    fn from(lower: u64) -> Self {
        Self { upper: 0, lower }
    }
}

impl From<u128> for Uint128 {
    fn from(value: u128) -> Self {
        Self {
            upper: (value >> 64) as u64,
            lower: value as u64,
        }
    }
}

impl From<Uint128> for u128 {
    fn from(value: Uint128) -> Self {
        (u128::from(value.upper) << 64) | u128::from(value.lower)
    }
}

impl BitAnd for Uint128 {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self {
            upper: self.upper & rhs.upper,
            lower: self.lower & rhs.lower,
        }
    }
}

// The low word is zero-padded to 16 hex digits so that the text form is
// unambiguous; "0x10" can only mean sixteen.
impl fmt::Display for Uint128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}{:016x}", self.upper, self.lower)
    }
}

impl FromStr for Uint128 {
    type Err = ParseIntError;

    /// Parses either a `0x`-prefixed hexadecimal value or a decimal value,
    /// both over the full 128-bit range.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u128::from_str_radix(hex, 16)?,
            None => s.parse::<u128>()?,
        };
        Ok(Self::from(value))
    }
}

impl Wire for Uint128 {
    const WIDTH: usize = 16;

    fn write_be(self, out: &mut [u8]) {
        self.upper.write_be(&mut out[..8]);
        self.lower.write_be(&mut out[8..16]);
    }

    fn read_be(src: &[u8]) -> Self {
        Self {
            upper: u64::read_be(&src[..8]),
            lower: u64::read_be(&src[8..16]),
        }
    }
}

/// Identifier of a radio transmitter.
pub type TransmitterId = Uint128;

/// Identifier of a radio receiver.
pub type ReceiverId = Uint128;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ordering_is_upper_then_lower() {
        let small = Uint128::new(0, u64::MAX);
        let large = Uint128::new(1, 0);
        assert!(small < large);
        assert!(Uint128::new(1, 1) > Uint128::new(1, 0));
        assert_eq!(Uint128::from(42u64), Uint128::new(0, 42));
    }

    #[test]
    fn bitand_is_componentwise() {
        let a = Uint128::new(0xFF00, 0x0F0F);
        let b = Uint128::new(0x0FF0, 0xFFFF);
        assert_eq!(a & b, Uint128::new(0x0F00, 0x0F0F));
    }

    #[test]
    fn display_pads_low_word() {
        assert_eq!(Uint128::new(0, 0x10).to_string(), "0x00000000000000010");
        assert_eq!(Uint128::new(0x1, 0).to_string(), "0x10000000000000000");
        assert_eq!(
            Uint128::new(0xAB, 0xCD).to_string(),
            "0xab00000000000000cd"
        );
    }

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!("42".parse::<Uint128>().unwrap(), Uint128::from(42u64));
        assert_eq!(
            "0xff".parse::<Uint128>().unwrap(),
            Uint128::from(0xFFu64)
        );
        assert_eq!(
            "0x10000000000000000".parse::<Uint128>().unwrap(),
            Uint128::new(1, 0)
        );
        assert!("pigeon".parse::<Uint128>().is_err());
    }

    #[test]
    fn utf16_text_form_matches_display() {
        let value = Uint128::new(0, 0xBEEF);
        assert_eq!(value.to_u16string().to_string(), value.to_string());
    }

    #[test]
    fn wire_order_is_upper_first_big_endian() {
        let value = Uint128::new(0x0102_0304_0506_0708, 0x090A_0B0C_0D0E_0F10);
        let mut out = [0u8; 16];
        value.write_be(&mut out);
        assert_eq!(
            out,
            [1, 2, 3, 4, 5, 6, 7, 8, 9, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10]
        );
        assert_eq!(Uint128::read_be(&out), value);
    }

    proptest! {
        #[test]
        fn wire_round_trips(upper in any::<u64>(), lower in any::<u64>()) {
            let value = Uint128::new(upper, lower);
            let mut out = [0u8; 16];
            value.write_be(&mut out);
            prop_assert_eq!(Uint128::read_be(&out), value);
        }

        #[test]
        fn u128_conversion_round_trips(raw in any::<u128>()) {
            prop_assert_eq!(u128::from(Uint128::from(raw)), raw);
        }

        #[test]
        fn ordering_matches_u128(a in any::<u128>(), b in any::<u128>()) {
            prop_assert_eq!(Uint128::from(a).cmp(&Uint128::from(b)), a.cmp(&b));
        }
    }
}

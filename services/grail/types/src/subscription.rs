//! Sample subscriptions: which transmitters a solver wants to hear about.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::uint128::{TransmitterId, Uint128};

/// A transmitter on a physical layer. Ordered by physical layer, then id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Transmitter {
    /// Physical layer the transmitter operates on.
    pub phy: u8,
    /// Transmitter identifier.
    pub id: TransmitterId,
}

impl fmt::Display for Transmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.phy, self.id)
    }
}

/// A base identifier and mask that together admit a range of transmitters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxMask {
    /// Identifier bits the mask compares against.
    pub base_id: Uint128,
    /// Which bits of the identifier are significant.
    pub mask: Uint128,
}

impl TxMask {
    /// Returns true if the mask admits `id`:
    /// `id & mask == base_id & mask`. An all-zero mask admits every id; an
    /// all-ones mask requires an exact match.
    #[must_use]
    pub fn admits(&self, id: Uint128) -> bool {
        id & self.mask == self.base_id & self.mask
    }
}

/// One subscription rule: transmitters of interest on one physical layer,
/// reported at the requested interval.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Physical layer this rule applies to.
    pub physical_layer: u8,
    /// Transmitter ranges of interest.
    pub txers: Vec<TxMask>,
    /// Desired update interval, in milliseconds.
    pub update_interval: u64,
}

impl Rule {
    /// Returns true if an observation of `id` on `phy` matches this rule.
    #[must_use]
    pub fn matches(&self, phy: u8, id: Uint128) -> bool {
        self.physical_layer == phy && self.txers.iter().any(|t| t.admits(id))
    }
}

/// An ordered list of rules with union semantics: an observation matches
/// the subscription if any rule admits it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// The rules, in the order the subscriber sent them.
    pub rules: Vec<Rule>,
}

impl Subscription {
    /// Returns true if an observation of `id` on `phy` matches any rule.
    #[must_use]
    pub fn matches(&self, phy: u8, id: Uint128) -> bool {
        self.rules.iter().any(|r| r.matches(phy, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_mask_admits_everything() {
        let mask = TxMask {
            base_id: Uint128::from(10u64),
            mask: Uint128::ZERO,
        };
        assert!(mask.admits(Uint128::from(10u64)));
        assert!(mask.admits(Uint128::from(999u64)));
        assert!(mask.admits(Uint128::MAX));
    }

    #[test]
    fn full_mask_requires_exact_match() {
        let mask = TxMask {
            base_id: Uint128::new(7, 42),
            mask: Uint128::MAX,
        };
        assert!(mask.admits(Uint128::new(7, 42)));
        assert!(!mask.admits(Uint128::new(7, 43)));
        assert!(!mask.admits(Uint128::new(8, 42)));
    }

    #[test]
    fn partial_mask_compares_masked_bits_only() {
        let mask = TxMask {
            base_id: Uint128::from(0x1234u64),
            mask: Uint128::from(0xFFFFu64),
        };
        assert!(mask.admits(Uint128::from(0x1234u64)));
        // Bits above the mask are ignored.
        assert!(mask.admits(Uint128::new(0xDEAD, 0xABCD_1234)));
        assert!(!mask.admits(Uint128::from(0x1235u64)));
    }

    #[test]
    fn rule_requires_matching_physical_layer() {
        let rule = Rule {
            physical_layer: 1,
            txers: vec![TxMask {
                base_id: Uint128::ZERO,
                mask: Uint128::ZERO,
            }],
            update_interval: 500,
        };
        assert!(rule.matches(1, Uint128::from(5u64)));
        assert!(!rule.matches(2, Uint128::from(5u64)));
    }

    #[test]
    fn subscription_is_a_union_of_rules() {
        let sub = Subscription {
            rules: vec![
                Rule {
                    physical_layer: 1,
                    txers: vec![TxMask {
                        base_id: Uint128::from(10u64),
                        mask: Uint128::MAX,
                    }],
                    update_interval: 100,
                },
                Rule {
                    physical_layer: 2,
                    txers: vec![TxMask {
                        base_id: Uint128::from(20u64),
                        mask: Uint128::MAX,
                    }],
                    update_interval: 100,
                },
            ],
        };
        assert!(sub.matches(1, Uint128::from(10u64)));
        assert!(sub.matches(2, Uint128::from(20u64)));
        assert!(!sub.matches(1, Uint128::from(20u64)));
        assert!(!sub.matches(3, Uint128::from(10u64)));
    }

    #[test]
    fn transmitter_ordering_is_phy_then_id() {
        let a = Transmitter {
            phy: 1,
            id: Uint128::MAX,
        };
        let b = Transmitter {
            phy: 2,
            id: Uint128::ZERO,
        };
        assert!(a < b);
        assert_eq!(
            Transmitter {
                phy: 3,
                id: Uint128::from(9u64)
            }
            .to_string(),
            "3.0x00000000000000009"
        );
    }
}

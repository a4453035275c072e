//! The closed set of lifecycle extension points a token contract can
//! delegate to installed hooks.
//!
//! Each extension point is identified on the wire by a distinct power-of-two
//! flag value, so a hook contract can advertise the full set of points it
//! implements as a single bitmask. Token contracts dispatch a prefix of this
//! set: an ERC-20 core stops at [`HookType::BeforeApprove`], while NFT cores
//! extend through [`HookType::Royalty`].

use alloy_primitives::U256;

/// One lifecycle extension point of a token contract.
///
/// The variants are ordered by their flag values, so a contract's
/// dispatchable set is always a contiguous prefix and bounded scans can
/// compare against the highest variant a contract supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum HookType {
    /// Consulted before minting; the hook authorizes the minted quantity.
    BeforeMint,
    /// Consulted before a transfer.
    BeforeTransfer,
    /// Consulted before a burn.
    BeforeBurn,
    /// Consulted before an approval.
    BeforeApprove,
    /// Provides token metadata URIs.
    TokenUri,
    /// Provides royalty payment information.
    Royalty,
}

impl HookType {
    /// Every hook type, ordered from the lowest flag value to the highest.
    pub const ALL: [Self; 6] = [
        Self::BeforeMint,
        Self::BeforeTransfer,
        Self::BeforeBurn,
        Self::BeforeApprove,
        Self::TokenUri,
        Self::Royalty,
    ];

    /// Bit position of this hook type in a flags bitmask. Bit zero is
    /// reserved.
    const fn bit(self) -> usize {
        match self {
            Self::BeforeMint => 1,
            Self::BeforeTransfer => 2,
            Self::BeforeBurn => 3,
            Self::BeforeApprove => 4,
            Self::TokenUri => 5,
            Self::Royalty => 6,
        }
    }

    /// The flag value identifying this hook type on the wire.
    #[must_use]
    pub fn flag(self) -> U256 {
        U256::from(1_u8) << self.bit()
    }

    /// Parses a raw flag value.
    ///
    /// Returns `None` unless `flag` is exactly the flag value of a known
    /// hook type.
    #[must_use]
    pub fn from_flag(flag: U256) -> Option<Self> {
        Self::ALL.into_iter().find(|hook_type| hook_type.flag() == flag)
    }

    /// Whether this hook type's flag is set in `flags`.
    #[must_use]
    pub fn in_mask(self, flags: U256) -> bool {
        flags & self.flag() != U256::ZERO
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{uint, U256};

    use super::HookType;

    #[test]
    fn flag_values_are_distinct_powers_of_two() {
        let expected: [U256; 6] = [
            uint!(2_U256),
            uint!(4_U256),
            uint!(8_U256),
            uint!(16_U256),
            uint!(32_U256),
            uint!(64_U256),
        ];
        for (hook_type, expected) in HookType::ALL.into_iter().zip(expected) {
            assert_eq!(expected, hook_type.flag());
        }
    }

    #[test]
    fn from_flag_round_trips() {
        for hook_type in HookType::ALL {
            assert_eq!(Some(hook_type), HookType::from_flag(hook_type.flag()));
        }
    }

    #[test]
    fn from_flag_rejects_unknown_values() {
        for flag in [
            U256::ZERO,
            uint!(1_U256),
            uint!(3_U256),
            uint!(6_U256),
            uint!(128_U256),
            U256::MAX,
        ] {
            assert_eq!(None, HookType::from_flag(flag));
        }
    }

    #[test]
    fn variants_are_ordered_by_flag_value() {
        for window in HookType::ALL.windows(2) {
            assert!(window[0] < window[1]);
            assert!(window[0].flag() < window[1].flag());
        }
    }

    #[test]
    fn in_mask_matches_set_bits() {
        let mask =
            HookType::BeforeMint.flag() | HookType::BeforeApprove.flag();
        assert!(HookType::BeforeMint.in_mask(mask));
        assert!(HookType::BeforeApprove.in_mask(mask));
        assert!(!HookType::BeforeTransfer.in_mask(mask));
        assert!(!HookType::Royalty.in_mask(mask));
    }
}

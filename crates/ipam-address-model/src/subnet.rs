//! # Subnet Calculator
//!
//! Derives the usable address range of a subnet and performs mask and
//! membership tests. All arithmetic runs on family-tagged 128-bit values,
//! so IPv6 host spans never wrap; counts that exceed what the engine will
//! ever enumerate saturate to [`UNBOUNDED_USABLE`].

use serde::{Deserialize, Serialize};
use shared_types::IpFamily;

use crate::codec::IpNumber;
use crate::errors::PrefixError;

/// Sentinel usable count: the true count exceeds the representable maximum
/// and the range is effectively unbounded for enumeration purposes.
pub const UNBOUNDED_USABLE: u64 = u64::MAX;

/// The usable address range of a subnet.
///
/// `first` and `last` are inclusive. `usable` saturates at
/// [`UNBOUNDED_USABLE`]; the exact span of a wide IPv6 range is recoverable
/// from `first` and `last`, which keep full 128-bit precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetRange {
    /// First usable address (inclusive).
    pub first: IpNumber,
    /// Last usable address (inclusive).
    pub last: IpNumber,
    /// Usable address count, saturated at [`UNBOUNDED_USABLE`].
    pub usable: u64,
}

impl SubnetRange {
    /// Returns true when the subnet has no assignable addresses.
    pub fn is_empty(&self) -> bool {
        self.usable == 0
    }

    /// Returns true when `address` lies inside the usable window.
    pub fn covers(&self, address: IpNumber) -> bool {
        !self.is_empty()
            && address.family() == self.first.family()
            && self.first.value() <= address.value()
            && address.value() <= self.last.value()
    }
}

/// Builds the prefix mask: `prefix` leading one-bits in the family width,
/// placed in the low bits of the returned `u128`.
///
/// # Errors
/// `PrefixError` when the prefix exceeds the family bound.
pub fn prefix_mask(prefix: u8, family: IpFamily) -> Result<u128, PrefixError> {
    let width = family.bit_width();
    if prefix > width {
        return Err(PrefixError { prefix, family });
    }
    if prefix == 0 {
        return Ok(0);
    }
    let all_ones = match family {
        IpFamily::V4 => u32::MAX as u128,
        IpFamily::V6 => u128::MAX,
    };
    // prefix >= 1 here, so the shift distance is at most width - 1.
    Ok(all_ones & !((1u128 << (width - prefix)) - 1))
}

/// Derives the usable range of `network/prefix`.
///
/// The network value is normalized to the block base (`network & mask`)
/// before derivation, so a host address inside the block yields the same
/// range as the block base itself.
///
/// IPv4 excludes the network and broadcast addresses for prefixes up to
/// /30; /31 has an empty usable range and /32 is the single address
/// itself. IPv6 has no broadcast exclusion: the first usable address is
/// `network + 1` and /128 is the single address itself.
///
/// # Errors
/// `PrefixError` when the prefix exceeds the family bound.
pub fn subnet_range(network: IpNumber, prefix: u8) -> Result<SubnetRange, PrefixError> {
    let family = network.family();
    let mask = prefix_mask(prefix, family)?;
    let base = network.value() & mask;
    let width = family.bit_width();
    let host_bits = width - prefix;

    // All host bits set: the top of the block. The base has zero host
    // bits, so the OR never carries and cannot overflow.
    let host_all = if host_bits == 0 {
        0
    } else if host_bits == 128 {
        u128::MAX
    } else {
        (1u128 << host_bits) - 1
    };
    let top = base | host_all;

    let wrap = |value: u128| match family {
        IpFamily::V4 => IpNumber::from_v4(value as u32),
        IpFamily::V6 => IpNumber::from_v6(value),
    };

    let range = match family {
        // Single-address block: /32 is the one usable address.
        IpFamily::V4 if host_bits == 0 => SubnetRange {
            first: wrap(base),
            last: wrap(base),
            usable: 1,
        },
        // /31: the two-address block has only a network and a broadcast
        // address, leaving nothing assignable.
        IpFamily::V4 if host_bits == 1 => SubnetRange {
            first: wrap(base),
            last: wrap(base),
            usable: 0,
        },
        IpFamily::V4 => SubnetRange {
            first: wrap(base + 1),
            last: wrap(top - 1),
            usable: ((1u64 << host_bits) - 2),
        },
        IpFamily::V6 if host_bits == 0 => SubnetRange {
            first: wrap(base),
            last: wrap(base),
            usable: 1,
        },
        IpFamily::V6 => SubnetRange {
            first: wrap(base + 1),
            last: wrap(top),
            usable: saturating_usable_v6(host_bits),
        },
    };
    Ok(range)
}

/// Usable count for an IPv6 block with `host_bits` host bits: the true
/// count is `2^host_bits - 1`, saturated at the sentinel once it no longer
/// fits in 64 bits.
fn saturating_usable_v6(host_bits: u8) -> u64 {
    if host_bits >= 64 {
        UNBOUNDED_USABLE
    } else {
        (1u64 << host_bits) - 1
    }
}

/// Tests whether `address` belongs to the block `network/prefix`.
///
/// Computes the prefix mask and compares the masked values. Addresses of a
/// different family are never members. Note that for IPv4 this is block
/// membership, which includes the network and broadcast addresses; use
/// [`SubnetRange::covers`] for the usable window.
///
/// # Errors
/// `PrefixError` when the prefix exceeds the family bound.
pub fn contains(address: IpNumber, network: IpNumber, prefix: u8) -> Result<bool, PrefixError> {
    if address.family() != network.family() {
        return Ok(false);
    }
    let mask = prefix_mask(prefix, network.family())?;
    Ok(address.value() & mask == network.value() & mask)
}

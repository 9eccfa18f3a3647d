//! Error types for address parsing and prefix validation.

use shared_types::IpFamily;
use thiserror::Error;

/// Malformed address or CIDR text. Always a caller input bug, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressFormatError {
    /// The input was empty.
    #[error("empty address text")]
    Empty,

    /// IPv4 text did not have exactly four dot-separated octets.
    #[error("expected 4 dot-separated octets, found {found}")]
    OctetCount { found: usize },

    /// An IPv4 octet was not a decimal number in 0-255.
    #[error("invalid IPv4 octet {octet:?}")]
    InvalidOctet { octet: String },

    /// IPv6 text without `::` did not have exactly eight groups, or the
    /// explicit groups around a `::` left nothing to compress.
    #[error("expected 8 colon-separated groups, found {found}")]
    GroupCount { found: usize },

    /// An IPv6 group was not 1-4 hex digits.
    #[error("invalid IPv6 group {group:?}")]
    InvalidGroup { group: String },

    /// More than one `::` zero-compression marker.
    #[error("more than one '::' in IPv6 address")]
    MultipleCompressions,

    /// CIDR text was not `<address>/<prefix>`.
    #[error("invalid CIDR notation {text:?}")]
    InvalidCidr { text: String },

    /// The CIDR prefix was not a number within the family's bound.
    #[error("invalid prefix {prefix:?} for {family}")]
    InvalidCidrPrefix { prefix: String, family: IpFamily },
}

/// A prefix length outside the legal bound for its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("prefix /{prefix} is out of range for {family}")]
pub struct PrefixError {
    /// The rejected prefix length.
    pub prefix: u8,
    /// The family whose bound was exceeded.
    pub family: IpFamily,
}

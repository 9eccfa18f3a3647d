//! # Address Codec
//!
//! Parses, validates, and serializes IPv4/IPv6 textual addresses and
//! converts them to fixed-width integers suitable for arithmetic and
//! comparison.
//!
//! Textual IPv6 has multiple legal spellings of the same address, so every
//! address is keyed by its canonical form: parse to the 128-bit integer,
//! then render with the longest run of zero groups compressed. Two
//! spellings of one address therefore collide as one record key.

use serde::{Deserialize, Serialize};
use shared_types::IpFamily;

use crate::errors::AddressFormatError;

/// A parsed address: family tag plus the address value widened to 128 bits.
///
/// IPv4 values occupy the low 32 bits. Ordering compares the family first,
/// then the numeric value, so addresses of one family sort contiguously.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct IpNumber {
    family: IpFamily,
    value: u128,
}

impl IpNumber {
    /// Wraps a 32-bit IPv4 value.
    pub fn from_v4(value: u32) -> Self {
        Self {
            family: IpFamily::V4,
            value: value as u128,
        }
    }

    /// Wraps a 128-bit IPv6 value.
    pub fn from_v6(value: u128) -> Self {
        Self {
            family: IpFamily::V6,
            value,
        }
    }

    /// Parses textual IPv4 or IPv6, detecting the family from the text.
    pub fn parse(text: &str) -> Result<Self, AddressFormatError> {
        match detect_family(text) {
            IpFamily::V4 => parse_v4(text).map(Self::from_v4),
            IpFamily::V6 => parse_v6(text).map(Self::from_v6),
        }
    }

    /// The address family.
    pub fn family(self) -> IpFamily {
        self.family
    }

    /// The numeric value, widened to 128 bits for IPv4.
    pub fn value(self) -> u128 {
        self.value
    }

    /// Renders the canonical textual form.
    pub fn to_text(self) -> String {
        match self.family {
            IpFamily::V4 => format_v4(self.value as u32),
            IpFamily::V6 => format_v6(self.value),
        }
    }

    /// The numerically next address in the same family, if one exists.
    pub fn succ(self) -> Option<Self> {
        let max = match self.family {
            IpFamily::V4 => u32::MAX as u128,
            IpFamily::V6 => u128::MAX,
        };
        if self.value >= max {
            return None;
        }
        Some(Self {
            family: self.family,
            value: self.value + 1,
        })
    }
}

impl std::fmt::Display for IpNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

/// Classifies address text by family: presence of `:` implies IPv6.
pub fn detect_family(text: &str) -> IpFamily {
    if text.contains(':') {
        IpFamily::V6
    } else {
        IpFamily::V4
    }
}

/// Parses dotted-quad IPv4 text into a 32-bit integer.
///
/// Requires exactly four dot-separated decimal octets, each 0-255 and 1-3
/// digits. Leading zeros are accepted on input (`010` parses as 10) but
/// never produced on output.
///
/// # Errors
/// - `OctetCount` if the text does not have four octets
/// - `InvalidOctet` if an octet is empty, non-decimal, or above 255
pub fn parse_v4(text: &str) -> Result<u32, AddressFormatError> {
    if text.is_empty() {
        return Err(AddressFormatError::Empty);
    }
    let parts: Vec<&str> = text.split('.').collect();
    if parts.len() != 4 {
        return Err(AddressFormatError::OctetCount { found: parts.len() });
    }
    let mut value = 0u32;
    for part in parts {
        let octet = parse_octet(part)?;
        value = (value << 8) | octet as u32;
    }
    Ok(value)
}

fn parse_octet(part: &str) -> Result<u8, AddressFormatError> {
    let invalid = || AddressFormatError::InvalidOctet {
        octet: part.to_string(),
    };
    if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    part.parse::<u16>()
        .ok()
        .filter(|n| *n <= 255)
        .map(|n| n as u8)
        .ok_or_else(invalid)
}

/// Renders a 32-bit integer as dotted-quad IPv4 text. Zero ambiguity: the
/// output always parses back to the same integer.
pub fn format_v4(value: u32) -> String {
    let octets = value.to_be_bytes();
    format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3])
}

/// Parses textual IPv6 into a 128-bit integer.
///
/// Expands a single `::` zero-compression, validates 1-4 hex digits per
/// group, and requires exactly eight 16-bit groups after expansion. Mixed
/// IPv4-in-IPv6 notation (`::ffff:1.2.3.4`) is not accepted.
///
/// # Errors
/// - `MultipleCompressions` for more than one `::`
/// - `GroupCount` if expansion cannot reach exactly eight groups
/// - `InvalidGroup` for a group that is not 1-4 hex digits
pub fn parse_v6(text: &str) -> Result<u128, AddressFormatError> {
    if text.is_empty() {
        return Err(AddressFormatError::Empty);
    }

    let groups: Vec<u16> = match text.find("::") {
        Some(pos) => {
            let head = &text[..pos];
            let tail = &text[pos + 2..];
            if tail.contains("::") {
                return Err(AddressFormatError::MultipleCompressions);
            }
            let head_groups = parse_groups(head)?;
            let tail_groups = parse_groups(tail)?;
            let explicit = head_groups.len() + tail_groups.len();
            // The compression must stand for at least one zero group.
            if explicit > 7 {
                return Err(AddressFormatError::GroupCount { found: explicit });
            }
            let mut groups = head_groups;
            groups.resize(8 - tail_groups.len(), 0);
            groups.extend(tail_groups);
            groups
        }
        None => {
            let groups = parse_groups(text)?;
            if groups.len() != 8 {
                return Err(AddressFormatError::GroupCount {
                    found: groups.len(),
                });
            }
            groups
        }
    };

    Ok(groups
        .iter()
        .fold(0u128, |acc, group| (acc << 16) | *group as u128))
}

fn parse_groups(section: &str) -> Result<Vec<u16>, AddressFormatError> {
    if section.is_empty() {
        return Ok(Vec::new());
    }
    section.split(':').map(parse_group).collect()
}

fn parse_group(group: &str) -> Result<u16, AddressFormatError> {
    let invalid = || AddressFormatError::InvalidGroup {
        group: group.to_string(),
    };
    if group.is_empty() || group.len() > 4 {
        return Err(invalid());
    }
    u16::from_str_radix(group, 16).map_err(|_| invalid())
}

/// Renders a 128-bit integer in canonical IPv6 form.
///
/// Expands to eight lowercase hex groups, then compresses the longest run
/// of zero groups (minimum run length 2) to `::`; ties in run length are
/// broken by the leftmost run.
pub fn format_v6(value: u128) -> String {
    let mut groups = [0u16; 8];
    for (i, group) in groups.iter_mut().enumerate() {
        *group = (value >> (112 - 16 * i)) as u16;
    }

    let (run_start, run_len) = longest_zero_run(&groups);
    if run_len < 2 {
        return join_groups(&groups);
    }

    let head = join_groups(&groups[..run_start]);
    let tail = join_groups(&groups[run_start + run_len..]);
    format!("{head}::{tail}")
}

/// Finds the leftmost longest run of zero groups.
fn longest_zero_run(groups: &[u16; 8]) -> (usize, usize) {
    let mut best = (0, 0);
    let mut current = (0, 0);
    for (i, group) in groups.iter().enumerate() {
        if *group == 0 {
            if current.1 == 0 {
                current.0 = i;
            }
            current.1 += 1;
            if current.1 > best.1 {
                best = current;
            }
        } else {
            current.1 = 0;
        }
    }
    best
}

fn join_groups(groups: &[u16]) -> String {
    groups
        .iter()
        .map(|g| format!("{g:x}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Parses then re-renders address text, yielding the canonical spelling
/// used as the record key.
pub fn canonicalize(text: &str) -> Result<String, AddressFormatError> {
    IpNumber::parse(text).map(IpNumber::to_text)
}

/// Returns true when the text is a well-formed address of either family.
pub fn is_valid(text: &str) -> bool {
    IpNumber::parse(text).is_ok()
}

/// Parses `<address>/<prefix>` CIDR text.
///
/// # Errors
/// - `InvalidCidr` when the `/` separator is missing
/// - `InvalidCidrPrefix` when the prefix is not a decimal number within the
///   family's bound (0-32 for IPv4, 0-128 for IPv6)
/// - any address error from parsing the network part
pub fn parse_cidr(text: &str) -> Result<(IpNumber, u8), AddressFormatError> {
    let (address_part, prefix_part) =
        text.split_once('/')
            .ok_or_else(|| AddressFormatError::InvalidCidr {
                text: text.to_string(),
            })?;
    let address = IpNumber::parse(address_part)?;

    let invalid_prefix = || AddressFormatError::InvalidCidrPrefix {
        prefix: prefix_part.to_string(),
        family: address.family(),
    };
    if prefix_part.is_empty()
        || prefix_part.len() > 3
        || !prefix_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid_prefix());
    }
    let prefix: u8 = prefix_part.parse().map_err(|_| invalid_prefix())?;
    if prefix > address.family().max_prefix() {
        return Err(invalid_prefix());
    }
    Ok((address, prefix))
}

/// Returns true when the text is well-formed CIDR with a family-appropriate
/// prefix bound.
pub fn is_valid_cidr(text: &str) -> bool {
    parse_cidr(text).is_ok()
}

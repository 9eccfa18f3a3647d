//! # Address Model
//!
//! Pure address mathematics for the IPAM engine: conversion between
//! textual IPv4/IPv6 addresses and fixed-width integers, canonical-form
//! rendering, subnet range derivation, and membership testing.
//!
//! This crate performs no I/O and knows nothing about record stores; it is
//! the innermost layer the allocation engine builds on.
//!
//! ## Module Structure
//!
//! - [`codec`] - parse/format/canonicalize addresses and CIDR text
//! - [`subnet`] - prefix masks, usable ranges, membership tests
//! - [`errors`] - `AddressFormatError`, `PrefixError`

pub mod codec;
pub mod errors;
pub mod subnet;

pub use codec::{
    canonicalize, detect_family, format_v4, format_v6, is_valid, is_valid_cidr, parse_cidr,
    parse_v4, parse_v6, IpNumber,
};
pub use errors::{AddressFormatError, PrefixError};
pub use subnet::{contains, prefix_mask, subnet_range, SubnetRange, UNBOUNDED_USABLE};

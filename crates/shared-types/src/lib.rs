//! # Shared Types Crate
//!
//! This crate contains the domain entities, identifier newtypes, and audit
//! event shapes shared between the IPAM engine and its collaborators (the
//! HTTP layer, record stores, audit transports).
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a crate boundary
//!   is defined here.
//! - **Canonical Keying**: `AddressRecord.address` always holds the
//!   canonical textual form of the address; two spellings of one address
//!   collide as one record key.
//! - **Status-as-Lifecycle**: records are never deleted. `Available` is
//!   both the initial and terminal status, and the absence of a record is
//!   equivalent to it.

pub mod audit;
pub mod entities;

pub use audit::{AuditAction, AuditEvent};
pub use entities::*;

//! Engine error taxonomy.
//!
//! Every condition is terminal and locally reported; the only internal
//! retry is the bounded uniqueness-conflict retry in the allocation path.

use ipam_address_model::{AddressFormatError, PrefixError};
use shared_types::{AddressStatus, IpFamily, RecordId, ReservationId, SubnetId};
use thiserror::Error;

/// Error type for all engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IpamError {
    /// Referenced subnet does not exist.
    #[error("subnet not found: {0}")]
    SubnetNotFound(SubnetId),

    /// Referenced address record does not exist.
    #[error("address record not found: {0}")]
    RecordNotFound(RecordId),

    /// Referenced reservation does not exist.
    #[error("reservation not found: {0}")]
    ReservationNotFound(ReservationId),

    /// Malformed address or CIDR text.
    #[error(transparent)]
    InvalidFormat(#[from] AddressFormatError),

    /// Prefix length outside the family bound.
    #[error(transparent)]
    InvalidPrefix(#[from] PrefixError),

    /// Address family disagrees with the subnet family.
    #[error("family mismatch: {address} is {actual}, subnet is {expected}")]
    FamilyMismatch {
        expected: IpFamily,
        actual: IpFamily,
        address: String,
    },

    /// Address or range endpoint outside the subnet's usable range.
    #[error("address {address} is outside the usable range of {cidr}")]
    OutOfRange { address: String, cidr: String },

    /// Reservation start is numerically after its end.
    #[error("reservation start {start} is after end {end}")]
    InvalidOrder { start: String, end: String },

    /// Manual allocation target is not available.
    #[error("address {address} is already {status}")]
    AlreadyOccupied {
        address: String,
        status: AddressStatus,
    },

    /// Reservation range overlaps occupied addresses.
    #[error("range conflicts with {} occupied address(es)", .addresses.len())]
    RangeConflict { addresses: Vec<String> },

    /// Automatic allocation could not find a gap within its bounded scan.
    /// Distinct from [`IpamError::SubnetExhausted`]: the engine cannot
    /// prove exhaustion for IPv6-scale ranges.
    #[error("no available address found within search budget of {budget} candidates")]
    SearchBudgetExceeded { budget: u64 },

    /// The scan provably covered the whole usable range without a gap.
    #[error("subnet has no free addresses")]
    SubnetExhausted,

    /// Illegal address-status transition.
    #[error("illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: AddressStatus,
        to: AddressStatus,
    },

    /// Record store failure.
    #[error("record store error: {0}")]
    Store(#[from] StoreError),

    /// Audit recorder failure. The mutation committed but its audit entry
    /// did not; the operation is reported failed rather than silently
    /// unaudited.
    #[error("audit recorder error: {0}")]
    Audit(#[from] AuditError),
}

/// Error type for record-store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The address key is already claimed in an occupied status. The final
    /// arbiter for concurrent allocation; the engine treats it as a
    /// recoverable conflict.
    #[error("address {address} is already claimed ({status})")]
    UniquenessViolation {
        address: String,
        status: AddressStatus,
    },

    /// An update referenced a record that does not exist.
    #[error("no such record: {0}")]
    MissingRecord(RecordId),

    /// Backend failure (I/O, poisoned lock, connectivity).
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Error type for audit-recorder operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    /// The recorder could not accept the event.
    #[error("audit recorder unavailable: {0}")]
    Unavailable(String),
}

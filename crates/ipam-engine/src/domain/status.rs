//! # Status Machine
//!
//! Legal address-status transitions and their side effects.
//!
//! ```text
//! [Available] ──allocate/reserve──→ [Assigned | Reserved | DhcpManaged | StaticManaged]
//!      ↑                                          │
//!      └────────── release / reservation delete ──┘
//! ```
//!
//! Transitions between two occupied statuses are legal only through the
//! explicit metadata-update operation, never through allocation or
//! release. Releasing clears every metadata field regardless of the
//! originating status.

use shared_types::{AddressRecord, AddressStatus, Timestamp};

use super::errors::IpamError;

/// Returns true when `from -> to` is legal outside the metadata-update
/// operation.
pub fn is_legal_transition(from: AddressStatus, to: AddressStatus) -> bool {
    match (from.is_occupied(), to.is_occupied()) {
        // Allocation or reservation claims a free address.
        (false, true) => true,
        // Release; also covers reservation deletion.
        (true, false) => true,
        // Available -> Available is a permitted no-op.
        (false, false) => true,
        // Occupied -> occupied requires the metadata-update operation.
        (true, true) => false,
    }
}

/// Applies a transition to a record, enforcing legality and side effects.
///
/// Transitioning to `Available` clears all metadata.
///
/// # Errors
/// `IllegalTransition` when the transition is not legal outside the
/// metadata-update operation.
pub fn transition(
    record: &mut AddressRecord,
    to: AddressStatus,
    now: Timestamp,
) -> Result<(), IpamError> {
    if !is_legal_transition(record.status, to) {
        return Err(IpamError::IllegalTransition {
            from: record.status,
            to,
        });
    }
    apply(record, to, now);
    Ok(())
}

/// Applies a transition under the metadata-update rule, which additionally
/// permits occupied -> occupied moves (e.g. `Assigned -> DhcpManaged`).
///
/// Transitioning to `Available` still clears all metadata.
pub fn transition_for_update(record: &mut AddressRecord, to: AddressStatus, now: Timestamp) {
    apply(record, to, now);
}

fn apply(record: &mut AddressRecord, to: AddressStatus, now: Timestamp) {
    record.status = to;
    if !to.is_occupied() {
        record.metadata.clear();
    }
    record.updated_at = now;
}

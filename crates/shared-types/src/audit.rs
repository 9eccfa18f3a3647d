//! # Audit Events
//!
//! Event shapes the engine emits after each committed mutation. The engine
//! contract is one event per mutation; transport and retention belong to
//! the audit collaborator.

use serde::{Deserialize, Serialize};

use crate::entities::{AddressRecord, Reservation, SubnetId, Timestamp};

/// The kind of mutation an audit event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// An address was assigned (manually or automatically).
    Allocate,
    /// An address was released back to available.
    Release,
    /// Record metadata (and possibly status) was updated in place.
    UpdateMetadata,
    /// A range reservation was created.
    ReserveRange,
    /// A range reservation was deleted.
    DeleteReservation,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allocate => write!(f, "allocate"),
            Self::Release => write!(f, "release"),
            Self::UpdateMetadata => write!(f, "update-metadata"),
            Self::ReserveRange => write!(f, "reserve-range"),
            Self::DeleteReservation => write!(f, "delete-reservation"),
        }
    }
}

/// One audit entry, emitted after a committed mutation.
///
/// `before` is `None` when the record did not previously exist (implicit
/// `Available`). Reservation mutations carry the reservation snapshot and,
/// for deletions, the count of addresses released back to available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// What happened.
    pub action: AuditAction,
    /// Who performed the mutation.
    pub actor: String,
    /// When the mutation committed (ms).
    pub timestamp: Timestamp,
    /// Subnet the mutation happened in.
    pub subnet_id: Option<SubnetId>,
    /// Record state before the mutation, if a record existed.
    pub before: Option<AddressRecord>,
    /// Record state after the mutation, for record mutations.
    pub after: Option<AddressRecord>,
    /// Reservation snapshot, for reservation mutations.
    pub reservation: Option<Reservation>,
    /// Addresses released back to available, for reservation deletion.
    pub released_count: Option<u64>,
}

impl AuditEvent {
    /// Builds an event for a single-record mutation.
    pub fn record_mutation(
        action: AuditAction,
        actor: impl Into<String>,
        timestamp: Timestamp,
        before: Option<AddressRecord>,
        after: AddressRecord,
    ) -> Self {
        Self {
            action,
            actor: actor.into(),
            timestamp,
            subnet_id: Some(after.subnet_id),
            before,
            after: Some(after),
            reservation: None,
            released_count: None,
        }
    }

    /// Builds an event for a reservation creation.
    pub fn reservation_created(
        actor: impl Into<String>,
        timestamp: Timestamp,
        reservation: Reservation,
    ) -> Self {
        Self {
            action: AuditAction::ReserveRange,
            actor: actor.into(),
            timestamp,
            subnet_id: Some(reservation.subnet_id),
            before: None,
            after: None,
            reservation: Some(reservation),
            released_count: None,
        }
    }

    /// Builds an event for a reservation deletion.
    pub fn reservation_deleted(
        actor: impl Into<String>,
        timestamp: Timestamp,
        reservation: Reservation,
        released_count: u64,
    ) -> Self {
        Self {
            action: AuditAction::DeleteReservation,
            actor: actor.into(),
            timestamp,
            subnet_id: Some(reservation.subnet_id),
            before: None,
            after: None,
            reservation: Some(reservation),
            released_count: Some(released_count),
        }
    }
}

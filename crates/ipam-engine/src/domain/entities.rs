//! Engine-local entities: configuration and operation requests.

use serde::{Deserialize, Serialize};
use shared_types::{AddressMetadata, AddressStatus, SubnetId, Timestamp};

/// Engine tuning knobs.
///
/// The two caps exist because IPv6 usable ranges can be astronomically
/// large: every scan and every materialization must be bounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum candidates an automatic allocation scan examines before
    /// reporting that the search budget was exceeded.
    pub auto_scan_budget: u64,

    /// Maximum `Reserved` records materialized per reservation; addresses
    /// beyond the cap are covered by the reservation interval only.
    pub reservation_materialization_cap: u64,

    /// Bounded retries after a store uniqueness conflict before the
    /// allocation reports its terminal outcome.
    pub conflict_retry_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            auto_scan_budget: 1024,
            reservation_materialization_cap: 1000,
            conflict_retry_limit: 3,
        }
    }
}

/// An allocation request, manual (address supplied) or automatic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Subnet to allocate from.
    pub subnet_id: SubnetId,
    /// Requested address for the manual path; `None` selects first-fit.
    pub address: Option<String>,
    /// Target status; defaults to `Assigned`. Must be an occupied status.
    pub status: Option<AddressStatus>,
    /// Metadata for the new record.
    pub metadata: AddressMetadata,
    /// Who is performing the mutation (for the audit trail).
    pub actor: String,
}

impl AllocationRequest {
    /// First-fit automatic allocation.
    pub fn automatic(subnet_id: SubnetId, actor: impl Into<String>) -> Self {
        Self {
            subnet_id,
            address: None,
            status: None,
            metadata: AddressMetadata::default(),
            actor: actor.into(),
        }
    }

    /// Manual allocation of a caller-supplied address.
    pub fn manual(subnet_id: SubnetId, address: impl Into<String>, actor: impl Into<String>) -> Self {
        Self {
            subnet_id,
            address: Some(address.into()),
            status: None,
            metadata: AddressMetadata::default(),
            actor: actor.into(),
        }
    }

    /// Sets the target status.
    pub fn with_status(mut self, status: AddressStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the record metadata.
    pub fn with_metadata(mut self, metadata: AddressMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A range reservation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRequest {
    /// Subnet the range belongs to.
    pub subnet_id: SubnetId,
    /// First address of the range (inclusive).
    pub start: String,
    /// Last address of the range (inclusive).
    pub end: String,
    /// Optional purpose.
    pub purpose: Option<String>,
    /// Optional owner.
    pub owner: Option<String>,
    /// Optional expiry timestamp (ms).
    pub expires_at: Option<Timestamp>,
    /// Who is performing the mutation.
    pub actor: String,
}

impl ReservationRequest {
    /// Builds a request with the mandatory fields.
    pub fn new(
        subnet_id: SubnetId,
        start: impl Into<String>,
        end: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            subnet_id,
            start: start.into(),
            end: end.into(),
            purpose: None,
            owner: None,
            expires_at: None,
            actor: actor.into(),
        }
    }

    /// Sets the purpose.
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// Sets the owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Sets the expiry timestamp.
    pub fn with_expiry(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

//! Outbound (driven) ports for the IPAM engine.
//!
//! These traits define the engine's dependencies: the abstract address
//! record store, the audit recorder, and a time source abstracted for
//! deterministic tests.

use ipam_address_model::IpNumber;
use shared_types::{
    AddressRecord, AddressStatus, AuditEvent, RecordId, Reservation, ReservationId, Subnet,
    SubnetId, Timestamp,
};

use crate::domain::errors::{AuditError, StoreError};

/// Abstract record store the engine reads and writes through.
///
/// The store is the final arbiter for concurrent allocation: it must
/// enforce address uniqueness, and [`RecordStore::claim_address`] must be
/// atomic relative to other callers. Everything else is plain reads and
/// writes.
pub trait RecordStore: Send + Sync {
    /// Looks up a subnet by id.
    fn subnet(&self, id: SubnetId) -> Result<Option<Subnet>, StoreError>;

    /// Declares a subnet. (Subnet CRUD beyond declaration is the
    /// collaborator's concern; the engine only reads subnets.)
    fn insert_subnet(&self, subnet: Subnet) -> Result<(), StoreError>;

    /// Looks up an address record by id.
    fn record_by_id(&self, id: RecordId) -> Result<Option<AddressRecord>, StoreError>;

    /// Looks up an address record by its canonical address within a subnet.
    fn record_by_address(
        &self,
        subnet_id: SubnetId,
        address: &str,
    ) -> Result<Option<AddressRecord>, StoreError>;

    /// All addresses of the subnet currently in an occupied status.
    fn occupied_addresses(&self, subnet_id: SubnetId) -> Result<Vec<IpNumber>, StoreError>;

    /// Records in `[start, end]` (inclusive, numeric order) whose status is
    /// one of `statuses`.
    fn records_in_range(
        &self,
        subnet_id: SubnetId,
        start: IpNumber,
        end: IpNumber,
        statuses: &[AddressStatus],
    ) -> Result<Vec<AddressRecord>, StoreError>;

    /// Atomically claims an address: inserts the record if no record
    /// exists for its address, or replaces an existing record whose status
    /// is `Available`. Returns the replaced record, if any.
    ///
    /// # Errors
    /// `UniquenessViolation` when the address is already claimed in an
    /// occupied status. The engine treats this as a recoverable conflict.
    fn claim_address(&self, record: AddressRecord)
        -> Result<Option<AddressRecord>, StoreError>;

    /// Replaces an existing record (matched by id) in place.
    ///
    /// # Errors
    /// `MissingRecord` when no record with that id exists.
    fn update_record(&self, record: AddressRecord) -> Result<(), StoreError>;

    /// Transitions every record in `[start, end]` whose status is `from`
    /// to `to`, clearing metadata when `to` is not occupied. Returns the
    /// number of records transitioned.
    fn bulk_transition(
        &self,
        subnet_id: SubnetId,
        start: IpNumber,
        end: IpNumber,
        from: AddressStatus,
        to: AddressStatus,
        now: Timestamp,
    ) -> Result<u64, StoreError>;

    /// Persists a reservation entity.
    fn insert_reservation(&self, reservation: Reservation) -> Result<(), StoreError>;

    /// Looks up a reservation by id.
    fn reservation(&self, id: ReservationId) -> Result<Option<Reservation>, StoreError>;

    /// Removes a reservation entity, returning it if it existed.
    fn remove_reservation(&self, id: ReservationId)
        -> Result<Option<Reservation>, StoreError>;

    /// All reservations declared for a subnet, active or not.
    fn reservations_for_subnet(&self, subnet_id: SubnetId)
        -> Result<Vec<Reservation>, StoreError>;
}

/// Audit recorder interface.
///
/// The engine emits exactly one event per committed mutation before the
/// operation reports success.
pub trait AuditRecorder: Send + Sync {
    /// Records one audit event.
    fn record(&self, event: AuditEvent) -> Result<(), AuditError>;
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now_ms(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Mock time source for testing.
#[cfg(test)]
pub struct MockTimeSource {
    time: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl MockTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: std::sync::atomic::AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl TimeSource for MockTimeSource {
    fn now_ms(&self) -> Timestamp {
        self.time.load(std::sync::atomic::Ordering::SeqCst)
    }
}

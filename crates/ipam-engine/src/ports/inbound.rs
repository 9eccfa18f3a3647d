//! Inbound (driving) port for the IPAM engine.
//!
//! The HTTP collaborator drives the engine exclusively through this trait;
//! request and response wire shapes are its concern, the operation
//! contracts are the engine's.

use ipam_address_model::SubnetRange;
use shared_types::{
    AddressMetadata, AddressRecord, AddressStatus, IpFamily, RecordId, Reservation, ReservationId,
};

use crate::domain::entities::{AllocationRequest, ReservationRequest};
use crate::domain::errors::IpamError;

/// Primary API of the allocation engine.
pub trait IpamApi: Send + Sync {
    /// Allocates an address in a subnet: first-fit automatic when the
    /// request carries no address, manual validation otherwise.
    ///
    /// # Errors
    /// - `SubnetNotFound`: the subnet does not exist
    /// - `InvalidFormat`: the supplied address does not parse
    /// - `FamilyMismatch`: the supplied address is the wrong family
    /// - `OutOfRange`: the supplied address is outside the usable range
    /// - `AlreadyOccupied`: the supplied address is not available
    /// - `SearchBudgetExceeded`: no gap found within the bounded scan
    /// - `SubnetExhausted`: the scan provably covered the whole range
    fn allocate(&self, request: AllocationRequest) -> Result<AddressRecord, IpamError>;

    /// Releases an address back to available, clearing all metadata.
    /// Releasing an already-available record is a no-op success.
    ///
    /// # Errors
    /// - `RecordNotFound`: no record with that id
    fn release(&self, record_id: RecordId, actor: &str) -> Result<AddressRecord, IpamError>;

    /// Replaces a record's metadata, optionally moving it to a new status.
    /// This is the only path permitting occupied -> occupied transitions.
    ///
    /// # Errors
    /// - `RecordNotFound`: no record with that id
    fn update_metadata(
        &self,
        record_id: RecordId,
        metadata: AddressMetadata,
        status: Option<AddressStatus>,
        actor: &str,
    ) -> Result<AddressRecord, IpamError>;

    /// Creates a range reservation, materializing `Reserved` records up to
    /// the configured cap.
    ///
    /// # Errors
    /// - `SubnetNotFound`, `InvalidFormat`, `FamilyMismatch`, `OutOfRange`
    /// - `InvalidOrder`: start numerically after end
    /// - `RangeConflict`: the range overlaps occupied addresses
    fn reserve_range(&self, request: ReservationRequest) -> Result<Reservation, IpamError>;

    /// Deletes a reservation, restoring still-`Reserved` members to
    /// available. Returns the number of addresses released.
    ///
    /// # Errors
    /// - `ReservationNotFound`: no reservation with that id
    fn delete_reservation(
        &self,
        reservation_id: ReservationId,
        actor: &str,
    ) -> Result<u64, IpamError>;

    /// Derives the usable range of `network/prefix` for the given family.
    ///
    /// # Errors
    /// - `InvalidFormat`: the network text does not parse
    /// - `FamilyMismatch`: the network text is the wrong family
    /// - `InvalidPrefix`: the prefix exceeds the family bound
    fn compute_range(
        &self,
        network: &str,
        prefix: u8,
        family: IpFamily,
    ) -> Result<SubnetRange, IpamError>;

    /// Tests block membership of an address.
    ///
    /// # Errors
    /// - `InvalidFormat`: either text does not parse
    /// - `InvalidPrefix`: the prefix exceeds the family bound
    fn is_in_subnet(
        &self,
        address: &str,
        network: &str,
        prefix: u8,
        family: IpFamily,
    ) -> Result<bool, IpamError>;
}

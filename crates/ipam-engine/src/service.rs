//! The engine facade: one service implementing [`IpamApi`] over a record
//! store, an audit recorder, and a time source.

use std::sync::Arc;

use ipam_address_model::{contains, subnet_range, IpNumber, SubnetRange};
use shared_types::{
    AddressMetadata, AddressRecord, AddressStatus, IpFamily, RecordId, Reservation, ReservationId,
};

use crate::domain::allocation::AllocationEngine;
use crate::domain::entities::{AllocationRequest, EngineConfig, ReservationRequest};
use crate::domain::errors::IpamError;
use crate::domain::reservation::ReservationManager;
use crate::ports::inbound::IpamApi;
use crate::ports::outbound::{AuditRecorder, RecordStore, TimeSource};

/// The allocation engine and reservation manager behind one API surface.
pub struct IpamService<S, A, T> {
    allocation: AllocationEngine<S, A, T>,
    reservations: ReservationManager<S, A, T>,
}

impl<S, A, T> IpamService<S, A, T>
where
    S: RecordStore,
    A: AuditRecorder,
    T: TimeSource,
{
    /// Wires the service over its collaborators.
    pub fn new(store: Arc<S>, audit: Arc<A>, clock: Arc<T>, config: EngineConfig) -> Self {
        Self {
            allocation: AllocationEngine::new(
                store.clone(),
                audit.clone(),
                clock.clone(),
                config.clone(),
            ),
            reservations: ReservationManager::new(store, audit, clock, config),
        }
    }
}

/// Parses a network address and checks it against the expected family.
fn parse_network(network: &str, family: IpFamily) -> Result<IpNumber, IpamError> {
    let parsed = IpNumber::parse(network)?;
    if parsed.family() != family {
        return Err(IpamError::FamilyMismatch {
            expected: family,
            actual: parsed.family(),
            address: network.to_string(),
        });
    }
    Ok(parsed)
}

impl<S, A, T> IpamApi for IpamService<S, A, T>
where
    S: RecordStore,
    A: AuditRecorder,
    T: TimeSource,
{
    fn allocate(&self, request: AllocationRequest) -> Result<AddressRecord, IpamError> {
        self.allocation.allocate(request)
    }

    fn release(&self, record_id: RecordId, actor: &str) -> Result<AddressRecord, IpamError> {
        self.allocation.release(record_id, actor)
    }

    fn update_metadata(
        &self,
        record_id: RecordId,
        metadata: AddressMetadata,
        status: Option<AddressStatus>,
        actor: &str,
    ) -> Result<AddressRecord, IpamError> {
        self.allocation
            .update_metadata(record_id, metadata, status, actor)
    }

    fn reserve_range(&self, request: ReservationRequest) -> Result<Reservation, IpamError> {
        self.reservations.create(request)
    }

    fn delete_reservation(
        &self,
        reservation_id: ReservationId,
        actor: &str,
    ) -> Result<u64, IpamError> {
        self.reservations.delete(reservation_id, actor)
    }

    fn compute_range(
        &self,
        network: &str,
        prefix: u8,
        family: IpFamily,
    ) -> Result<SubnetRange, IpamError> {
        let network = parse_network(network, family)?;
        Ok(subnet_range(network, prefix)?)
    }

    fn is_in_subnet(
        &self,
        address: &str,
        network: &str,
        prefix: u8,
        family: IpFamily,
    ) -> Result<bool, IpamError> {
        let address = IpNumber::parse(address)?;
        let network = parse_network(network, family)?;
        Ok(contains(address, network, prefix)?)
    }
}

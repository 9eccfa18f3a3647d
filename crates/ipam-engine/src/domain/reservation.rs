//! # Reservation Manager
//!
//! Validates and materializes contiguous range reservations, detecting
//! conflicts against already-occupied addresses.
//!
//! A reservation is represented two ways at once: as a first-class
//! `[start, end]` interval consulted by the allocator, and as individual
//! `Reserved` records materialized up to a fixed cap. The cap keeps IPv6
//! reservations affordable; members beyond it are covered by the interval
//! alone and never receive a record until promoted.

use std::sync::Arc;

use tracing::{debug, info};

use ipam_address_model::{subnet_range, IpNumber};
use shared_types::{
    AddressMetadata, AddressRecord, AddressStatus, AuditEvent, Reservation, ReservationId, Subnet,
};

use crate::domain::entities::{EngineConfig, ReservationRequest};
use crate::domain::errors::{IpamError, StoreError};
use crate::ports::outbound::{AuditRecorder, RecordStore, TimeSource};

/// Statuses a reservation range may not overlap.
const CONFLICTING: [AddressStatus; 3] = [
    AddressStatus::Assigned,
    AddressStatus::DhcpManaged,
    AddressStatus::StaticManaged,
];

/// Range reservation create/delete operations.
pub struct ReservationManager<S, A, T> {
    store: Arc<S>,
    audit: Arc<A>,
    clock: Arc<T>,
    config: EngineConfig,
}

impl<S, A, T> ReservationManager<S, A, T>
where
    S: RecordStore,
    A: AuditRecorder,
    T: TimeSource,
{
    /// Creates a manager over the given collaborators.
    pub fn new(store: Arc<S>, audit: Arc<A>, clock: Arc<T>, config: EngineConfig) -> Self {
        Self {
            store,
            audit,
            clock,
            config,
        }
    }

    /// Creates a reservation over `[start, end]`, materializing `Reserved`
    /// records up to the configured cap.
    pub fn create(&self, request: ReservationRequest) -> Result<Reservation, IpamError> {
        let subnet = self
            .store
            .subnet(request.subnet_id)?
            .ok_or(IpamError::SubnetNotFound(request.subnet_id))?;

        let start = self.validate_endpoint(&subnet, &request.start)?;
        let end = self.validate_endpoint(&subnet, &request.end)?;
        if start.value() > end.value() {
            return Err(IpamError::InvalidOrder {
                start: start.to_text(),
                end: end.to_text(),
            });
        }

        let conflicts = self
            .store
            .records_in_range(subnet.id, start, end, &CONFLICTING)?;
        if !conflicts.is_empty() {
            return Err(IpamError::RangeConflict {
                addresses: conflicts.into_iter().map(|r| r.address).collect(),
            });
        }

        let now = self.clock.now_ms();
        let mut reservation = Reservation::new(subnet.id, start.to_text(), end.to_text(), now);
        reservation.purpose = request.purpose;
        reservation.owner = request.owner;
        reservation.expires_at = request.expires_at;

        self.store.insert_reservation(reservation.clone())?;
        let materialized = self.materialize(&subnet, start, end, now)?;

        self.audit.record(AuditEvent::reservation_created(
            &request.actor,
            now,
            reservation.clone(),
        ))?;
        info!(
            subnet = %subnet.id,
            reservation = %reservation.id,
            start = %reservation.start_address,
            end = %reservation.end_address,
            materialized,
            "reservation created"
        );
        Ok(reservation)
    }

    /// Deletes a reservation, transitioning every still-`Reserved` member
    /// back to available. Members promoted to a stronger status are left
    /// untouched. Returns the released count.
    pub fn delete(&self, id: ReservationId, actor: &str) -> Result<u64, IpamError> {
        let reservation = self
            .store
            .reservation(id)?
            .ok_or(IpamError::ReservationNotFound(id))?;

        let start = IpNumber::parse(&reservation.start_address)?;
        let end = IpNumber::parse(&reservation.end_address)?;
        let now = self.clock.now_ms();

        let released = self.store.bulk_transition(
            reservation.subnet_id,
            start,
            end,
            AddressStatus::Reserved,
            AddressStatus::Available,
            now,
        )?;
        self.store.remove_reservation(id)?;

        self.audit.record(AuditEvent::reservation_deleted(
            actor,
            now,
            reservation.clone(),
            released,
        ))?;
        info!(
            subnet = %reservation.subnet_id,
            reservation = %id,
            released,
            "reservation deleted"
        );
        Ok(released)
    }

    /// Parses one endpoint and checks family and usable-range membership.
    fn validate_endpoint(&self, subnet: &Subnet, text: &str) -> Result<IpNumber, IpamError> {
        let endpoint = IpNumber::parse(text)?;
        if endpoint.family() != subnet.family {
            return Err(IpamError::FamilyMismatch {
                expected: subnet.family,
                actual: endpoint.family(),
                address: text.to_string(),
            });
        }
        let network = IpNumber::parse(&subnet.network)?;
        let range = subnet_range(network, subnet.prefix)?;
        if !range.covers(endpoint) {
            return Err(IpamError::OutOfRange {
                address: endpoint.to_text(),
                cidr: subnet.cidr(),
            });
        }
        Ok(endpoint)
    }

    /// Materializes `Reserved` records ascending from `start`, stopping at
    /// the cap. Claims go through the store's uniqueness arbitration: a
    /// member concurrently claimed since the conflict check is skipped
    /// rather than failing the whole reservation.
    fn materialize(
        &self,
        subnet: &Subnet,
        start: IpNumber,
        end: IpNumber,
        now: shared_types::Timestamp,
    ) -> Result<u64, IpamError> {
        let cap = self.config.reservation_materialization_cap;
        let mut materialized = 0u64;
        let mut current = start;

        loop {
            if materialized >= cap {
                debug!(
                    subnet = %subnet.id,
                    cap,
                    "materialization cap reached, remaining members covered by interval"
                );
                break;
            }
            let record = AddressRecord::new(
                current.to_text(),
                subnet.id,
                AddressStatus::Reserved,
                AddressMetadata::default(),
                now,
            );
            match self.store.claim_address(record) {
                Ok(_) => materialized += 1,
                Err(StoreError::UniquenessViolation { address, status }) => {
                    debug!(%address, %status, "member already claimed, skipping");
                }
                Err(err) => return Err(err.into()),
            }

            if current.value() == end.value() {
                break;
            }
            current = match current.succ() {
                Some(next) => next,
                None => break,
            };
        }
        Ok(materialized)
    }
}

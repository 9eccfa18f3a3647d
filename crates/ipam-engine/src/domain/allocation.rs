//! # Allocation Engine
//!
//! First-fit automatic allocation and validated manual assignment over the
//! abstract record store.
//!
//! The engine is optimistic about races: the scan over the occupied set is
//! check-then-act, and the store's address-uniqueness constraint is the
//! single source of truth. A failed claim is a recoverable conflict that
//! triggers a bounded rescan, never an immediate error.
//!
//! Every scan carries an explicit iteration budget: IPv6 usable ranges can
//! be astronomically large, and "no gap found within the budget" is a
//! different statement than "the subnet is exhausted". The engine only
//! reports exhaustion when the scan provably covered the whole usable
//! range.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use ipam_address_model::{subnet_range, IpNumber, SubnetRange};
use shared_types::{
    AddressMetadata, AddressRecord, AddressStatus, AuditAction, AuditEvent, RecordId, Subnet,
    Timestamp,
};

use crate::domain::entities::{AllocationRequest, EngineConfig};
use crate::domain::errors::{IpamError, StoreError};
use crate::domain::status;
use crate::ports::outbound::{AuditRecorder, RecordStore, TimeSource};

/// Outcome of one bounded first-fit scan.
enum ScanOutcome {
    /// The numerically smallest free address.
    Found(IpNumber),
    /// The scan covered the whole usable range without finding a gap.
    Exhausted,
    /// The iteration budget ran out before the range did.
    BudgetExceeded,
}

/// Allocation, release, and metadata-update operations.
pub struct AllocationEngine<S, A, T> {
    store: Arc<S>,
    audit: Arc<A>,
    clock: Arc<T>,
    config: EngineConfig,
}

impl<S, A, T> AllocationEngine<S, A, T>
where
    S: RecordStore,
    A: AuditRecorder,
    T: TimeSource,
{
    /// Creates an engine over the given collaborators.
    pub fn new(store: Arc<S>, audit: Arc<A>, clock: Arc<T>, config: EngineConfig) -> Self {
        Self {
            store,
            audit,
            clock,
            config,
        }
    }

    /// Allocates an address per the request: manual when an address is
    /// supplied, first-fit automatic otherwise. The target status defaults
    /// to `Assigned` and must be an occupied status.
    pub fn allocate(&self, request: AllocationRequest) -> Result<AddressRecord, IpamError> {
        let subnet = self
            .store
            .subnet(request.subnet_id)?
            .ok_or(IpamError::SubnetNotFound(request.subnet_id))?;

        let target_status = request.status.unwrap_or(AddressStatus::Assigned);
        if !target_status.is_occupied() {
            return Err(IpamError::IllegalTransition {
                from: AddressStatus::Available,
                to: target_status,
            });
        }

        let network = IpNumber::parse(&subnet.network)?;
        let range = subnet_range(network, subnet.prefix)?;

        match &request.address {
            Some(text) => self.allocate_manual(
                &subnet,
                &range,
                text,
                target_status,
                request.metadata,
                &request.actor,
            ),
            None => self.allocate_auto(&subnet, &range, target_status, request.metadata, &request.actor),
        }
    }

    /// Manual path: validate the caller-supplied address, then claim it.
    fn allocate_manual(
        &self,
        subnet: &Subnet,
        range: &SubnetRange,
        text: &str,
        target_status: AddressStatus,
        metadata: AddressMetadata,
        actor: &str,
    ) -> Result<AddressRecord, IpamError> {
        let target = IpNumber::parse(text)?;
        if target.family() != subnet.family {
            return Err(IpamError::FamilyMismatch {
                expected: subnet.family,
                actual: target.family(),
                address: text.to_string(),
            });
        }
        let canonical = target.to_text();
        if !range.covers(target) {
            return Err(IpamError::OutOfRange {
                address: canonical,
                cidr: subnet.cidr(),
            });
        }

        let now = self.clock.now_ms();
        // An active reservation covers the address even when the member has
        // no materialized record.
        if self.in_active_reservation(subnet, target, now)? {
            return Err(IpamError::AlreadyOccupied {
                address: canonical,
                status: AddressStatus::Reserved,
            });
        }
        if let Some(existing) = self.store.record_by_address(subnet.id, &canonical)? {
            if existing.status.is_occupied() {
                return Err(IpamError::AlreadyOccupied {
                    address: canonical,
                    status: existing.status,
                });
            }
        }

        let record = AddressRecord::new(canonical, subnet.id, target_status, metadata, now);
        match self.store.claim_address(record.clone()) {
            Ok(before) => {
                self.audit.record(AuditEvent::record_mutation(
                    AuditAction::Allocate,
                    actor,
                    now,
                    before,
                    record.clone(),
                ))?;
                info!(
                    subnet = %subnet.id,
                    address = %record.address,
                    status = %record.status,
                    "address assigned"
                );
                Ok(record)
            }
            // The existence check above raced a concurrent claim; the
            // store's verdict is authoritative.
            Err(StoreError::UniquenessViolation { address, status }) => {
                Err(IpamError::AlreadyOccupied { address, status })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Automatic path: bounded ascending scan for the first gap, with
    /// bounded retry when a claim loses a race.
    fn allocate_auto(
        &self,
        subnet: &Subnet,
        range: &SubnetRange,
        target_status: AddressStatus,
        metadata: AddressMetadata,
        actor: &str,
    ) -> Result<AddressRecord, IpamError> {
        if range.is_empty() {
            return Err(IpamError::SubnetExhausted);
        }

        let now = self.clock.now_ms();
        let mut occupied: HashSet<u128> = self
            .store
            .occupied_addresses(subnet.id)?
            .into_iter()
            .map(|addr| addr.value())
            .collect();
        let reserved = self.active_reservation_intervals(subnet, now)?;

        let mut attempt = 0u32;
        loop {
            let candidate = match scan_first_fit(range, &occupied, &reserved, self.config.auto_scan_budget)
            {
                ScanOutcome::Found(candidate) => candidate,
                ScanOutcome::Exhausted => return Err(IpamError::SubnetExhausted),
                ScanOutcome::BudgetExceeded => {
                    return Err(IpamError::SearchBudgetExceeded {
                        budget: self.config.auto_scan_budget,
                    })
                }
            };

            let record = AddressRecord::new(
                candidate.to_text(),
                subnet.id,
                target_status,
                metadata.clone(),
                now,
            );
            match self.store.claim_address(record.clone()) {
                Ok(before) => {
                    self.audit.record(AuditEvent::record_mutation(
                        AuditAction::Allocate,
                        actor,
                        now,
                        before,
                        record.clone(),
                    ))?;
                    info!(
                        subnet = %subnet.id,
                        address = %record.address,
                        status = %record.status,
                        "address assigned"
                    );
                    return Ok(record);
                }
                Err(StoreError::UniquenessViolation { .. }) => {
                    attempt += 1;
                    if attempt > self.config.conflict_retry_limit {
                        // Retries are spent; the engine still cannot prove
                        // exhaustion, so the budget outcome stands.
                        return Err(IpamError::SearchBudgetExceeded {
                            budget: self.config.auto_scan_budget,
                        });
                    }
                    warn!(
                        subnet = %subnet.id,
                        address = %candidate,
                        attempt,
                        "claim lost a concurrent race, rescanning"
                    );
                    occupied.insert(candidate.value());
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Releases a record back to available, clearing metadata. Releasing
    /// an already-available record is a no-op success without an audit
    /// entry (nothing mutated).
    pub fn release(&self, record_id: RecordId, actor: &str) -> Result<AddressRecord, IpamError> {
        let mut record = self
            .store
            .record_by_id(record_id)?
            .ok_or(IpamError::RecordNotFound(record_id))?;

        if record.status == AddressStatus::Available {
            debug!(address = %record.address, "release of available address is a no-op");
            return Ok(record);
        }

        let now = self.clock.now_ms();
        let before = record.clone();
        status::transition(&mut record, AddressStatus::Available, now)?;
        self.store.update_record(record.clone())?;
        self.audit.record(AuditEvent::record_mutation(
            AuditAction::Release,
            actor,
            now,
            Some(before),
            record.clone(),
        ))?;
        info!(subnet = %record.subnet_id, address = %record.address, "address released");
        Ok(record)
    }

    /// Replaces a record's metadata and optionally its status. This is the
    /// only path that may move a record between two occupied statuses.
    pub fn update_metadata(
        &self,
        record_id: RecordId,
        metadata: AddressMetadata,
        new_status: Option<AddressStatus>,
        actor: &str,
    ) -> Result<AddressRecord, IpamError> {
        let mut record = self
            .store
            .record_by_id(record_id)?
            .ok_or(IpamError::RecordNotFound(record_id))?;

        let now = self.clock.now_ms();
        let before = record.clone();
        record.metadata = metadata;
        match new_status {
            // Moving to Available under the update rule still clears the
            // metadata, including what this request supplied.
            Some(to) => status::transition_for_update(&mut record, to, now),
            None => record.updated_at = now,
        }

        self.store.update_record(record.clone())?;
        self.audit.record(AuditEvent::record_mutation(
            AuditAction::UpdateMetadata,
            actor,
            now,
            Some(before),
            record.clone(),
        ))?;
        info!(subnet = %record.subnet_id, address = %record.address, status = %record.status, "record updated");
        Ok(record)
    }

    fn in_active_reservation(
        &self,
        subnet: &Subnet,
        address: IpNumber,
        now: Timestamp,
    ) -> Result<bool, IpamError> {
        let intervals = self.active_reservation_intervals(subnet, now)?;
        Ok(covered(&intervals, address.value()))
    }

    /// Numeric `[start, end]` intervals of the subnet's active
    /// reservations. Consulted directly by the allocator so that members
    /// beyond the materialization cap are still never selected.
    fn active_reservation_intervals(
        &self,
        subnet: &Subnet,
        now: Timestamp,
    ) -> Result<Vec<(u128, u128)>, IpamError> {
        let mut intervals = Vec::new();
        for reservation in self.store.reservations_for_subnet(subnet.id)? {
            if !reservation.is_active(now) {
                continue;
            }
            let start = IpNumber::parse(&reservation.start_address)?;
            let end = IpNumber::parse(&reservation.end_address)?;
            intervals.push((start.value(), end.value()));
        }
        Ok(intervals)
    }
}

fn covered(intervals: &[(u128, u128)], value: u128) -> bool {
    intervals
        .iter()
        .any(|(start, end)| *start <= value && value <= *end)
}

/// Ascending first-fit scan from `range.first`, skipping occupied values
/// and active reservation intervals, examining at most `budget` candidates.
///
/// A candidate inside a reservation interval advances the scan past the
/// interval's end in one step, so a wide IPv6 reservation costs one
/// candidate from the budget rather than its whole width.
fn scan_first_fit(
    range: &SubnetRange,
    occupied: &HashSet<u128>,
    reserved: &[(u128, u128)],
    budget: u64,
) -> ScanOutcome {
    let family = range.first.family();
    let last = range.last.value();
    let mut current = range.first.value();
    let mut examined = 0u64;

    loop {
        if examined >= budget {
            return ScanOutcome::BudgetExceeded;
        }
        examined += 1;

        if let Some(end) = covering_end(reserved, current) {
            if end >= last {
                return ScanOutcome::Exhausted;
            }
            current = end + 1;
            continue;
        }
        if !occupied.contains(&current) {
            let found = match family {
                shared_types::IpFamily::V4 => IpNumber::from_v4(current as u32),
                shared_types::IpFamily::V6 => IpNumber::from_v6(current),
            };
            return ScanOutcome::Found(found);
        }
        if current == last {
            return ScanOutcome::Exhausted;
        }
        current += 1;
    }
}

/// Largest interval end among intervals covering `value`, if any.
fn covering_end(intervals: &[(u128, u128)], value: u128) -> Option<u128> {
    intervals
        .iter()
        .filter(|(start, end)| *start <= value && value <= *end)
        .map(|(_, end)| *end)
        .max()
}

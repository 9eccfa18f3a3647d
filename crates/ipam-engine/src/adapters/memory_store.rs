//! In-memory implementation of [`RecordStore`].
//!
//! The reference store and the test backbone. Records are indexed by id
//! and, per subnet, by numeric address in a `BTreeMap`, which makes range
//! queries and bulk transitions ordered walks. The address-uniqueness
//! constraint lives in [`InMemoryRecordStore::claim_address`], taken under
//! the write lock, making it atomic relative to concurrent callers.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use ipam_address_model::IpNumber;
use shared_types::{
    AddressRecord, AddressStatus, RecordId, Reservation, ReservationId, Subnet, SubnetId,
    Timestamp,
};

use crate::domain::errors::StoreError;
use crate::ports::outbound::RecordStore;

#[derive(Default)]
struct Inner {
    subnets: HashMap<SubnetId, Subnet>,
    records: HashMap<RecordId, AddressRecord>,
    /// Per-subnet index: numeric address value -> record id.
    by_address: HashMap<SubnetId, BTreeMap<u128, RecordId>>,
    reservations: HashMap<ReservationId, Reservation>,
}

/// Thread-safe in-memory record store.
#[derive(Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<Inner>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".into()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".into()))
    }
}

/// Numeric key of a record's canonical address.
fn address_key(address: &str) -> Result<u128, StoreError> {
    IpNumber::parse(address)
        .map(IpNumber::value)
        .map_err(|err| StoreError::Backend(format!("unparsable record address: {err}")))
}

impl RecordStore for InMemoryRecordStore {
    fn subnet(&self, id: SubnetId) -> Result<Option<Subnet>, StoreError> {
        Ok(self.read()?.subnets.get(&id).cloned())
    }

    fn insert_subnet(&self, subnet: Subnet) -> Result<(), StoreError> {
        self.write()?.subnets.insert(subnet.id, subnet);
        Ok(())
    }

    fn record_by_id(&self, id: RecordId) -> Result<Option<AddressRecord>, StoreError> {
        Ok(self.read()?.records.get(&id).cloned())
    }

    fn record_by_address(
        &self,
        subnet_id: SubnetId,
        address: &str,
    ) -> Result<Option<AddressRecord>, StoreError> {
        let key = address_key(address)?;
        let inner = self.read()?;
        Ok(inner
            .by_address
            .get(&subnet_id)
            .and_then(|index| index.get(&key))
            .and_then(|id| inner.records.get(id))
            .cloned())
    }

    fn occupied_addresses(&self, subnet_id: SubnetId) -> Result<Vec<IpNumber>, StoreError> {
        let inner = self.read()?;
        let Some(index) = inner.by_address.get(&subnet_id) else {
            return Ok(Vec::new());
        };
        let mut occupied = Vec::new();
        for id in index.values() {
            if let Some(record) = inner.records.get(id) {
                if record.status.is_occupied() {
                    occupied.push(
                        IpNumber::parse(&record.address).map_err(|err| {
                            StoreError::Backend(format!("unparsable record address: {err}"))
                        })?,
                    );
                }
            }
        }
        Ok(occupied)
    }

    fn records_in_range(
        &self,
        subnet_id: SubnetId,
        start: IpNumber,
        end: IpNumber,
        statuses: &[AddressStatus],
    ) -> Result<Vec<AddressRecord>, StoreError> {
        let inner = self.read()?;
        let Some(index) = inner.by_address.get(&subnet_id) else {
            return Ok(Vec::new());
        };
        let mut matches = Vec::new();
        for id in index.range(start.value()..=end.value()).map(|(_, id)| id) {
            if let Some(record) = inner.records.get(id) {
                if statuses.contains(&record.status) {
                    matches.push(record.clone());
                }
            }
        }
        Ok(matches)
    }

    fn claim_address(
        &self,
        record: AddressRecord,
    ) -> Result<Option<AddressRecord>, StoreError> {
        let key = address_key(&record.address)?;
        let mut guard = self.write()?;
        let inner = &mut *guard;
        let index = inner.by_address.entry(record.subnet_id).or_default();

        match index.get(&key) {
            Some(existing_id) => {
                let existing_id = *existing_id;
                let existing = inner.records.get(&existing_id).ok_or_else(|| {
                    StoreError::Backend("address index points at a missing record".into())
                })?;
                if existing.status.is_occupied() {
                    return Err(StoreError::UniquenessViolation {
                        address: existing.address.clone(),
                        status: existing.status,
                    });
                }
                // Replace the available record; its history lives on in
                // the audit trail via the returned snapshot.
                let previous = inner.records.remove(&existing_id);
                index.insert(key, record.id);
                inner.records.insert(record.id, record);
                Ok(previous)
            }
            None => {
                index.insert(key, record.id);
                inner.records.insert(record.id, record);
                Ok(None)
            }
        }
    }

    fn update_record(&self, record: AddressRecord) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        match inner.records.get_mut(&record.id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(StoreError::MissingRecord(record.id)),
        }
    }

    fn bulk_transition(
        &self,
        subnet_id: SubnetId,
        start: IpNumber,
        end: IpNumber,
        from: AddressStatus,
        to: AddressStatus,
        now: Timestamp,
    ) -> Result<u64, StoreError> {
        let mut guard = self.write()?;
        let inner = &mut *guard;
        let Some(index) = inner.by_address.get(&subnet_id) else {
            return Ok(0);
        };

        let ids: Vec<RecordId> = index
            .range(start.value()..=end.value())
            .map(|(_, id)| *id)
            .collect();

        let mut transitioned = 0u64;
        for id in ids {
            if let Some(record) = inner.records.get_mut(&id) {
                if record.status == from {
                    record.status = to;
                    if !to.is_occupied() {
                        record.metadata.clear();
                    }
                    record.updated_at = now;
                    transitioned += 1;
                }
            }
        }
        Ok(transitioned)
    }

    fn insert_reservation(&self, reservation: Reservation) -> Result<(), StoreError> {
        self.write()?
            .reservations
            .insert(reservation.id, reservation);
        Ok(())
    }

    fn reservation(&self, id: ReservationId) -> Result<Option<Reservation>, StoreError> {
        Ok(self.read()?.reservations.get(&id).cloned())
    }

    fn remove_reservation(
        &self,
        id: ReservationId,
    ) -> Result<Option<Reservation>, StoreError> {
        Ok(self.write()?.reservations.remove(&id))
    }

    fn reservations_for_subnet(
        &self,
        subnet_id: SubnetId,
    ) -> Result<Vec<Reservation>, StoreError> {
        Ok(self
            .read()?
            .reservations
            .values()
            .filter(|r| r.subnet_id == subnet_id)
            .cloned()
            .collect())
    }
}

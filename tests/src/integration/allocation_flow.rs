//! End-to-end allocation flows through the `IpamApi` surface.

#[cfg(test)]
mod tests {
    use crate::{harness, v4_harness};
    use ipam_engine::{
        AllocationRequest, EngineConfig, IpamApi, IpamError, RecordStore,
    };
    use shared_types::{AddressMetadata, AddressStatus, IpFamily};

    #[test]
    fn test_first_fit_skips_occupied_addresses() {
        let hx = v4_harness();
        for addr in ["192.168.1.1", "192.168.1.5", "192.168.1.10"] {
            hx.service
                .allocate(AllocationRequest::manual(hx.subnet.id, addr, "seed"))
                .unwrap();
        }

        let record = hx
            .service
            .allocate(AllocationRequest::automatic(hx.subnet.id, "alice"))
            .unwrap();
        assert_eq!(record.address, "192.168.1.2");
    }

    #[test]
    fn test_sequential_automatic_allocation_is_ascending() {
        let hx = v4_harness();
        let mut previous = 0u32;
        for _ in 0..10 {
            let record = hx
                .service
                .allocate(AllocationRequest::automatic(hx.subnet.id, "alice"))
                .unwrap();
            let value = ipam_address_model::parse_v4(&record.address).unwrap();
            assert!(value > previous, "{} not ascending", record.address);
            previous = value;
        }
    }

    #[test]
    fn test_manual_allocation_with_metadata() {
        let hx = v4_harness();
        let metadata = AddressMetadata::new()
            .with_hostname("db-01.internal")
            .with_hardware_address("02:00:00:aa:bb:cc")
            .with_device_name("db-01")
            .with_assignee("storage-team")
            .with_note("primary replica");

        let record = hx
            .service
            .allocate(
                AllocationRequest::manual(hx.subnet.id, "192.168.1.50", "bob")
                    .with_status(AddressStatus::StaticManaged)
                    .with_metadata(metadata.clone()),
            )
            .unwrap();
        assert_eq!(record.status, AddressStatus::StaticManaged);
        assert_eq!(record.metadata, metadata);

        // The record is reachable by id and by canonical address.
        let by_id = hx.store.record_by_id(record.id).unwrap().unwrap();
        assert_eq!(by_id, record);
        let by_addr = hx
            .store
            .record_by_address(hx.subnet.id, "192.168.1.50")
            .unwrap()
            .unwrap();
        assert_eq!(by_addr, record);
    }

    #[test]
    fn test_release_then_reuse_lifecycle() {
        let hx = v4_harness();
        let record = hx
            .service
            .allocate(
                AllocationRequest::automatic(hx.subnet.id, "alice").with_metadata(
                    AddressMetadata::new()
                        .with_hostname("ephemeral")
                        .with_assignee("ci"),
                ),
            )
            .unwrap();

        let released = hx.service.release(record.id, "alice").unwrap();
        assert_eq!(released.status, AddressStatus::Available);
        assert!(released.metadata.is_empty());

        // Releasing again is a no-op success, not an error.
        let again = hx.service.release(record.id, "alice").unwrap();
        assert_eq!(again.status, AddressStatus::Available);

        // The freed address is the next first-fit candidate.
        let reused = hx
            .service
            .allocate(AllocationRequest::automatic(hx.subnet.id, "carol"))
            .unwrap();
        assert_eq!(reused.address, record.address);
    }

    #[test]
    fn test_unknown_subnet_is_not_found() {
        let hx = v4_harness();
        let ghost = shared_types::SubnetId::new();
        assert_eq!(
            hx.service
                .allocate(AllocationRequest::automatic(ghost, "alice"))
                .unwrap_err(),
            IpamError::SubnetNotFound(ghost)
        );
    }

    #[test]
    fn test_ipv6_allocation_uses_canonical_keys() {
        let hx = harness("2001:db8::", 64, IpFamily::V6, EngineConfig::default());

        let record = hx
            .service
            .allocate(AllocationRequest::manual(
                hx.subnet.id,
                "2001:0DB8:0000:0000:0000:0000:0000:00aa",
                "alice",
            ))
            .unwrap();
        assert_eq!(record.address, "2001:db8::aa");

        // The compressed spelling is the same record key.
        let err = hx
            .service
            .allocate(AllocationRequest::manual(
                hx.subnet.id,
                "2001:db8::aa",
                "bob",
            ))
            .unwrap_err();
        assert!(matches!(err, IpamError::AlreadyOccupied { .. }));
    }

    #[test]
    fn test_ipv6_budget_outcome_is_not_exhaustion() {
        let config = EngineConfig {
            auto_scan_budget: 8,
            ..EngineConfig::default()
        };
        let hx = harness("2001:db8::", 64, IpFamily::V6, config);
        for i in 1..=8u32 {
            hx.service
                .allocate(AllocationRequest::manual(
                    hx.subnet.id,
                    format!("2001:db8::{i:x}"),
                    "seed",
                ))
                .unwrap();
        }

        let err = hx
            .service
            .allocate(AllocationRequest::automatic(hx.subnet.id, "alice"))
            .unwrap_err();
        assert_eq!(err, IpamError::SearchBudgetExceeded { budget: 8 });
    }

    #[test]
    fn test_metadata_update_and_promotion_through_api() {
        let hx = v4_harness();
        let record = hx
            .service
            .allocate(
                AllocationRequest::manual(hx.subnet.id, "192.168.1.60", "ops")
                    .with_status(AddressStatus::Reserved),
            )
            .unwrap();

        let promoted = hx
            .service
            .update_metadata(
                record.id,
                AddressMetadata::new().with_hostname("printer-2"),
                Some(AddressStatus::Assigned),
                "ops",
            )
            .unwrap();
        assert_eq!(promoted.status, AddressStatus::Assigned);
        assert_eq!(promoted.metadata.hostname.as_deref(), Some("printer-2"));

        // Unknown record id is a typed NotFound.
        let missing = shared_types::RecordId::new();
        assert_eq!(
            hx.service
                .update_metadata(missing, AddressMetadata::new(), None, "ops")
                .unwrap_err(),
            IpamError::RecordNotFound(missing)
        );
    }

    #[test]
    fn test_audit_trail_matches_mutations() {
        let hx = v4_harness();
        let record = hx
            .service
            .allocate(AllocationRequest::automatic(hx.subnet.id, "alice"))
            .unwrap();
        hx.service.release(record.id, "alice").unwrap();
        // A failed operation emits nothing.
        let _ = hx
            .service
            .allocate(AllocationRequest::manual(hx.subnet.id, "bogus", "alice"));

        let events = hx.audit.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].actor, "alice");
        assert!(events[0].before.is_none());
        assert_eq!(
            events[0].after.as_ref().map(|r| r.status),
            Some(AddressStatus::Assigned)
        );
        // The release event snapshots both sides of the transition.
        assert_eq!(
            events[1].before.as_ref().map(|r| r.status),
            Some(AddressStatus::Assigned)
        );
        assert_eq!(
            events[1].after.as_ref().map(|r| r.status),
            Some(AddressStatus::Available)
        );
    }
}

//! Range reservation flows through the `IpamApi` surface.

#[cfg(test)]
mod tests {
    use crate::{harness, v4_harness};
    use ipam_address_model::IpNumber;
    use ipam_engine::{
        AllocationRequest, EngineConfig, IpamApi, IpamError, RecordStore, ReservationRequest,
    };
    use shared_types::{AddressMetadata, AddressStatus, IpFamily};

    #[test]
    fn test_allocator_never_enters_active_reservation() {
        let hx = v4_harness();
        hx.service
            .reserve_range(
                ReservationRequest::new(
                    hx.subnet.id,
                    "192.168.1.100",
                    "192.168.1.150",
                    "ops",
                )
                .with_purpose("voip phones"),
            )
            .unwrap();

        // Fill everything below the reservation, then keep allocating; the
        // allocator must step over the whole reserved window.
        for _ in 0..99 {
            let record = hx
                .service
                .allocate(AllocationRequest::automatic(hx.subnet.id, "alice"))
                .unwrap();
            let value = ipam_address_model::parse_v4(&record.address).unwrap();
            assert!(
                !(0xC0A8_0164..=0xC0A8_0196).contains(&value),
                "{} lies inside the reservation",
                record.address
            );
        }
        let next = hx
            .service
            .allocate(AllocationRequest::automatic(hx.subnet.id, "alice"))
            .unwrap();
        assert_eq!(next.address, "192.168.1.151");
    }

    #[test]
    fn test_uncapped_ipv6_reservation_blocks_unmaterialized_members() {
        let config = EngineConfig {
            reservation_materialization_cap: 10,
            ..EngineConfig::default()
        };
        let hx = harness("2001:db8::", 64, IpFamily::V6, config);
        // A range far wider than the cap: only 10 records materialize.
        hx.service
            .reserve_range(ReservationRequest::new(
                hx.subnet.id,
                "2001:db8::1",
                "2001:db8::ffff",
                "ops",
            ))
            .unwrap();

        let record = hx
            .service
            .allocate(AllocationRequest::automatic(hx.subnet.id, "alice"))
            .unwrap();
        // First address past the reservation, well beyond any record.
        assert_eq!(record.address, "2001:db8::1:0");
    }

    #[test]
    fn test_manual_allocation_respects_reservation_interval() {
        let config = EngineConfig {
            reservation_materialization_cap: 2,
            ..EngineConfig::default()
        };
        let hx = harness("10.0.0.0", 24, IpFamily::V4, config);
        hx.service
            .reserve_range(ReservationRequest::new(
                hx.subnet.id,
                "10.0.0.100",
                "10.0.0.120",
                "ops",
            ))
            .unwrap();

        // 10.0.0.110 has no materialized record, but the interval covers it.
        let err = hx
            .service
            .allocate(AllocationRequest::manual(hx.subnet.id, "10.0.0.110", "bob"))
            .unwrap_err();
        assert_eq!(
            err,
            IpamError::AlreadyOccupied {
                address: "10.0.0.110".into(),
                status: AddressStatus::Reserved,
            }
        );
    }

    #[test]
    fn test_conflict_detection_lists_offenders() {
        let hx = v4_harness();
        for addr in ["192.168.1.101", "192.168.1.103"] {
            hx.service
                .allocate(AllocationRequest::manual(hx.subnet.id, addr, "seed"))
                .unwrap();
        }

        let err = hx
            .service
            .reserve_range(ReservationRequest::new(
                hx.subnet.id,
                "192.168.1.100",
                "192.168.1.110",
                "ops",
            ))
            .unwrap_err();
        assert_eq!(
            err,
            IpamError::RangeConflict {
                addresses: vec!["192.168.1.101".into(), "192.168.1.103".into()],
            }
        );
    }

    #[test]
    fn test_reserved_records_do_not_conflict_with_new_reservation() {
        // Overlapping a Reserved record is not a conflict per the
        // occupied-and-not-reservable rule; the claim simply skips it.
        let hx = v4_harness();
        hx.service
            .reserve_range(ReservationRequest::new(
                hx.subnet.id,
                "192.168.1.100",
                "192.168.1.105",
                "ops",
            ))
            .unwrap();

        let overlapping = hx
            .service
            .reserve_range(ReservationRequest::new(
                hx.subnet.id,
                "192.168.1.103",
                "192.168.1.108",
                "ops",
            ))
            .unwrap();
        assert_eq!(overlapping.start_address, "192.168.1.103");
    }

    #[test]
    fn test_delete_restores_reserved_and_keeps_promoted() {
        let hx = v4_harness();
        let reservation = hx
            .service
            .reserve_range(ReservationRequest::new(
                hx.subnet.id,
                "192.168.1.100",
                "192.168.1.109",
                "ops",
            ))
            .unwrap();

        // Promote two members before the deletion.
        for addr in ["192.168.1.102", "192.168.1.107"] {
            let member = hx
                .store
                .record_by_address(hx.subnet.id, addr)
                .unwrap()
                .unwrap();
            hx.service
                .update_metadata(
                    member.id,
                    AddressMetadata::new().with_assignee("noc"),
                    Some(AddressStatus::Assigned),
                    "ops",
                )
                .unwrap();
        }

        let released = hx.service.delete_reservation(reservation.id, "ops").unwrap();
        assert_eq!(released, 8);

        let survivors = hx
            .store
            .records_in_range(
                hx.subnet.id,
                IpNumber::parse("192.168.1.100").unwrap(),
                IpNumber::parse("192.168.1.109").unwrap(),
                &[AddressStatus::Assigned],
            )
            .unwrap();
        assert_eq!(survivors.len(), 2);

        // The freed window is allocatable again.
        for _ in 0..99 {
            hx.service
                .allocate(AllocationRequest::automatic(hx.subnet.id, "fill"))
                .unwrap();
        }
        let reclaimed = hx
            .service
            .allocate(AllocationRequest::automatic(hx.subnet.id, "alice"))
            .unwrap();
        assert_eq!(reclaimed.address, "192.168.1.100");
    }

    #[test]
    fn test_expired_reservation_is_transparent() {
        let hx = v4_harness();
        hx.service
            .reserve_range(
                ReservationRequest::new(hx.subnet.id, "192.168.1.1", "192.168.1.5", "ops")
                    .with_expiry(2_000),
            )
            .unwrap();

        // Active: the window is skipped.
        let outside = hx
            .service
            .allocate(AllocationRequest::automatic(hx.subnet.id, "alice"))
            .unwrap();
        assert_eq!(outside.address, "192.168.1.6");

        // After expiry the interval stops blocking; the materialized
        // Reserved records still do until the reservation is deleted.
        hx.clock.advance(5_000);
        let next = hx
            .service
            .allocate(AllocationRequest::automatic(hx.subnet.id, "alice"))
            .unwrap();
        assert_eq!(next.address, "192.168.1.7");
    }

    #[test]
    fn test_single_address_reservation() {
        let hx = v4_harness();
        let reservation = hx
            .service
            .reserve_range(ReservationRequest::new(
                hx.subnet.id,
                "192.168.1.200",
                "192.168.1.200",
                "ops",
            ))
            .unwrap();
        assert_eq!(reservation.start_address, reservation.end_address);

        let record = hx
            .store
            .record_by_address(hx.subnet.id, "192.168.1.200")
            .unwrap()
            .unwrap();
        assert_eq!(record.status, AddressStatus::Reserved);

        let released = hx.service.delete_reservation(reservation.id, "ops").unwrap();
        assert_eq!(released, 1);
    }
}

//! At-most-one-occupant-per-address under concurrent allocation.
//!
//! The store's uniqueness constraint is the final arbiter; these tests
//! race OS threads against one shared in-memory store.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use crate::{harness, v4_harness, Harness};
    use ipam_engine::{AllocationRequest, EngineConfig, IpamApi, IpamError};
    use shared_types::{AddressRecord, IpFamily};

    fn spawn_allocators(hx: &Harness, threads: usize, per_thread: usize) -> Vec<Result<AddressRecord, IpamError>> {
        let mut handles = Vec::new();
        for t in 0..threads {
            let service = Arc::clone(&hx.service);
            let subnet_id = hx.subnet.id;
            handles.push(thread::spawn(move || {
                let mut results = Vec::new();
                for _ in 0..per_thread {
                    results.push(
                        service.allocate(AllocationRequest::automatic(
                            subnet_id,
                            format!("worker-{t}"),
                        )),
                    );
                }
                results
            }));
        }
        handles
            .into_iter()
            .flat_map(|h| h.join().expect("allocator thread panicked"))
            .collect()
    }

    #[test]
    fn test_two_racers_one_free_address() {
        // /30 leaves exactly two usable addresses; occupy one.
        let hx = harness("10.9.0.0", 30, IpFamily::V4, EngineConfig::default());
        hx.service
            .allocate(AllocationRequest::manual(hx.subnet.id, "10.9.0.1", "seed"))
            .unwrap();

        let results = spawn_allocators(&hx, 2, 1);
        let winners: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
        let losers: Vec<_> = results.iter().filter(|r| r.is_err()).collect();

        // Exactly one winner; the loser saw a retried-and-exhausted
        // outcome, never a duplicate success.
        assert_eq!(winners.len(), 1);
        assert_eq!(losers.len(), 1);
        assert_eq!(
            winners[0].as_ref().unwrap().address,
            "10.9.0.2"
        );
        assert!(matches!(
            losers[0].as_ref().unwrap_err(),
            IpamError::SubnetExhausted
                | IpamError::SearchBudgetExceeded { .. }
                | IpamError::AlreadyOccupied { .. }
        ));
    }

    #[test]
    fn test_concurrent_allocations_are_all_distinct() {
        let hx = v4_harness();
        let results = spawn_allocators(&hx, 4, 20);

        let mut seen = HashSet::new();
        let mut successes = 0;
        for result in results {
            let record = result.expect("plenty of room in a /24");
            successes += 1;
            assert!(
                seen.insert(record.address.clone()),
                "{} allocated twice",
                record.address
            );
        }
        assert_eq!(successes, 80);
        // One audit entry per committed allocation.
        assert_eq!(hx.audit.len(), 80);
    }

    #[test]
    fn test_concurrent_manual_claims_of_same_address() {
        let hx = v4_harness();
        let results: Vec<_> = (0..4)
            .map(|i| {
                let service = Arc::clone(&hx.service);
                let subnet_id = hx.subnet.id;
                thread::spawn(move || {
                    service.allocate(AllocationRequest::manual(
                        subnet_id,
                        "192.168.1.77",
                        format!("claimant-{i}"),
                    ))
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().expect("claimant thread panicked"))
            .collect();

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        for result in results.iter().filter(|r| r.is_err()) {
            assert!(matches!(
                result.as_ref().unwrap_err(),
                IpamError::AlreadyOccupied { .. }
            ));
        }
    }
}

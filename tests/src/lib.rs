//! # IPAM Engine Test Suite
//!
//! Unified test crate containing:
//!
//! ```text
//! tests/src/
//! └── integration/      # Cross-crate flows
//!     ├── allocation_flow.rs   # First-fit, manual, release semantics
//!     ├── reservation_flow.rs  # Range reservations end to end
//!     ├── concurrency.rs       # At-most-one-occupant races
//!     └── codec_properties.rs  # Sampled round-trip properties
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ipam-tests
//! cargo test -p ipam-tests integration::concurrency
//! ```

#![allow(dead_code)]

pub mod integration;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Once};

use ipam_engine::{
    EngineConfig, InMemoryAuditLog, InMemoryRecordStore, IpamService, TimeSource,
};
use shared_types::{IpFamily, Subnet, Timestamp};

/// Initializes a test subscriber once; honors `RUST_LOG`.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Deterministic, advanceable clock for integration tests.
pub struct FixedClock(AtomicU64);

impl FixedClock {
    pub fn new(initial: Timestamp) -> Self {
        Self(AtomicU64::new(initial))
    }

    pub fn advance(&self, ms: u64) {
        self.0.fetch_add(ms, Ordering::SeqCst);
    }
}

impl TimeSource for FixedClock {
    fn now_ms(&self) -> Timestamp {
        self.0.load(Ordering::SeqCst)
    }
}

/// Service type every integration test drives.
pub type TestService = IpamService<InMemoryRecordStore, InMemoryAuditLog, FixedClock>;

/// A wired service plus handles on its collaborators.
pub struct Harness {
    pub service: Arc<TestService>,
    pub store: Arc<InMemoryRecordStore>,
    pub audit: Arc<InMemoryAuditLog>,
    pub clock: Arc<FixedClock>,
    pub subnet: Subnet,
}

/// Builds a service over an in-memory store with one declared subnet.
pub fn harness(network: &str, prefix: u8, family: IpFamily, config: EngineConfig) -> Harness {
    init_tracing();
    let store = Arc::new(InMemoryRecordStore::new());
    let audit = Arc::new(InMemoryAuditLog::new());
    let clock = Arc::new(FixedClock::new(1_000));
    let subnet = Subnet::new(network, prefix, family);
    ipam_engine::RecordStore::insert_subnet(store.as_ref(), subnet.clone())
        .expect("declare subnet");
    let service = Arc::new(IpamService::new(
        store.clone(),
        audit.clone(),
        clock.clone(),
        config,
    ));
    Harness {
        service,
        store,
        audit,
        clock,
        subnet,
    }
}

/// Default IPv4 /24 harness.
pub fn v4_harness() -> Harness {
    harness("192.168.1.0", 24, IpFamily::V4, EngineConfig::default())
}

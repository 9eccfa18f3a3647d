//! # IPAM Allocation Engine
//!
//! Assigns, reserves, and releases individual IP addresses drawn from
//! declared subnets, tracking each address's occupancy status. Supports
//! 32-bit (IPv4) and 128-bit (IPv6) address families.
//!
//! ## Operations
//!
//! | Operation | Path |
//! |-----------|------|
//! | `allocate` | first-fit automatic, or validated manual assignment |
//! | `release` | back to available, metadata cleared |
//! | `update_metadata` | in-place update, the only occupied -> occupied path |
//! | `reserve_range` | interval + capped `Reserved` materialization |
//! | `delete_reservation` | bulk restore of still-`Reserved` members |
//! | `compute_range` / `is_in_subnet` | pure subnet calculator queries |
//!
//! ## Status Machine
//!
//! ```text
//! [Available] ──allocate/reserve──→ [Assigned | Reserved | DhcpManaged | StaticManaged]
//!      ↑                                          │
//!      └────────── release / reservation delete ──┘
//! ```
//!
//! ## Concurrency
//!
//! Allocation is optimistic: scans are check-then-act and the record
//! store's address-uniqueness constraint is the final arbiter. A lost
//! claim triggers a bounded rescan rather than an error. Every scan over
//! an address range carries an explicit iteration budget, because IPv6
//! usable ranges cannot be exhaustively enumerated; "no gap within the
//! budget" and "subnet exhausted" are distinct outcomes.
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - in-memory record store, audit log adapters         │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - IpamApi trait                              │
//! │  ports/outbound.rs - RecordStore, AuditRecorder, TimeSource     │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/allocation.rs  - AllocationEngine (first-fit, retry)    │
//! │  domain/reservation.rs - ReservationManager (interval + cap)    │
//! │  domain/status.rs      - status machine and release semantics   │
//! │  domain/entities.rs    - EngineConfig, operation requests       │
//! │  domain/errors.rs      - IpamError taxonomy                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryAuditLog, InMemoryRecordStore, TracingAuditRecorder};
pub use domain::{
    AllocationEngine, AllocationRequest, AuditError, EngineConfig, IpamError, ReservationManager,
    ReservationRequest, StoreError,
};
pub use ports::{AuditRecorder, IpamApi, RecordStore, SystemTimeSource, TimeSource};
pub use service::IpamService;

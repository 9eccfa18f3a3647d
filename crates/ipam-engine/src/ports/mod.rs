//! Ports (hexagonal architecture): inbound driving API and outbound driven
//! dependencies.

pub mod inbound;
pub mod outbound;

pub use inbound::IpamApi;
pub use outbound::{AuditRecorder, RecordStore, SystemTimeSource, TimeSource};

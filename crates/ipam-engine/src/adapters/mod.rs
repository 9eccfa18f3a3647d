//! Adapters: reference implementations of the outbound ports.

pub mod audit_log;
pub mod memory_store;

pub use audit_log::{InMemoryAuditLog, TracingAuditRecorder};
pub use memory_store::InMemoryRecordStore;

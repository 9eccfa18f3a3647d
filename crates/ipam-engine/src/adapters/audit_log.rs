//! Audit recorder adapters.
//!
//! [`InMemoryAuditLog`] buffers events for inspection in tests and small
//! deployments; [`TracingAuditRecorder`] forwards each event to the
//! process log. Durable audit transport is the collaborator's concern.

use std::sync::RwLock;

use tracing::info;

use shared_types::AuditEvent;

use crate::domain::errors::AuditError;
use crate::ports::outbound::AuditRecorder;

/// Audit recorder that appends events to an in-memory buffer.
#[derive(Default)]
pub struct InMemoryAuditLog {
    events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryAuditLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditRecorder for InMemoryAuditLog {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.events
            .write()
            .map_err(|_| AuditError::Unavailable("audit lock poisoned".into()))?
            .push(event);
        Ok(())
    }
}

/// Audit recorder that emits each event as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditRecorder;

impl AuditRecorder for TracingAuditRecorder {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        info!(
            action = %event.action,
            actor = %event.actor,
            timestamp = event.timestamp,
            address = event.after.as_ref().map(|r| r.address.as_str()),
            reservation = event.reservation.as_ref().map(|r| r.id.to_string()),
            released = event.released_count,
            "audit"
        );
        Ok(())
    }
}

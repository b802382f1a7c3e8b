//! Audit sink abstraction.
//!
//! Lifecycle operations emit one [`AuditEvent`] after a successful commit.
//! Events are handed to the sink on a background task; failures are logged
//! and dropped.

use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use leavebook_shared::types::UserId;

/// Audited lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    /// Request created (pending or auto-approved).
    Create,
    /// Request approved.
    Approve,
    /// Request declined.
    Decline,
    /// Request cancelled.
    Cancel,
    /// Request hard deleted.
    Delete,
}

impl AuditAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Approve => "approve",
            Self::Decline => "decline",
            Self::Cancel => "cancel",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// What happened.
    pub action: AuditAction,
    /// Entity kind, e.g. `leave_request`.
    pub entity_type: String,
    /// Entity ID.
    pub entity_id: Uuid,
    /// Acting principal.
    pub actor_id: UserId,
    /// Free-form change payload.
    pub changes: serde_json::Value,
}

impl AuditEvent {
    /// Event about a leave request.
    #[must_use]
    pub fn leave_request(
        action: AuditAction,
        entity_id: Uuid,
        actor_id: UserId,
        changes: serde_json::Value,
    ) -> Self {
        Self {
            action,
            entity_type: "leave_request".to_string(),
            entity_id,
            actor_id,
            changes,
        }
    }
}

/// Audit sink failure.
#[derive(Debug, Error)]
#[error("Audit sink failed: {0}")]
pub struct AuditError(pub String);

/// Destination for audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records one event.
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError>;
}

/// Sink keeping events in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        self.events
            .lock()
            .map_err(|e| AuditError(e.to_string()))?
            .push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_sink_records() {
        let sink = MemoryAuditSink::new();
        let actor = UserId::new();
        let id = Uuid::now_v7();
        sink.record(AuditEvent::leave_request(
            AuditAction::Approve,
            id,
            actor,
            json!({ "status": "approved" }),
        ))
        .await
        .unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].entity_type, "leave_request");
        assert_eq!(events[0].action, AuditAction::Approve);
        assert_eq!(events[0].entity_id, id);
    }

    #[test]
    fn test_action_serde() {
        assert_eq!(serde_json::to_string(&AuditAction::Cancel).unwrap(), "\"cancel\"");
        assert_eq!(AuditAction::Delete.to_string(), "delete");
    }
}

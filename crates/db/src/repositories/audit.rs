//! Audit log sink backed by the `audit_logs` table.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use leavebook_core::audit::{AuditError, AuditEvent, AuditSink};

use crate::entities::audit_logs;

/// Repository writing audit events.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: DatabaseConnection,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditSink for AuditRepository {
    async fn record(&self, event: AuditEvent) -> Result<(), AuditError> {
        audit_logs::ActiveModel {
            id: Set(Uuid::now_v7()),
            entity_type: Set(event.entity_type),
            entity_id: Set(event.entity_id),
            action: Set(event.action.as_str().to_string()),
            actor_id: Set(event.actor_id.into_inner()),
            changes: Set(event.changes),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| AuditError(e.to_string()))?;
        Ok(())
    }
}

use std::sync::Arc;

use chrono::Utc;
use sandgraph_core::{AppResult, UserIdentity, WorkspaceId};
use sandgraph_domain::AuditAction;

use crate::{AuditEvent, AuditRepository};

/// Appends completed actions to the audit trail.
#[derive(Clone)]
pub struct AuditRecorder {
    repository: Arc<dyn AuditRepository>,
}

impl AuditRecorder {
    /// Creates a recorder writing to the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }

    /// Records one completed action, stamped with the current time.
    pub async fn record(
        &self,
        actor: &UserIdentity,
        workspace_id: Option<&WorkspaceId>,
        action: AuditAction,
        subject_id: &str,
        detail: Option<String>,
    ) -> AppResult<()> {
        self.repository
            .append_event(AuditEvent {
                action,
                actor: actor.subject().to_owned(),
                workspace_id: workspace_id.cloned(),
                subject_id: subject_id.to_owned(),
                detail,
                occurred_at: Utc::now(),
            })
            .await
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sandgraph_core::{AppResult, WorkspaceId};
use sandgraph_domain::AuditAction;

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Subject that performed the action.
    pub actor: String,
    /// Active workspace of the actor, if any.
    pub workspace_id: Option<WorkspaceId>,
    /// Identifier of the element the action applied to.
    pub subject_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
    /// Time the action completed.
    pub occurred_at: DateTime<Utc>,
}

/// Audit log entry projection for administrative views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogEntry {
    /// Stable event identifier assigned by storage.
    pub event_id: String,
    /// Persisted event.
    pub event: AuditEvent,
}

/// Query parameters for audit log listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLogQuery {
    /// Maximum rows returned.
    pub limit: usize,
    /// Number of rows skipped for offset pagination.
    pub offset: usize,
    /// Optional filter on the element the action applied to.
    pub subject_id: Option<String>,
}

/// Port for persisting and reading append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;

    /// Lists persisted events, newest first.
    async fn list_events(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>>;
}

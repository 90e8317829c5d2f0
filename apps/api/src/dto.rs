use sandgraph_application::AuditLogEntry;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ready: bool,
    pub postgres: HealthDependencyStatus,
}

/// One runtime dependency health status.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-dependency-status.ts"
)]
pub struct HealthDependencyStatus {
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Legacy payload for vertex removal.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/remove-vertex-request.ts"
)]
pub struct RemoveVertexRequest {
    pub graph_vertex_id: String,
}

/// Acknowledgement of an accepted element deletion.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/delete-element-response.ts"
)]
pub struct DeleteElementResponse {
    pub success: bool,
}

impl DeleteElementResponse {
    pub fn accepted() -> Self {
        Self { success: true }
    }
}

/// API representation of an audit log entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-log-entry-response.ts"
)]
pub struct AuditLogEntryResponse {
    pub event_id: String,
    pub action: String,
    pub actor: String,
    pub workspace_id: Option<String>,
    pub subject_id: String,
    pub detail: Option<String>,
    pub occurred_at: String,
}

impl From<AuditLogEntry> for AuditLogEntryResponse {
    fn from(value: AuditLogEntry) -> Self {
        Self {
            event_id: value.event_id,
            action: value.event.action.as_str().to_owned(),
            actor: value.event.actor,
            workspace_id: value
                .event
                .workspace_id
                .map(|workspace_id| workspace_id.as_str().to_owned()),
            subject_id: value.event.subject_id,
            detail: value.event.detail,
            occurred_at: value.event.occurred_at.to_rfc3339(),
        }
    }
}

use axum::Json;
use axum::extract::{Extension, Query, State};
use sandgraph_core::Requester;
use serde::Deserialize;

use crate::dto::AuditLogEntryResponse;
use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_AUDIT_LOG_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub subject_id: Option<String>,
}

pub async fn list_audit_log_handler(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Query(query): Query<AuditLogQuery>,
) -> ApiResult<Json<Vec<AuditLogEntryResponse>>> {
    let entries = state
        .audit_log_service
        .list_entries(
            &requester,
            sandgraph_application::AuditLogQuery {
                limit: query.limit.unwrap_or(DEFAULT_AUDIT_LOG_LIMIT),
                offset: query.offset.unwrap_or(0),
                subject_id: query
                    .subject_id
                    .filter(|subject_id| !subject_id.trim().is_empty()),
            },
        )
        .await?
        .into_iter()
        .map(AuditLogEntryResponse::from)
        .collect();

    Ok(Json(entries))
}

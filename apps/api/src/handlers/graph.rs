use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::HeaderMap;
use sandgraph_core::{ElementId, Requester, WorkspaceId};
use tracing::debug;

use crate::dto::{DeleteElementResponse, RemoveVertexRequest};
use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the caller's active workspace.
pub const WORKSPACE_HEADER: &str = "x-workspace-id";

pub async fn delete_element_handler(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    Path(element_id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<DeleteElementResponse>> {
    delete_element(&state, &requester, &headers, element_id).await
}

pub async fn remove_vertex_handler(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
    headers: HeaderMap,
    Json(payload): Json<RemoveVertexRequest>,
) -> ApiResult<Json<DeleteElementResponse>> {
    delete_element(&state, &requester, &headers, payload.graph_vertex_id).await
}

async fn delete_element(
    state: &AppState,
    requester: &Requester,
    headers: &HeaderMap,
    element_id: String,
) -> ApiResult<Json<DeleteElementResponse>> {
    let element_id = ElementId::new(element_id)?;
    let workspace_id = active_workspace(headers);

    let outcome = state
        .deletion_service
        .delete_element(requester, &element_id, workspace_id.as_ref())
        .await?;

    // Pipeline details stay server-side; callers only get the marker.
    debug!(
        %element_id,
        job_id = %outcome.job_id,
        sandbox_status = outcome.sandbox_status.as_str(),
        "element deletion acknowledged"
    );

    Ok(Json(DeleteElementResponse::accepted()))
}

fn active_workspace(headers: &HeaderMap) -> Option<WorkspaceId> {
    WorkspaceId::from_ambient(
        headers
            .get(WORKSPACE_HEADER)
            .and_then(|value| value.to_str().ok()),
    )
}

#[cfg(test)]
mod tests;

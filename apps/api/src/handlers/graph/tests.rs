use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use sandgraph_application::{
    AuditLogService, AuditRecorder, AuthorizationService, DeletionService,
    SandboxVisibilityClassifier,
};
use sandgraph_core::{Authorizations, ElementId, Requester, UserIdentity, WorkspaceId};
use sandgraph_domain::{AuditAction, ElementKind, GraphElement, Permission, WorkspaceAccess};
use sandgraph_infrastructure::{
    InMemoryAuditRepository, InMemoryAuthorizationRepository, InMemoryDeletionQueue,
    InMemoryGraphRepository,
};

use super::{WORKSPACE_HEADER, delete_element_handler, remove_vertex_handler};
use crate::dto::RemoveVertexRequest;
use crate::handlers::audit::{AuditLogQuery, list_audit_log_handler};
use crate::state::AppState;

struct Fixture {
    state: AppState,
    graph: Arc<InMemoryGraphRepository>,
    authorization: Arc<InMemoryAuthorizationRepository>,
    queue: Arc<InMemoryDeletionQueue>,
    audit: Arc<InMemoryAuditRepository>,
}

fn workspace(value: &str) -> WorkspaceId {
    WorkspaceId::new(value).unwrap_or_else(|_| unreachable!())
}

fn fixture() -> Fixture {
    let graph = Arc::new(InMemoryGraphRepository::new());
    let authorization = Arc::new(InMemoryAuthorizationRepository::new());
    let queue = Arc::new(InMemoryDeletionQueue::new());
    let audit = Arc::new(InMemoryAuditRepository::new());
    let authorization_service = AuthorizationService::new(authorization.clone());

    let state = AppState {
        deletion_service: DeletionService::new(
            graph.clone(),
            Arc::new(authorization_service.clone()),
            Arc::new(SandboxVisibilityClassifier),
            queue.clone(),
            AuditRecorder::new(audit.clone()),
        ),
        audit_log_service: AuditLogService::new(authorization_service, audit.clone()),
        gateway_shared_secret: "0123456789abcdef0123456789abcdef".to_owned(),
        postgres_pool: None,
    };

    Fixture {
        state,
        graph,
        authorization,
        queue,
        audit,
    }
}

fn requester(subject: &str) -> Requester {
    Requester::new(
        UserIdentity::new(subject, subject),
        Authorizations::new([workspace("W1")]),
    )
}

fn workspace_headers(workspace_id: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(WORKSPACE_HEADER, HeaderValue::from_static(workspace_id));
    headers
}

async fn seed_writer(fixture: &Fixture, subject: &str) {
    fixture
        .authorization
        .grant_permission(subject, Permission::GraphElementDelete)
        .await;
    fixture
        .authorization
        .set_workspace_access(workspace("W1"), subject, WorkspaceAccess::Write)
        .await;
}

#[tokio::test]
async fn deletes_public_element_and_records_audit() {
    let fixture = fixture();
    seed_writer(&fixture, "alice").await;
    fixture
        .graph
        .save_element(
            GraphElement::published("E1", "graph", ElementKind::Vertex)
                .unwrap_or_else(|_| unreachable!()),
        )
        .await;

    let response = delete_element_handler(
        State(fixture.state.clone()),
        Extension(requester("alice")),
        Path("E1".to_owned()),
        workspace_headers("W1"),
    )
    .await;

    let Ok(Json(body)) = response else {
        unreachable!("deletion should be accepted");
    };
    assert_eq!(
        serde_json::to_value(&body).unwrap_or_default(),
        serde_json::json!({ "success": true })
    );

    let jobs = fixture.queue.submitted_jobs().await;
    assert_eq!(jobs.len(), 1);
    assert!(jobs[0].is_public);
    let job_ids = fixture.queue.submitted_job_ids().await;

    let events = fixture.audit.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::DeleteVertex);
    assert_eq!(events[0].subject_id, "E1");
    assert!(
        events[0]
            .detail
            .as_deref()
            .is_some_and(|detail| detail.contains(&job_ids[0]))
    );
}

#[tokio::test]
async fn legacy_route_deletes_workspace_draft_privately() {
    let fixture = fixture();
    seed_writer(&fixture, "alice").await;
    fixture
        .graph
        .save_element(
            GraphElement::draft("E2", "graph", ElementKind::Vertex, workspace("W1"))
                .unwrap_or_else(|_| unreachable!()),
        )
        .await;

    let response = remove_vertex_handler(
        State(fixture.state.clone()),
        Extension(requester("alice")),
        workspace_headers("W1"),
        Json(RemoveVertexRequest {
            graph_vertex_id: "E2".to_owned(),
        }),
    )
    .await;

    let Ok(Json(body)) = response else {
        unreachable!("draft deletion should be accepted");
    };
    assert!(body.success);

    let jobs = fixture.queue.submitted_jobs().await;
    assert_eq!(jobs.len(), 1);
    assert!(!jobs[0].is_public);
    assert_eq!(jobs[0].workspace_id, Some(workspace("W1")));
}

#[tokio::test]
async fn unknown_element_is_not_found() {
    let fixture = fixture();
    seed_writer(&fixture, "alice").await;

    let response = delete_element_handler(
        State(fixture.state.clone()),
        Extension(requester("alice")),
        Path("missing".to_owned()),
        HeaderMap::new(),
    )
    .await;

    let Err(error) = response else {
        unreachable!("unknown element should be rejected");
    };
    assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    assert!(fixture.queue.submitted_jobs().await.is_empty());
}

#[tokio::test]
async fn requester_without_grant_is_denied_without_side_effects() {
    let fixture = fixture();
    fixture
        .graph
        .save_element(
            GraphElement::published("E1", "graph", ElementKind::Edge)
                .unwrap_or_else(|_| unreachable!()),
        )
        .await;

    let response = delete_element_handler(
        State(fixture.state.clone()),
        Extension(requester("mallory")),
        Path("E1".to_owned()),
        workspace_headers("W1"),
    )
    .await;

    let Err(error) = response else {
        unreachable!("ungranted requester should be denied");
    };
    assert_eq!(error.into_response().status(), StatusCode::FORBIDDEN);
    assert!(fixture.queue.submitted_jobs().await.is_empty());
    assert!(fixture.audit.events().await.is_empty());
    let element_id = ElementId::new("E1").unwrap_or_else(|_| unreachable!());
    assert!(fixture.graph.contains_element(&element_id).await);
}

#[tokio::test]
async fn blank_element_id_is_a_validation_error() {
    let fixture = fixture();

    let response = delete_element_handler(
        State(fixture.state.clone()),
        Extension(requester("alice")),
        Path("   ".to_owned()),
        HeaderMap::new(),
    )
    .await;

    let Err(error) = response else {
        unreachable!("blank element id should be rejected");
    };
    assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn audit_log_requires_read_permission() {
    let fixture = fixture();
    seed_writer(&fixture, "alice").await;
    fixture
        .graph
        .save_element(
            GraphElement::published("E1", "graph", ElementKind::Vertex)
                .unwrap_or_else(|_| unreachable!()),
        )
        .await;
    let deleted = delete_element_handler(
        State(fixture.state.clone()),
        Extension(requester("alice")),
        Path("E1".to_owned()),
        HeaderMap::new(),
    )
    .await;
    assert!(deleted.is_ok());

    let denied = list_audit_log_handler(
        State(fixture.state.clone()),
        Extension(requester("alice")),
        Query(AuditLogQuery {
            limit: None,
            offset: None,
            subject_id: None,
        }),
    )
    .await;
    let Err(error) = denied else {
        unreachable!("audit log should require permission");
    };
    assert_eq!(error.into_response().status(), StatusCode::FORBIDDEN);

    fixture
        .authorization
        .grant_permission("alice", Permission::SecurityAuditRead)
        .await;
    let listed = list_audit_log_handler(
        State(fixture.state.clone()),
        Extension(requester("alice")),
        Query(AuditLogQuery {
            limit: Some(10),
            offset: None,
            subject_id: Some("E1".to_owned()),
        }),
    )
    .await;
    let Ok(Json(entries)) = listed else {
        unreachable!("audit reader should list entries");
    };
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "DELETE_VERTEX");
}

use sandgraph_application::{GraphElementRepository, GraphMutationRepository};
use sandgraph_core::{AppError, Authorizations, ElementId, WorkspaceId};
use sandgraph_domain::{ElementKind, GraphElement};

use super::InMemoryGraphRepository;

fn workspace(value: &str) -> WorkspaceId {
    WorkspaceId::new(value).unwrap_or_else(|_| unreachable!())
}

fn element_id(value: &str) -> ElementId {
    ElementId::new(value).unwrap_or_else(|_| unreachable!())
}

async fn seeded() -> InMemoryGraphRepository {
    let repository = InMemoryGraphRepository::new();
    repository
        .save_element(
            GraphElement::published("public", "graph", ElementKind::Vertex)
                .unwrap_or_else(|_| unreachable!()),
        )
        .await;
    repository
        .save_element(
            GraphElement::draft("draft", "graph", ElementKind::Vertex, workspace("W1"))
                .unwrap_or_else(|_| unreachable!()),
        )
        .await;
    repository
}

#[tokio::test]
async fn drafts_are_only_visible_through_their_workspace() {
    let repository = seeded().await;

    let hidden = repository
        .find_element(&element_id("draft"), &Authorizations::new([workspace("W2")]))
        .await;
    assert!(matches!(hidden, Ok(None)));

    let visible = repository
        .find_element(&element_id("draft"), &Authorizations::new([workspace("W1")]))
        .await;
    assert!(matches!(visible, Ok(Some(_))));

    let published = repository
        .find_element(&element_id("public"), &Authorizations::default())
        .await;
    assert!(matches!(published, Ok(Some(_))));
}

#[tokio::test]
async fn removing_published_element_is_idempotent() {
    let repository = seeded().await;

    let first = repository
        .remove_published_element(&element_id("public"))
        .await;
    assert!(matches!(first, Ok(true)));

    let replay = repository
        .remove_published_element(&element_id("public"))
        .await;
    assert!(matches!(replay, Ok(false)));
}

#[tokio::test]
async fn published_removal_refuses_drafts() {
    let repository = seeded().await;

    let result = repository
        .remove_published_element(&element_id("draft"))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(repository.contains_element(&element_id("draft")).await);
}

#[tokio::test]
async fn discarding_draft_never_touches_published_state() {
    let repository = seeded().await;

    let result = repository
        .discard_workspace_draft(&element_id("public"), &workspace("W1"))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(repository.contains_element(&element_id("public")).await);

    let other_workspace = repository
        .discard_workspace_draft(&element_id("draft"), &workspace("W2"))
        .await;
    assert!(other_workspace.is_err());

    let discarded = repository
        .discard_workspace_draft(&element_id("draft"), &workspace("W1"))
        .await;
    assert!(matches!(discarded, Ok(true)));
    assert!(!repository.contains_element(&element_id("draft")).await);
}

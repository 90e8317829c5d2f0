use async_trait::async_trait;
use sandgraph_core::{AppResult, Authorizations, ElementId, WorkspaceId};
use sandgraph_domain::GraphElement;

/// Read port for graph element lookups.
#[async_trait]
pub trait GraphElementRepository: Send + Sync {
    /// Finds one element visible under the given authorizations.
    ///
    /// Drafts of workspaces not covered by `authorizations` resolve to `None`.
    async fn find_element(
        &self,
        element_id: &ElementId,
        authorizations: &Authorizations,
    ) -> AppResult<Option<GraphElement>>;
}

/// Write port used by the deletion worker to apply physical removals.
///
/// Both operations are idempotent and return whether anything was removed.
#[async_trait]
pub trait GraphMutationRepository: Send + Sync {
    /// Removes a published element together with every workspace's pending changes.
    async fn remove_published_element(&self, element_id: &ElementId) -> AppResult<bool>;

    /// Removes the draft-local state of an element inside one workspace.
    async fn discard_workspace_draft(
        &self,
        element_id: &ElementId,
        workspace_id: &WorkspaceId,
    ) -> AppResult<bool>;
}

/// Audience of a cache invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationScope {
    /// Every workspace may hold cached published state.
    AllWorkspaces,
    /// Only the given workspace held the element.
    Workspace(WorkspaceId),
}

/// Port for invalidating cached element state after a deletion.
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    /// Invalidates cached state of one element for the given audience.
    async fn invalidate(&self, element_id: &ElementId, scope: InvalidationScope)
    -> AppResult<()>;
}

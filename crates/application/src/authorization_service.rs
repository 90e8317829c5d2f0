use std::sync::Arc;

use async_trait::async_trait;
use sandgraph_core::{AppError, AppResult, Requester, WorkspaceId};
use sandgraph_domain::{GraphElement, Permission, WorkspaceAccess};

/// Repository port for permission and workspace membership lookups.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists effective permissions for a subject.
    async fn list_permissions_for_subject(&self, subject: &str) -> AppResult<Vec<Permission>>;

    /// Returns the subject's access level on a workspace, if a member.
    async fn find_workspace_access(
        &self,
        workspace_id: &WorkspaceId,
        subject: &str,
    ) -> AppResult<Option<WorkspaceAccess>>;
}

/// Policy predicate consulted before any element mutation is initiated.
#[async_trait]
pub trait AuthorizationGate: Send + Sync {
    /// Returns whether the requester may delete the element from the workspace.
    ///
    /// A denial is `Ok(false)`; errors only report that policy data could not
    /// be consulted.
    async fn can_delete(
        &self,
        element: &GraphElement,
        requester: &Requester,
        workspace_id: Option<&WorkspaceId>,
    ) -> AppResult<bool>;
}

/// Application service for permission checks and the deletion ACL.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>) -> Self {
        Self { repository }
    }

    /// Ensures a subject has the required permission.
    pub async fn require_permission(&self, subject: &str, permission: Permission) -> AppResult<()> {
        if self.has_permission(subject, permission).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{subject}' is missing permission '{}'",
            permission.as_str()
        )))
    }

    /// Returns whether the subject currently has the permission.
    pub async fn has_permission(&self, subject: &str, permission: Permission) -> AppResult<bool> {
        let permissions = self
            .repository
            .list_permissions_for_subject(subject)
            .await?;

        Ok(permissions.iter().any(|value| value == &permission))
    }
}

#[async_trait]
impl AuthorizationGate for AuthorizationService {
    async fn can_delete(
        &self,
        element: &GraphElement,
        requester: &Requester,
        workspace_id: Option<&WorkspaceId>,
    ) -> AppResult<bool> {
        let subject = requester.subject();

        if !self
            .has_permission(subject, Permission::GraphElementDelete)
            .await?
        {
            return Ok(false);
        }

        // Drafts can only be removed from inside the workspace that owns them.
        if let Some(draft_workspace) = element.draft_workspace() {
            if workspace_id != Some(draft_workspace) {
                return Ok(false);
            }
        }

        let Some(workspace_id) = workspace_id else {
            return Ok(true);
        };

        let access = self
            .repository
            .find_workspace_access(workspace_id, subject)
            .await?;

        Ok(access.is_some_and(|access| access.can_write()))
    }
}

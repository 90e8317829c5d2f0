use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sandgraph_application::AuthorizationRepository;
use sandgraph_core::{AppResult, WorkspaceId};
use sandgraph_domain::{Permission, WorkspaceAccess};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct AuthorizationState {
    permissions: HashMap<String, HashSet<Permission>>,
    workspace_access: HashMap<(WorkspaceId, String), WorkspaceAccess>,
}

/// In-memory permission grants and workspace memberships.
#[derive(Debug, Default)]
pub struct InMemoryAuthorizationRepository {
    state: RwLock<AuthorizationState>,
}

impl InMemoryAuthorizationRepository {
    /// Creates an empty repository where nobody holds any grant.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants one permission to a subject.
    pub async fn grant_permission(&self, subject: &str, permission: Permission) {
        self.state
            .write()
            .await
            .permissions
            .entry(subject.to_owned())
            .or_default()
            .insert(permission);
    }

    /// Sets or replaces a subject's access level on a workspace.
    pub async fn set_workspace_access(
        &self,
        workspace_id: WorkspaceId,
        subject: &str,
        access: WorkspaceAccess,
    ) {
        self.state
            .write()
            .await
            .workspace_access
            .insert((workspace_id, subject.to_owned()), access);
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryAuthorizationRepository {
    async fn list_permissions_for_subject(&self, subject: &str) -> AppResult<Vec<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .get(subject)
            .map(|permissions| permissions.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn find_workspace_access(
        &self,
        workspace_id: &WorkspaceId,
        subject: &str,
    ) -> AppResult<Option<WorkspaceAccess>> {
        Ok(self
            .state
            .read()
            .await
            .workspace_access
            .get(&(workspace_id.clone(), subject.to_owned()))
            .copied())
    }
}

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::WorkspaceId;

/// User information forwarded by the authenticating gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: String,
}

impl UserIdentity {
    /// Creates a user identity from authentication data.
    #[must_use]
    pub fn new(subject: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
        }
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }
}

/// Capability token describing which sandboxed state a principal may see.
///
/// Published graph state is visible to every principal; draft state is only
/// visible through the workspaces listed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorizations {
    workspaces: BTreeSet<WorkspaceId>,
}

impl Authorizations {
    /// Creates authorizations covering the given workspaces.
    #[must_use]
    pub fn new(workspaces: impl IntoIterator<Item = WorkspaceId>) -> Self {
        Self {
            workspaces: workspaces.into_iter().collect(),
        }
    }

    /// Returns whether draft state of the workspace is visible.
    #[must_use]
    pub fn can_see_workspace(&self, workspace_id: &WorkspaceId) -> bool {
        self.workspaces.contains(workspace_id)
    }

    /// Returns the covered workspaces in stable order.
    pub fn workspaces(&self) -> impl Iterator<Item = &WorkspaceId> {
        self.workspaces.iter()
    }
}

/// Authenticated principal performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    identity: UserIdentity,
    authorizations: Authorizations,
}

impl Requester {
    /// Creates a requester from identity and capability data.
    #[must_use]
    pub fn new(identity: UserIdentity, authorizations: Authorizations) -> Self {
        Self {
            identity,
            authorizations,
        }
    }

    /// Returns the requester identity.
    #[must_use]
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    /// Returns the stable subject of the requester.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.identity.subject()
    }

    /// Returns the requester capability token.
    #[must_use]
    pub fn authorizations(&self) -> &Authorizations {
        &self.authorizations
    }
}

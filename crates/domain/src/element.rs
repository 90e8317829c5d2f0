use std::collections::BTreeSet;
use std::str::FromStr;

use sandgraph_core::{AppError, AppResult, ElementId, NonEmptyString, WorkspaceId};
use serde::{Deserialize, Serialize};

use crate::AuditAction;

/// Kind of addressable graph element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Graph vertex.
    Vertex,
    /// Graph edge.
    Edge,
}

impl ElementKind {
    /// Returns a stable storage value for the element kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Edge => "edge",
        }
    }

    /// Returns the audit action recorded when an element of this kind is deleted.
    #[must_use]
    pub fn delete_audit_action(&self) -> AuditAction {
        match self {
            Self::Vertex => AuditAction::DeleteVertex,
            Self::Edge => AuditAction::DeleteEdge,
        }
    }
}

impl FromStr for ElementKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "vertex" => Ok(Self::Vertex),
            "edge" => Ok(Self::Edge),
            _ => Err(AppError::Validation(format!(
                "unknown element kind '{value}'"
            ))),
        }
    }
}

/// Visibility of an element's current state relative to one workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SandboxStatus {
    /// Published and unchanged in the workspace.
    Public,
    /// Draft that only exists inside the workspace.
    Private,
    /// Published, with unpublished changes pending in the workspace.
    PublicChanged,
}

impl SandboxStatus {
    /// Returns a stable transport value for the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::Private => "PRIVATE",
            Self::PublicChanged => "PUBLIC_CHANGED",
        }
    }

    /// Returns whether a published state exists that other workspaces can see.
    ///
    /// `PublicChanged` elements still carry published state, so deleting them
    /// must retract it just like a plain `Public` element.
    ///
    /// This departs from treating only `Public` (strict equality) as public.
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public | Self::PublicChanged)
    }
}

/// Addressable vertex or edge of the shared graph, with its sandbox state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphElement {
    element_id: ElementId,
    graph_id: NonEmptyString,
    kind: ElementKind,
    draft_workspace: Option<WorkspaceId>,
    pending_change_workspaces: BTreeSet<WorkspaceId>,
}

impl GraphElement {
    /// Creates a published element with no pending workspace changes.
    pub fn published(
        element_id: impl Into<String>,
        graph_id: impl Into<String>,
        kind: ElementKind,
    ) -> AppResult<Self> {
        Ok(Self {
            element_id: ElementId::new(element_id)?,
            graph_id: NonEmptyString::new(graph_id)?,
            kind,
            draft_workspace: None,
            pending_change_workspaces: BTreeSet::new(),
        })
    }

    /// Creates an unpublished element drafted inside one workspace.
    pub fn draft(
        element_id: impl Into<String>,
        graph_id: impl Into<String>,
        kind: ElementKind,
        workspace_id: WorkspaceId,
    ) -> AppResult<Self> {
        let mut element = Self::published(element_id, graph_id, kind)?;
        element.draft_workspace = Some(workspace_id);
        Ok(element)
    }

    /// Marks a published element as having unpublished changes in a workspace.
    pub fn with_pending_change(mut self, workspace_id: WorkspaceId) -> AppResult<Self> {
        if self.draft_workspace.is_some() {
            return Err(AppError::Validation(format!(
                "draft element '{}' cannot carry pending changes of a published state",
                self.element_id
            )));
        }

        self.pending_change_workspaces.insert(workspace_id);
        Ok(self)
    }

    /// Returns the stable element identifier.
    #[must_use]
    pub fn element_id(&self) -> &ElementId {
        &self.element_id
    }

    /// Returns the element kind.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Returns the workspace holding this element as a draft, if unpublished.
    #[must_use]
    pub fn draft_workspace(&self) -> Option<&WorkspaceId> {
        self.draft_workspace.as_ref()
    }

    /// Classifies the element's current state relative to a workspace.
    #[must_use]
    pub fn sandbox_status(&self, workspace_id: Option<&WorkspaceId>) -> SandboxStatus {
        let Some(workspace_id) = workspace_id else {
            return SandboxStatus::Public;
        };

        if self.draft_workspace.as_ref() == Some(workspace_id) {
            return SandboxStatus::Private;
        }

        if self.pending_change_workspaces.contains(workspace_id) {
            return SandboxStatus::PublicChanged;
        }

        SandboxStatus::Public
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;
    use sandgraph_core::WorkspaceId;

    use super::{ElementKind, GraphElement, SandboxStatus};

    fn workspace(value: &str) -> WorkspaceId {
        WorkspaceId::new(value).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn missing_workspace_context_classifies_as_public() {
        let element = GraphElement::draft("v-1", "graph", ElementKind::Vertex, workspace("W1"))
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(element.sandbox_status(None), SandboxStatus::Public);
    }

    #[test]
    fn draft_is_private_only_in_its_own_workspace() {
        let element = GraphElement::draft("v-1", "graph", ElementKind::Vertex, workspace("W1"))
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(
            element.sandbox_status(Some(&workspace("W1"))),
            SandboxStatus::Private
        );
        assert_eq!(
            element.sandbox_status(Some(&workspace("W2"))),
            SandboxStatus::Public
        );
    }

    #[test]
    fn pending_change_classifies_as_public_changed() {
        let element = GraphElement::published("v-1", "graph", ElementKind::Vertex)
            .and_then(|element| element.with_pending_change(workspace("W1")))
            .unwrap_or_else(|_| unreachable!());

        let status = element.sandbox_status(Some(&workspace("W1")));
        assert_eq!(status, SandboxStatus::PublicChanged);
        assert!(status.is_public());
        assert_eq!(
            element.sandbox_status(Some(&workspace("W2"))),
            SandboxStatus::Public
        );
    }

    #[test]
    fn draft_rejects_pending_changes() {
        let result = GraphElement::draft("v-1", "graph", ElementKind::Vertex, workspace("W1"))
            .and_then(|element| element.with_pending_change(workspace("W2")));

        assert!(result.is_err());
    }

    #[test]
    fn only_private_status_is_not_public() {
        assert!(SandboxStatus::Public.is_public());
        assert!(SandboxStatus::PublicChanged.is_public());
        assert!(!SandboxStatus::Private.is_public());
    }

    #[test]
    fn element_kind_parses_storage_values() {
        assert_eq!(ElementKind::from_str("edge").ok(), Some(ElementKind::Edge));
        assert!(ElementKind::from_str("hyperedge").is_err());
    }

    proptest! {
        #[test]
        fn classification_is_deterministic(
            draft_in in proptest::option::of("[a-c]"),
            pending in proptest::collection::btree_set("[a-c]", 0..3),
            active in proptest::option::of("[a-c]"),
        ) {
            let element = match draft_in.as_deref() {
                Some(draft) => GraphElement::draft("v", "g", ElementKind::Vertex, workspace(draft)),
                None => pending.iter().try_fold(
                    GraphElement::published("v", "g", ElementKind::Vertex)
                        .unwrap_or_else(|_| unreachable!()),
                    |element, value| element.with_pending_change(workspace(value)),
                ),
            }
            .unwrap_or_else(|_| unreachable!());
            let active = active.as_deref().map(workspace);

            let first = element.sandbox_status(active.as_ref());
            let second = element.sandbox_status(active.as_ref());
            prop_assert_eq!(first, second);

            if active.is_none() {
                prop_assert_eq!(first, SandboxStatus::Public);
            }
            if first == SandboxStatus::Private {
                prop_assert_eq!(element.draft_workspace(), active.as_ref());
            }
        }
    }
}

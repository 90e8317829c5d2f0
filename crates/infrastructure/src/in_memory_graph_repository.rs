use std::collections::HashMap;

use async_trait::async_trait;
use sandgraph_application::{GraphElementRepository, GraphMutationRepository};
use sandgraph_core::{AppError, AppResult, Authorizations, ElementId, WorkspaceId};
use sandgraph_domain::GraphElement;
use tokio::sync::RwLock;

/// In-memory graph store holding published elements and workspace drafts.
#[derive(Debug, Default)]
pub struct InMemoryGraphRepository {
    elements: RwLock<HashMap<ElementId, GraphElement>>,
}

impl InMemoryGraphRepository {
    /// Creates an empty in-memory graph store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores or replaces one element.
    pub async fn save_element(&self, element: GraphElement) {
        self.elements
            .write()
            .await
            .insert(element.element_id().clone(), element);
    }

    /// Returns whether an element is stored, ignoring visibility.
    pub async fn contains_element(&self, element_id: &ElementId) -> bool {
        self.elements.read().await.contains_key(element_id)
    }
}

#[async_trait]
impl GraphElementRepository for InMemoryGraphRepository {
    async fn find_element(
        &self,
        element_id: &ElementId,
        authorizations: &Authorizations,
    ) -> AppResult<Option<GraphElement>> {
        Ok(self
            .elements
            .read()
            .await
            .get(element_id)
            .filter(|element| {
                element
                    .draft_workspace()
                    .is_none_or(|workspace_id| authorizations.can_see_workspace(workspace_id))
            })
            .cloned())
    }
}

#[async_trait]
impl GraphMutationRepository for InMemoryGraphRepository {
    async fn remove_published_element(&self, element_id: &ElementId) -> AppResult<bool> {
        let mut elements = self.elements.write().await;
        let is_draft = match elements.get(element_id) {
            None => return Ok(false),
            Some(element) => element.draft_workspace().is_some(),
        };

        if is_draft {
            return Err(AppError::Conflict(format!(
                "element '{element_id}' is an unpublished draft"
            )));
        }

        Ok(elements.remove(element_id).is_some())
    }

    async fn discard_workspace_draft(
        &self,
        element_id: &ElementId,
        workspace_id: &WorkspaceId,
    ) -> AppResult<bool> {
        let mut elements = self.elements.write().await;
        let owned_by_workspace = match elements.get(element_id) {
            None => return Ok(false),
            Some(element) => element.draft_workspace() == Some(workspace_id),
        };

        if !owned_by_workspace {
            return Err(AppError::Conflict(format!(
                "element '{element_id}' is not a draft of workspace '{workspace_id}'"
            )));
        }

        Ok(elements.remove(element_id).is_some())
    }
}

#[cfg(test)]
mod tests;

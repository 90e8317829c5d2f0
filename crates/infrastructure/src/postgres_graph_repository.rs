use async_trait::async_trait;
use sandgraph_application::{GraphElementRepository, GraphMutationRepository};
use sandgraph_core::{AppError, AppResult, Authorizations, ElementId, WorkspaceId};
use sandgraph_domain::{ElementKind, GraphElement};
use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed graph element store.
#[derive(Clone)]
pub struct PostgresGraphRepository {
    pool: PgPool,
}

impl PostgresGraphRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn element_exists(&self, element_id: &ElementId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM graph_elements WHERE id = $1)
            "#,
        )
        .bind(element_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to check graph element '{element_id}': {error}"
            ))
        })
    }
}

#[derive(Debug, FromRow)]
struct GraphElementRow {
    id: String,
    graph_id: String,
    kind: String,
    draft_workspace_id: Option<String>,
    pending_workspace_ids: Vec<String>,
}

fn graph_element_from_row(row: GraphElementRow) -> AppResult<GraphElement> {
    let kind = row.kind.parse::<ElementKind>()?;
    let mut element = match row.draft_workspace_id {
        Some(workspace_id) => {
            GraphElement::draft(row.id, row.graph_id, kind, WorkspaceId::new(workspace_id)?)?
        }
        None => GraphElement::published(row.id, row.graph_id, kind)?,
    };

    for workspace_id in row.pending_workspace_ids {
        element = element.with_pending_change(WorkspaceId::new(workspace_id)?)?;
    }

    Ok(element)
}

#[async_trait]
impl GraphElementRepository for PostgresGraphRepository {
    async fn find_element(
        &self,
        element_id: &ElementId,
        authorizations: &Authorizations,
    ) -> AppResult<Option<GraphElement>> {
        let visible_workspaces: Vec<String> = authorizations
            .workspaces()
            .map(|workspace_id| workspace_id.as_str().to_owned())
            .collect();

        let row = sqlx::query_as::<_, GraphElementRow>(
            r#"
            SELECT
                elements.id,
                elements.graph_id,
                elements.kind,
                elements.draft_workspace_id,
                COALESCE(
                    array_agg(changes.workspace_id ORDER BY changes.workspace_id)
                        FILTER (WHERE changes.workspace_id IS NOT NULL),
                    '{}'
                ) AS pending_workspace_ids
            FROM graph_elements elements
            LEFT JOIN graph_element_pending_changes changes
                ON changes.element_id = elements.id
            WHERE elements.id = $1
              AND (
                    elements.draft_workspace_id IS NULL
                    OR elements.draft_workspace_id = ANY($2)
                  )
            GROUP BY elements.id
            "#,
        )
        .bind(element_id.as_str())
        .bind(visible_workspaces)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find graph element '{element_id}': {error}"
            ))
        })?;

        row.map(graph_element_from_row).transpose()
    }
}

#[async_trait]
impl GraphMutationRepository for PostgresGraphRepository {
    async fn remove_published_element(&self, element_id: &ElementId) -> AppResult<bool> {
        // Pending workspace changes are removed by the cascading foreign key.
        let result = sqlx::query(
            r#"
            DELETE FROM graph_elements
            WHERE id = $1
              AND draft_workspace_id IS NULL
            "#,
        )
        .bind(element_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to remove published graph element '{element_id}': {error}"
            ))
        })?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        if self.element_exists(element_id).await? {
            return Err(AppError::Conflict(format!(
                "graph element '{element_id}' is a workspace draft and has no published state"
            )));
        }

        Ok(false)
    }

    async fn discard_workspace_draft(
        &self,
        element_id: &ElementId,
        workspace_id: &WorkspaceId,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM graph_elements
            WHERE id = $1
              AND draft_workspace_id = $2
            "#,
        )
        .bind(element_id.as_str())
        .bind(workspace_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to discard draft graph element '{element_id}' in workspace '{workspace_id}': {error}"
            ))
        })?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        if self.element_exists(element_id).await? {
            return Err(AppError::Conflict(format!(
                "graph element '{element_id}' is not a draft of workspace '{workspace_id}'"
            )));
        }

        Ok(false)
    }
}

use async_trait::async_trait;
use sandgraph_application::AuthorizationRepository;
use sandgraph_core::{AppError, AppResult, WorkspaceId};
use sandgraph_domain::{Permission, WorkspaceAccess};
use sqlx::PgPool;

/// PostgreSQL-backed authorization repository.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn list_permissions_for_subject(&self, subject: &str) -> AppResult<Vec<Permission>> {
        let permissions = sqlx::query_scalar::<_, String>(
            r#"
            SELECT permission
            FROM subject_permissions
            WHERE subject = $1
            ORDER BY permission
            "#,
        )
        .bind(subject)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list permissions for subject '{subject}': {error}"
            ))
        })?;

        permissions
            .iter()
            .map(|permission| permission.parse::<Permission>())
            .collect()
    }

    async fn find_workspace_access(
        &self,
        workspace_id: &WorkspaceId,
        subject: &str,
    ) -> AppResult<Option<WorkspaceAccess>> {
        let access = sqlx::query_scalar::<_, String>(
            r#"
            SELECT access
            FROM workspace_members
            WHERE workspace_id = $1
              AND subject = $2
            "#,
        )
        .bind(workspace_id.as_str())
        .bind(subject)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find access of subject '{subject}' on workspace '{workspace_id}': {error}"
            ))
        })?;

        access
            .as_deref()
            .map(str::parse::<WorkspaceAccess>)
            .transpose()
    }
}

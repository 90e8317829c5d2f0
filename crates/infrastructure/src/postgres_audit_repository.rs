use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sandgraph_application::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditRepository};
use sandgraph_core::{AppError, AppResult, WorkspaceId};
use sandgraph_domain::AuditAction;
use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed append-only audit repository.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditLogRow {
    event_id: uuid::Uuid,
    action: String,
    actor: String,
    workspace_id: Option<String>,
    subject_id: String,
    detail: Option<String>,
    created_at: DateTime<Utc>,
}

fn audit_log_entry_from_row(row: AuditLogRow) -> AppResult<AuditLogEntry> {
    Ok(AuditLogEntry {
        event_id: row.event_id.to_string(),
        event: AuditEvent {
            action: row.action.parse::<AuditAction>()?,
            actor: row.actor,
            workspace_id: row.workspace_id.map(WorkspaceId::new).transpose()?,
            subject_id: row.subject_id,
            detail: row.detail,
            occurred_at: row.created_at,
        },
    })
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log_entries (
                action,
                actor,
                workspace_id,
                subject_id,
                detail,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.action.as_str())
        .bind(event.actor)
        .bind(event.workspace_id.as_ref().map(WorkspaceId::as_str))
        .bind(event.subject_id)
        .bind(event.detail)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit event: {error}")))?;

        Ok(())
    }

    async fn list_events(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let limit = i64::try_from(query.limit).map_err(|error| {
            AppError::Validation(format!("invalid audit log limit: {error}"))
        })?;
        let offset = i64::try_from(query.offset).map_err(|error| {
            AppError::Validation(format!("invalid audit log offset: {error}"))
        })?;

        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT
                id AS event_id,
                action,
                actor,
                workspace_id,
                subject_id,
                detail,
                created_at
            FROM audit_log_entries
            WHERE ($1::TEXT IS NULL OR subject_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            OFFSET $3
            "#,
        )
        .bind(query.subject_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list audit log entries: {error}"))
        })?;

        rows.into_iter().map(audit_log_entry_from_row).collect()
    }
}

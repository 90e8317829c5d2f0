use async_trait::async_trait;
use sandgraph_application::{
    ClaimedDeletionJob, DEFAULT_DELETION_MAX_ATTEMPTS, DeletionDispatcher, DeletionJob,
    DeletionJobQueue,
};
use sandgraph_core::{AppError, AppResult, Authorizations, ElementId, WorkspaceId};
use sandgraph_domain::{ElementKind, Priority};
use sqlx::{FromRow, PgPool};

/// PostgreSQL-backed deletion job queue shared by the API and the workers.
#[derive(Clone)]
pub struct PostgresDeletionQueue {
    pool: PgPool,
    max_attempts: u16,
}

impl PostgresDeletionQueue {
    /// Creates a queue with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            max_attempts: DEFAULT_DELETION_MAX_ATTEMPTS,
        }
    }

    /// Sets how many claims a job gets before it is marked failed.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u16) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

#[derive(Debug, FromRow)]
struct ClaimedDeletionJobRow {
    job_id: uuid::Uuid,
    lease_token: String,
    element_id: String,
    element_kind: String,
    workspace_id: Option<String>,
    is_public: bool,
    priority: i16,
    requested_by: String,
    authorized_workspaces: Vec<String>,
    sequence: i64,
}

fn claimed_deletion_job_from_row(row: ClaimedDeletionJobRow) -> AppResult<ClaimedDeletionJob> {
    let authorized_workspaces = row
        .authorized_workspaces
        .into_iter()
        .map(WorkspaceId::new)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ClaimedDeletionJob {
        job_id: row.job_id.to_string(),
        lease_token: row.lease_token,
        job: DeletionJob {
            element_id: ElementId::new(row.element_id)?,
            element_kind: row.element_kind.parse::<ElementKind>()?,
            workspace_id: row.workspace_id.map(WorkspaceId::new).transpose()?,
            is_public: row.is_public,
            priority: Priority::from_rank(row.priority)?,
            requested_by: row.requested_by,
            authorizations: Authorizations::new(authorized_workspaces),
        },
    })
}

fn parse_job_id(job_id: &str) -> AppResult<uuid::Uuid> {
    uuid::Uuid::parse_str(job_id).map_err(|error| {
        AppError::Validation(format!("invalid deletion job id '{job_id}': {error}"))
    })
}

#[async_trait]
impl DeletionDispatcher for PostgresDeletionQueue {
    async fn submit(&self, job: DeletionJob) -> AppResult<String> {
        let authorized_workspaces: Vec<String> = job
            .authorizations
            .workspaces()
            .map(|workspace_id| workspace_id.as_str().to_owned())
            .collect();

        let job_id = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            INSERT INTO deletion_jobs (
                element_id,
                element_kind,
                workspace_id,
                is_public,
                priority,
                requested_by,
                authorized_workspaces,
                status,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', now(), now())
            RETURNING id
            "#,
        )
        .bind(job.element_id.as_str())
        .bind(job.element_kind.as_str())
        .bind(job.workspace_id.as_ref().map(WorkspaceId::as_str))
        .bind(job.is_public)
        .bind(job.priority.rank())
        .bind(job.requested_by.as_str())
        .bind(authorized_workspaces)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Unavailable(format!(
                "failed to enqueue deletion of element '{}': {error}",
                job.element_id
            ))
        })?;

        Ok(job_id.to_string())
    }
}

#[async_trait]
impl DeletionJobQueue for PostgresDeletionQueue {
    async fn claim_jobs(
        &self,
        worker_id: &str,
        limit: usize,
        lease_seconds: u32,
    ) -> AppResult<Vec<ClaimedDeletionJob>> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start deletion job claim transaction: {error}"
            ))
        })?;

        let mut claim_rows = sqlx::query_as::<_, ClaimedDeletionJobRow>(
            r#"
            WITH candidate_jobs AS (
                SELECT id
                FROM deletion_jobs
                WHERE status = 'pending'
                   OR (status = 'leased' AND lease_expires_at < now())
                ORDER BY priority DESC, sequence ASC
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE deletion_jobs jobs
            SET
                status = 'leased',
                leased_by = $2,
                lease_token = gen_random_uuid()::TEXT,
                lease_expires_at = now() + make_interval(secs => $3::INT),
                attempt_count = jobs.attempt_count + 1,
                updated_at = now()
            FROM candidate_jobs
            WHERE jobs.id = candidate_jobs.id
            RETURNING
                jobs.id AS job_id,
                jobs.lease_token,
                jobs.element_id,
                jobs.element_kind,
                jobs.workspace_id,
                jobs.is_public,
                jobs.priority,
                jobs.requested_by,
                jobs.authorized_workspaces,
                jobs.sequence
            "#,
        )
        .bind(i64::try_from(limit).map_err(|error| {
            AppError::Validation(format!("invalid deletion claim limit: {error}"))
        })?)
        .bind(worker_id)
        .bind(i32::try_from(lease_seconds).map_err(|error| {
            AppError::Validation(format!("invalid deletion lease_seconds: {error}"))
        })?)
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to claim deletion jobs for worker '{worker_id}': {error}"
            ))
        })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit deletion job claim transaction: {error}"
            ))
        })?;

        // UPDATE ... RETURNING does not preserve the candidate order.
        claim_rows.sort_by(|left, right| {
            right
                .priority
                .cmp(&left.priority)
                .then(left.sequence.cmp(&right.sequence))
        });

        claim_rows
            .into_iter()
            .map(claimed_deletion_job_from_row)
            .collect()
    }

    async fn complete_job(&self, job_id: &str, worker_id: &str, lease_token: &str) -> AppResult<()> {
        let job_uuid = parse_job_id(job_id)?;

        let result = sqlx::query(
            r#"
            UPDATE deletion_jobs
            SET
                status = 'completed',
                leased_by = NULL,
                lease_token = NULL,
                lease_expires_at = NULL,
                updated_at = now()
            WHERE id = $1
              AND leased_by = $2
              AND lease_token = $3
              AND status = 'leased'
            "#,
        )
        .bind(job_uuid)
        .bind(worker_id)
        .bind(lease_token)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to complete deletion job '{job_id}' for worker '{worker_id}': {error}"
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "deletion job '{job_id}' is not currently leased by worker '{worker_id}' with matching lease token"
            )));
        }

        Ok(())
    }

    async fn fail_job(
        &self,
        job_id: &str,
        worker_id: &str,
        lease_token: &str,
        error_message: &str,
    ) -> AppResult<()> {
        let job_uuid = parse_job_id(job_id)?;
        let max_attempts = i16::try_from(self.max_attempts).map_err(|error| {
            AppError::Validation(format!("invalid deletion max_attempts value: {error}"))
        })?;

        let result = sqlx::query(
            r#"
            UPDATE deletion_jobs
            SET
                status = CASE
                    WHEN attempt_count >= $5 THEN 'failed'
                    ELSE 'pending'
                END,
                leased_by = NULL,
                lease_token = NULL,
                lease_expires_at = NULL,
                updated_at = now(),
                last_error = $4
            WHERE id = $1
              AND leased_by = $2
              AND lease_token = $3
              AND status = 'leased'
            "#,
        )
        .bind(job_uuid)
        .bind(worker_id)
        .bind(lease_token)
        .bind(error_message)
        .bind(max_attempts)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to mark deletion job '{job_id}' as failed for worker '{worker_id}': {error}"
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "deletion job '{job_id}' is not currently leased by worker '{worker_id}' with matching lease token"
            )));
        }

        Ok(())
    }
}

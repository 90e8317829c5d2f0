use std::sync::Arc;

use sandgraph_core::{AppError, AppResult};
use tracing::debug;

use crate::{
    CacheInvalidator, ClaimedDeletionJob, DeletionJob, DeletionJobQueue, GraphMutationRepository,
    InvalidationScope,
};

/// Result of applying one deletion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionJobReport {
    /// Executed job identifier.
    pub job_id: String,
    /// Whether graph state was actually removed (false on replays).
    pub removed: bool,
    /// Audience the cached element state was invalidated for.
    pub invalidation_scope: InvalidationScope,
}

/// Worker-side service draining the deletion queue.
#[derive(Clone)]
pub struct DeletionWorkerService {
    queue: Arc<dyn DeletionJobQueue>,
    mutation_repository: Arc<dyn GraphMutationRepository>,
    cache_invalidator: Arc<dyn CacheInvalidator>,
}

impl DeletionWorkerService {
    /// Creates a worker service.
    #[must_use]
    pub fn new(
        queue: Arc<dyn DeletionJobQueue>,
        mutation_repository: Arc<dyn GraphMutationRepository>,
        cache_invalidator: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self {
            queue,
            mutation_repository,
            cache_invalidator,
        }
    }

    /// Claims queued deletion jobs for one worker.
    pub async fn claim_jobs_for_worker(
        &self,
        worker_id: &str,
        limit: usize,
        lease_seconds: u32,
    ) -> AppResult<Vec<ClaimedDeletionJob>> {
        if worker_id.trim().is_empty() {
            return Err(AppError::Validation(
                "worker_id must not be empty".to_owned(),
            ));
        }

        if limit == 0 {
            return Err(AppError::Validation(
                "limit must be greater than zero".to_owned(),
            ));
        }

        if lease_seconds == 0 {
            return Err(AppError::Validation(
                "lease_seconds must be greater than zero".to_owned(),
            ));
        }

        self.queue.claim_jobs(worker_id, limit, lease_seconds).await
    }

    /// Applies one claimed job and finalizes its queue state.
    pub async fn execute_claimed_job(
        &self,
        worker_id: &str,
        claimed: ClaimedDeletionJob,
    ) -> AppResult<DeletionJobReport> {
        if worker_id.trim().is_empty() {
            return Err(AppError::Validation(
                "worker_id must not be empty".to_owned(),
            ));
        }

        if claimed.lease_token.trim().is_empty() {
            return Err(AppError::Validation(
                "claimed deletion job lease_token must not be empty".to_owned(),
            ));
        }

        let job_id = claimed.job_id;
        let lease_token = claimed.lease_token;

        match self.apply(&claimed.job).await {
            Ok((removed, invalidation_scope)) => {
                self.queue
                    .complete_job(job_id.as_str(), worker_id, lease_token.as_str())
                    .await?;
                Ok(DeletionJobReport {
                    job_id,
                    removed,
                    invalidation_scope,
                })
            }
            Err(error) => {
                let error_message = error.to_string();
                if let Err(mark_error) = self
                    .queue
                    .fail_job(
                        job_id.as_str(),
                        worker_id,
                        lease_token.as_str(),
                        error_message.as_str(),
                    )
                    .await
                {
                    return Err(AppError::Internal(format!(
                        "failed to execute deletion job '{job_id}': {error}; additionally failed to mark queue job failed: {mark_error}"
                    )));
                }

                Err(error)
            }
        }
    }

    async fn apply(&self, job: &DeletionJob) -> AppResult<(bool, InvalidationScope)> {
        // Public deletions retract published state for everyone; private ones
        // must never touch anything outside the originating workspace.
        let (removed, scope) = if job.is_public {
            let removed = self
                .mutation_repository
                .remove_published_element(&job.element_id)
                .await?;
            (removed, InvalidationScope::AllWorkspaces)
        } else {
            let workspace_id = job.workspace_id.as_ref().ok_or_else(|| {
                AppError::Validation(format!(
                    "private deletion of element '{}' has no workspace",
                    job.element_id
                ))
            })?;
            let removed = self
                .mutation_repository
                .discard_workspace_draft(&job.element_id, workspace_id)
                .await?;
            (removed, InvalidationScope::Workspace(workspace_id.clone()))
        };

        debug!(
            element_id = %job.element_id,
            priority = job.priority.as_str(),
            removed,
            "applied element deletion"
        );

        self.cache_invalidator
            .invalidate(&job.element_id, scope.clone())
            .await?;

        Ok((removed, scope))
    }
}

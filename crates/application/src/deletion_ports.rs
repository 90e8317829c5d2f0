use async_trait::async_trait;
use sandgraph_core::{AppResult, Authorizations, ElementId, WorkspaceId};
use sandgraph_domain::{ElementKind, Priority};

/// Attempts a deletion job gets before it is marked failed for good.
pub const DEFAULT_DELETION_MAX_ATTEMPTS: u16 = 5;

/// Unit of work handed to the deletion pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionJob {
    /// Element to remove.
    pub element_id: ElementId,
    /// Kind of the element to remove.
    pub element_kind: ElementKind,
    /// Workspace the deletion was requested from.
    pub workspace_id: Option<WorkspaceId>,
    /// Whether published state visible to other workspaces must be retracted.
    pub is_public: bool,
    /// Urgency tier of the job.
    pub priority: Priority,
    /// Subject that requested the deletion.
    pub requested_by: String,
    /// Capability token of the requester.
    pub authorizations: Authorizations,
}

/// Job leased to one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedDeletionJob {
    /// Stable job identifier.
    pub job_id: String,
    /// Lease token required to complete or fail the job.
    pub lease_token: String,
    /// Submitted job payload.
    pub job: DeletionJob,
}

/// Port for durably submitting deletion work.
#[async_trait]
pub trait DeletionDispatcher: Send + Sync {
    /// Enqueues one job and returns its identifier once it is durable.
    async fn submit(&self, job: DeletionJob) -> AppResult<String>;
}

/// Worker-side port of the deletion queue.
///
/// Jobs are claimed by priority, highest first, then by submission order.
/// Every claim counts as one attempt.
#[async_trait]
pub trait DeletionJobQueue: Send + Sync {
    /// Claims queued jobs for one worker with a bounded lease.
    async fn claim_jobs(
        &self,
        worker_id: &str,
        limit: usize,
        lease_seconds: u32,
    ) -> AppResult<Vec<ClaimedDeletionJob>>;

    /// Marks one leased job as completed.
    async fn complete_job(&self, job_id: &str, worker_id: &str, lease_token: &str)
    -> AppResult<()>;

    /// Records a failed attempt of one leased job.
    ///
    /// The job returns to the queue while attempts remain and is marked
    /// failed once they are exhausted.
    async fn fail_job(
        &self,
        job_id: &str,
        worker_id: &str,
        lease_token: &str,
        error_message: &str,
    ) -> AppResult<()>;
}

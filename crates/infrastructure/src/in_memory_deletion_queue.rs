use std::time::{Duration, Instant};

use async_trait::async_trait;
use sandgraph_application::{
    ClaimedDeletionJob, DEFAULT_DELETION_MAX_ATTEMPTS, DeletionDispatcher, DeletionJob,
    DeletionJobQueue,
};
use sandgraph_core::{AppError, AppResult};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Lifecycle state of one queued deletion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionJobStatus {
    /// Waiting to be claimed.
    Pending,
    /// Leased to a worker.
    Leased,
    /// Applied successfully.
    Completed,
    /// Out of attempts, with the last recorded error.
    Failed(String),
}

#[derive(Debug)]
struct Lease {
    worker_id: String,
    token: String,
    expires_at: Instant,
}

#[derive(Debug)]
struct QueuedJob {
    sequence: u64,
    job_id: String,
    job: DeletionJob,
    status: DeletionJobStatus,
    lease: Option<Lease>,
    attempts: u16,
    last_error: Option<String>,
}

impl QueuedJob {
    fn is_claimable(&self, now: Instant) -> bool {
        match self.status {
            DeletionJobStatus::Pending => true,
            DeletionJobStatus::Leased => self
                .lease
                .as_ref()
                .is_some_and(|lease| lease.expires_at <= now),
            DeletionJobStatus::Completed | DeletionJobStatus::Failed(_) => false,
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    next_sequence: u64,
    jobs: Vec<QueuedJob>,
}

/// In-memory deletion queue ordered by priority, then submission order.
#[derive(Debug)]
pub struct InMemoryDeletionQueue {
    state: Mutex<QueueState>,
    max_attempts: u16,
}

impl Default for InMemoryDeletionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDeletionQueue {
    /// Creates an empty queue with the default attempt limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_attempts(DEFAULT_DELETION_MAX_ATTEMPTS)
    }

    /// Creates an empty queue that gives each job `max_attempts` claims.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u16) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Returns how many times one job has been claimed and the last error it
    /// failed with.
    pub async fn job_attempts(&self, job_id: &str) -> Option<(u16, Option<String>)> {
        self.state
            .lock()
            .await
            .jobs
            .iter()
            .find(|queued| queued.job_id == job_id)
            .map(|queued| (queued.attempts, queued.last_error.clone()))
    }

    /// Returns the status of one job, if it was ever submitted.
    pub async fn job_status(&self, job_id: &str) -> Option<DeletionJobStatus> {
        self.state
            .lock()
            .await
            .jobs
            .iter()
            .find(|queued| queued.job_id == job_id)
            .map(|queued| queued.status.clone())
    }

    /// Returns every submitted job in submission order.
    pub async fn submitted_jobs(&self) -> Vec<DeletionJob> {
        self.state
            .lock()
            .await
            .jobs
            .iter()
            .map(|queued| queued.job.clone())
            .collect()
    }

    /// Returns the identifier of every submitted job in submission order.
    pub async fn submitted_job_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .await
            .jobs
            .iter()
            .map(|queued| queued.job_id.clone())
            .collect()
    }
}

#[async_trait]
impl DeletionDispatcher for InMemoryDeletionQueue {
    async fn submit(&self, job: DeletionJob) -> AppResult<String> {
        let mut state = self.state.lock().await;
        let sequence = state.next_sequence;
        state.next_sequence = state.next_sequence.saturating_add(1);

        let job_id = Uuid::new_v4().to_string();
        state.jobs.push(QueuedJob {
            sequence,
            job_id: job_id.clone(),
            job,
            status: DeletionJobStatus::Pending,
            lease: None,
            attempts: 0,
            last_error: None,
        });

        Ok(job_id)
    }
}

#[async_trait]
impl DeletionJobQueue for InMemoryDeletionQueue {
    async fn claim_jobs(
        &self,
        worker_id: &str,
        limit: usize,
        lease_seconds: u32,
    ) -> AppResult<Vec<ClaimedDeletionJob>> {
        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(lease_seconds)))
            .unwrap_or(now);
        let mut state = self.state.lock().await;

        let mut candidates: Vec<&mut QueuedJob> = state
            .jobs
            .iter_mut()
            .filter(|queued| queued.is_claimable(now))
            .collect();
        candidates.sort_by(|left, right| {
            right
                .job
                .priority
                .cmp(&left.job.priority)
                .then(left.sequence.cmp(&right.sequence))
        });

        Ok(candidates
            .into_iter()
            .take(limit)
            .map(|queued| {
                let token = Uuid::new_v4().to_string();
                queued.status = DeletionJobStatus::Leased;
                queued.attempts = queued.attempts.saturating_add(1);
                queued.lease = Some(Lease {
                    worker_id: worker_id.to_owned(),
                    token: token.clone(),
                    expires_at,
                });

                ClaimedDeletionJob {
                    job_id: queued.job_id.clone(),
                    lease_token: token,
                    job: queued.job.clone(),
                }
            })
            .collect())
    }

    async fn complete_job(&self, job_id: &str, worker_id: &str, lease_token: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let queued = find_leased_job(&mut state, job_id, worker_id, lease_token)?;
        queued.status = DeletionJobStatus::Completed;
        queued.lease = None;
        Ok(())
    }

    async fn fail_job(
        &self,
        job_id: &str,
        worker_id: &str,
        lease_token: &str,
        error_message: &str,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let queued = find_leased_job(&mut state, job_id, worker_id, lease_token)?;
        queued.status = if queued.attempts >= self.max_attempts {
            DeletionJobStatus::Failed(error_message.to_owned())
        } else {
            DeletionJobStatus::Pending
        };
        queued.last_error = Some(error_message.to_owned());
        queued.lease = None;
        Ok(())
    }
}

fn find_leased_job<'a>(
    state: &'a mut QueueState,
    job_id: &str,
    worker_id: &str,
    lease_token: &str,
) -> AppResult<&'a mut QueuedJob> {
    let queued = state
        .jobs
        .iter_mut()
        .find(|queued| queued.job_id == job_id)
        .ok_or_else(|| AppError::NotFound(format!("deletion job '{job_id}' does not exist")))?;

    let holds_lease = queued.status == DeletionJobStatus::Leased
        && queued
            .lease
            .as_ref()
            .is_some_and(|lease| lease.worker_id == worker_id && lease.token == lease_token);
    if !holds_lease {
        return Err(AppError::Conflict(format!(
            "worker '{worker_id}' does not hold the lease of deletion job '{job_id}'"
        )));
    }

    Ok(queued)
}

#[cfg(test)]
mod tests;

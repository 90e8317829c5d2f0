use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use sandgraph_application::{
    CacheInvalidator, DeletionDispatcher, DeletionJob, DeletionJobQueue, DeletionWorkerService,
    InvalidationScope,
};
use sandgraph_core::{AppError, AppResult, Authorizations, ElementId};
use sandgraph_domain::{ElementKind, GraphElement, Priority};

use super::{DeletionJobStatus, InMemoryDeletionQueue};
use crate::InMemoryGraphRepository;

fn job(element_id: &str, priority: Priority) -> DeletionJob {
    DeletionJob {
        element_id: ElementId::new(element_id).unwrap_or_else(|_| unreachable!()),
        element_kind: ElementKind::Vertex,
        workspace_id: None,
        is_public: true,
        priority,
        requested_by: "alice".to_owned(),
        authorizations: Authorizations::default(),
    }
}

async fn submit(queue: &InMemoryDeletionQueue, element_id: &str, priority: Priority) -> String {
    queue
        .submit(job(element_id, priority))
        .await
        .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn claims_by_priority_then_submission_order() {
    let queue = InMemoryDeletionQueue::new();
    submit(&queue, "low", Priority::Low).await;
    submit(&queue, "high-1", Priority::High).await;
    submit(&queue, "normal", Priority::Normal).await;
    submit(&queue, "high-2", Priority::High).await;

    let claimed = queue
        .claim_jobs("worker-1", 10, 30)
        .await
        .unwrap_or_default();
    let order: Vec<&str> = claimed
        .iter()
        .map(|claimed| claimed.job.element_id.as_str())
        .collect();

    assert_eq!(order, vec!["high-1", "high-2", "normal", "low"]);
}

#[tokio::test]
async fn leased_jobs_are_not_claimed_twice() {
    let queue = InMemoryDeletionQueue::new();
    submit(&queue, "E1", Priority::High).await;

    let first = queue.claim_jobs("worker-1", 10, 30).await.unwrap_or_default();
    let second = queue.claim_jobs("worker-2", 10, 30).await.unwrap_or_default();

    assert_eq!(first.len(), 1);
    assert!(second.is_empty());
}

#[tokio::test]
async fn expired_leases_are_reclaimable() {
    let queue = InMemoryDeletionQueue::new();
    submit(&queue, "E1", Priority::High).await;

    let first = queue.claim_jobs("worker-1", 10, 0).await.unwrap_or_default();
    let second = queue.claim_jobs("worker-2", 10, 30).await.unwrap_or_default();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_ne!(first[0].lease_token, second[0].lease_token);

    let stale = queue
        .complete_job(&first[0].job_id, "worker-1", &first[0].lease_token)
        .await;
    assert!(matches!(stale, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn complete_and_fail_require_the_lease() {
    let queue = InMemoryDeletionQueue::with_max_attempts(1);
    let completed_id = submit(&queue, "E1", Priority::High).await;
    let failed_id = submit(&queue, "E2", Priority::High).await;

    let claimed = queue.claim_jobs("worker-1", 10, 30).await.unwrap_or_default();
    assert_eq!(claimed.len(), 2);

    let wrong_token = queue
        .complete_job(&claimed[0].job_id, "worker-1", "not-the-token")
        .await;
    assert!(wrong_token.is_err());

    for claimed_job in &claimed {
        let result = if claimed_job.job_id == completed_id {
            queue
                .complete_job(&claimed_job.job_id, "worker-1", &claimed_job.lease_token)
                .await
        } else {
            queue
                .fail_job(
                    &claimed_job.job_id,
                    "worker-1",
                    &claimed_job.lease_token,
                    "graph store offline",
                )
                .await
        };
        assert!(result.is_ok());
    }

    assert_eq!(
        queue.job_status(&completed_id).await,
        Some(DeletionJobStatus::Completed)
    );
    assert_eq!(
        queue.job_status(&failed_id).await,
        Some(DeletionJobStatus::Failed("graph store offline".to_owned()))
    );
    assert!(queue.claim_jobs("worker-1", 10, 30).await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn failed_attempts_return_to_queue_until_exhausted() {
    let queue = InMemoryDeletionQueue::with_max_attempts(2);
    let job_id = submit(&queue, "E1", Priority::High).await;

    let first = queue.claim_jobs("worker-1", 10, 30).await.unwrap_or_default();
    assert_eq!(first.len(), 1);
    let failed = queue
        .fail_job(&job_id, "worker-1", &first[0].lease_token, "broker offline")
        .await;
    assert!(failed.is_ok());
    assert_eq!(queue.job_status(&job_id).await, Some(DeletionJobStatus::Pending));

    let second = queue.claim_jobs("worker-2", 10, 30).await.unwrap_or_default();
    assert_eq!(second.len(), 1);
    let failed = queue
        .fail_job(&job_id, "worker-2", &second[0].lease_token, "broker offline")
        .await;
    assert!(failed.is_ok());

    assert_eq!(
        queue.job_status(&job_id).await,
        Some(DeletionJobStatus::Failed("broker offline".to_owned()))
    );
    assert_eq!(
        queue.job_attempts(&job_id).await,
        Some((2, Some("broker offline".to_owned())))
    );
    assert!(queue.claim_jobs("worker-1", 10, 30).await.unwrap_or_default().is_empty());
}

#[derive(Default)]
struct FlakyInvalidator {
    recovered: AtomicBool,
}

#[async_trait]
impl CacheInvalidator for FlakyInvalidator {
    async fn invalidate(
        &self,
        _element_id: &ElementId,
        _scope: InvalidationScope,
    ) -> AppResult<()> {
        if self.recovered.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::Unavailable("broker offline".to_owned()))
        }
    }
}

#[tokio::test]
async fn public_deletion_is_retried_after_invalidation_failure() {
    let queue = Arc::new(InMemoryDeletionQueue::new());
    let graph = Arc::new(InMemoryGraphRepository::new());
    let invalidator = Arc::new(FlakyInvalidator::default());
    graph
        .save_element(
            GraphElement::published("E1", "graph", ElementKind::Vertex)
                .unwrap_or_else(|_| unreachable!()),
        )
        .await;
    let worker = DeletionWorkerService::new(queue.clone(), graph.clone(), invalidator.clone());
    let job_id = submit(&queue, "E1", Priority::High).await;

    let claimed = worker
        .claim_jobs_for_worker("worker-1", 10, 30)
        .await
        .unwrap_or_default();
    assert_eq!(claimed.len(), 1);
    let first = worker
        .execute_claimed_job("worker-1", claimed[0].clone())
        .await;
    assert!(matches!(first, Err(AppError::Unavailable(_))));

    let element_id = ElementId::new("E1").unwrap_or_else(|_| unreachable!());
    assert!(!graph.contains_element(&element_id).await);
    assert_eq!(queue.job_status(&job_id).await, Some(DeletionJobStatus::Pending));

    invalidator.recovered.store(true, Ordering::SeqCst);
    let reclaimed = worker
        .claim_jobs_for_worker("worker-2", 10, 30)
        .await
        .unwrap_or_default();
    assert_eq!(reclaimed.len(), 1);
    let report = worker
        .execute_claimed_job("worker-2", reclaimed[0].clone())
        .await;

    assert_eq!(
        report.map(|report| (report.removed, report.invalidation_scope)).ok(),
        Some((false, InvalidationScope::AllWorkspaces))
    );
    assert_eq!(queue.job_status(&job_id).await, Some(DeletionJobStatus::Completed));
}

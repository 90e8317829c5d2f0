use async_trait::async_trait;
use sandgraph_application::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditRepository};
use sandgraph_core::AppResult;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory append-only audit trail.
#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    entries: RwLock<Vec<AuditLogEntry>>,
}

impl InMemoryAuditRepository {
    /// Creates an empty audit trail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded event in append order.
    pub async fn events(&self) -> Vec<AuditEvent> {
        self.entries
            .read()
            .await
            .iter()
            .map(|entry| entry.event.clone())
            .collect()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.entries.write().await.push(AuditLogEntry {
            event_id: Uuid::new_v4().to_string(),
            event,
        });
        Ok(())
    }

    async fn list_events(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        let entries = self.entries.read().await;

        // Append order is the tiebreak for events stamped in the same instant.
        let mut matching: Vec<(usize, &AuditLogEntry)> = entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                query
                    .subject_id
                    .as_deref()
                    .is_none_or(|subject_id| entry.event.subject_id == subject_id)
            })
            .collect();
        matching.sort_by(|(left_index, left), (right_index, right)| {
            right
                .event
                .occurred_at
                .cmp(&left.event.occurred_at)
                .then(right_index.cmp(left_index))
        });

        Ok(matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use sandgraph_application::{AuditEvent, AuditLogQuery, AuditRepository};
    use sandgraph_domain::AuditAction;

    use super::InMemoryAuditRepository;

    fn event(subject_id: &str, minutes_ago: i64) -> AuditEvent {
        AuditEvent {
            action: AuditAction::DeleteVertex,
            actor: "alice".to_owned(),
            workspace_id: None,
            subject_id: subject_id.to_owned(),
            detail: None,
            occurred_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn lists_newest_first_with_subject_filter_and_paging() {
        let repository = InMemoryAuditRepository::new();
        for (subject_id, minutes_ago) in [("E1", 30), ("E2", 20), ("E1", 10), ("E1", 5)] {
            let appended = repository.append_event(event(subject_id, minutes_ago)).await;
            assert!(appended.is_ok());
        }

        let entries = repository
            .list_events(AuditLogQuery {
                limit: 10,
                offset: 1,
                subject_id: Some("E1".to_owned()),
            })
            .await
            .unwrap_or_default();

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|entry| entry.event.subject_id == "E1"));
        assert!(entries[0].event.occurred_at > entries[1].event.occurred_at);
    }
}

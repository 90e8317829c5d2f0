use std::sync::Arc;

use sandgraph_core::{AppError, AppResult, Requester};
use sandgraph_domain::Permission;

use crate::{AuditLogEntry, AuditLogQuery, AuditRepository, AuthorizationService};

/// Largest page the audit log can be read with.
pub const AUDIT_LOG_MAX_LIMIT: usize = 500;

/// Read access to the audit trail for administrators.
#[derive(Clone)]
pub struct AuditLogService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn AuditRepository>,
}

impl AuditLogService {
    /// Creates an audit log service.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
        }
    }

    /// Lists audit entries, newest first.
    pub async fn list_entries(
        &self,
        requester: &Requester,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.authorization_service
            .require_permission(requester.subject(), Permission::SecurityAuditRead)
            .await?;

        if query.limit == 0 || query.limit > AUDIT_LOG_MAX_LIMIT {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {AUDIT_LOG_MAX_LIMIT}"
            )));
        }

        self.repository.list_events(query).await
    }
}

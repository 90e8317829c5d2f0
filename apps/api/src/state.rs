use sandgraph_application::{AuditLogService, DeletionService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub deletion_service: DeletionService,
    pub audit_log_service: AuditLogService,
    pub gateway_shared_secret: String,
    /// Pool probed by the health check.
    ///
    /// Cache invalidation is published by the worker, so the API holds no
    /// broker connection.
    pub postgres_pool: Option<sqlx::PgPool>,
}

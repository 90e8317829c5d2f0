use std::sync::Arc;

use sandgraph_application::{
    AuditLogService, AuditRecorder, AuthorizationService, DeletionService,
    SandboxVisibilityClassifier,
};
use sandgraph_core::AppError;
use sandgraph_infrastructure::{
    PostgresAuditRepository, PostgresAuthorizationRepository, PostgresDeletionQueue,
    PostgresGraphRepository,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub async fn connect_and_migrate(database_url: &str) -> Result<PgPool, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    Ok(pool)
}

pub fn build_app_state(config: &ApiConfig, pool: PgPool) -> AppState {
    let graph_repository = Arc::new(PostgresGraphRepository::new(pool.clone()));
    let authorization_service = AuthorizationService::new(Arc::new(
        PostgresAuthorizationRepository::new(pool.clone()),
    ));
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool.clone()));

    let deletion_service = DeletionService::new(
        graph_repository,
        Arc::new(authorization_service.clone()),
        Arc::new(SandboxVisibilityClassifier),
        Arc::new(PostgresDeletionQueue::new(pool.clone())),
        AuditRecorder::new(audit_repository.clone()),
    );
    let audit_log_service = AuditLogService::new(authorization_service, audit_repository);

    AppState {
        deletion_service,
        audit_log_service,
        gateway_shared_secret: config.gateway_shared_secret.clone(),
        postgres_pool: Some(pool),
    }
}

//! Sandgraph deletion worker runtime.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use sandgraph_application::{
    CacheInvalidator, DEFAULT_DELETION_MAX_ATTEMPTS, DeletionWorkerService,
};
use sandgraph_core::{AppError, AppResult};
use sandgraph_infrastructure::{
    DEFAULT_INVALIDATION_CHANNEL, LoggingCacheInvalidator, PostgresDeletionQueue,
    PostgresGraphRepository, RedisCacheInvalidator,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    worker_id: String,
    claim_limit: usize,
    lease_seconds: u32,
    poll_interval_ms: u64,
    max_attempts: u16,
    redis_url: Option<String>,
    invalidation_channel: String,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;
    let cache_invalidator = build_cache_invalidator(&config)?;
    let worker_service = build_worker_service(pool, config.max_attempts, cache_invalidator);

    info!(
        worker_id = %config.worker_id,
        claim_limit = config.claim_limit,
        lease_seconds = config.lease_seconds,
        poll_interval_ms = config.poll_interval_ms,
        max_attempts = config.max_attempts,
        redis_enabled = config.redis_url.is_some(),
        "sandgraph-worker started"
    );

    loop {
        match worker_service
            .claim_jobs_for_worker(
                config.worker_id.as_str(),
                config.claim_limit,
                config.lease_seconds,
            )
            .await
        {
            Ok(claimed_jobs) => {
                if claimed_jobs.is_empty() {
                    tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
                    continue;
                }

                info!(
                    worker_id = %config.worker_id,
                    claimed_count = claimed_jobs.len(),
                    "claimed deletion jobs"
                );

                for claimed_job in claimed_jobs {
                    let job_id = claimed_job.job_id.clone();
                    let element_id = claimed_job.job.element_id.clone();

                    match worker_service
                        .execute_claimed_job(config.worker_id.as_str(), claimed_job)
                        .await
                    {
                        Ok(report) => {
                            info!(
                                worker_id = %config.worker_id,
                                job_id = %job_id,
                                %element_id,
                                removed = report.removed,
                                "deletion job executed"
                            );
                        }
                        Err(error) => {
                            warn!(
                                worker_id = %config.worker_id,
                                job_id = %job_id,
                                %element_id,
                                error = %error,
                                "deletion job execution failed"
                            );
                        }
                    }
                }
            }
            Err(error) => {
                warn!(
                    worker_id = %config.worker_id,
                    error = %error,
                    "failed to claim deletion jobs"
                );
                tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
            }
        }
    }
}

async fn connect_pool(database_url: &str) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

fn build_cache_invalidator(config: &WorkerConfig) -> AppResult<Arc<dyn CacheInvalidator>> {
    let Some(redis_url) = config.redis_url.as_deref() else {
        return Ok(Arc::new(LoggingCacheInvalidator));
    };

    let client = redis::Client::open(redis_url)
        .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))?;

    Ok(Arc::new(RedisCacheInvalidator::new(
        client,
        config.invalidation_channel.clone(),
    )))
}

fn build_worker_service(
    pool: PgPool,
    max_attempts: u16,
    cache_invalidator: Arc<dyn CacheInvalidator>,
) -> DeletionWorkerService {
    DeletionWorkerService::new(
        Arc::new(PostgresDeletionQueue::new(pool.clone()).with_max_attempts(max_attempts)),
        Arc::new(PostgresGraphRepository::new(pool)),
        cache_invalidator,
    )
}

impl WorkerConfig {
    fn load() -> AppResult<Self> {
        let database_url = required_env("DATABASE_URL")?;
        let worker_id = env::var("WORKER_ID")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "deletion-worker".to_owned());
        let claim_limit = parse_env_usize("WORKER_CLAIM_LIMIT", 10)?;
        let lease_seconds = parse_env_u32("WORKER_LEASE_SECONDS", 30)?;
        let poll_interval_ms = parse_env_u64("WORKER_POLL_INTERVAL_MS", 1000)?;
        let max_attempts = parse_env_u16("WORKER_MAX_ATTEMPTS", DEFAULT_DELETION_MAX_ATTEMPTS)?;
        let redis_url = env::var("REDIS_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let invalidation_channel = env::var("REDIS_INVALIDATION_CHANNEL")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_INVALIDATION_CHANNEL.to_owned());

        if claim_limit == 0 {
            return Err(AppError::Validation(
                "WORKER_CLAIM_LIMIT must be greater than zero".to_owned(),
            ));
        }

        if lease_seconds == 0 {
            return Err(AppError::Validation(
                "WORKER_LEASE_SECONDS must be greater than zero".to_owned(),
            ));
        }

        if max_attempts == 0 {
            return Err(AppError::Validation(
                "WORKER_MAX_ATTEMPTS must be greater than zero".to_owned(),
            ));
        }

        if poll_interval_ms == 0 {
            return Err(AppError::Validation(
                "WORKER_POLL_INTERVAL_MS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            database_url,
            worker_id,
            claim_limit,
            lease_seconds,
            poll_interval_ms,
            max_attempts,
            redis_url,
            invalidation_channel,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn parse_env_usize(name: &str, default: usize) -> AppResult<usize> {
    match env::var(name) {
        Ok(value) => value.parse::<usize>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> AppResult<u16> {
    match env::var(name) {
        Ok(value) => value.parse::<u16>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> AppResult<u32> {
    match env::var(name) {
        Ok(value) => value.parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}

//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_audit_repository;
mod in_memory_authorization_repository;
mod in_memory_deletion_queue;
mod in_memory_graph_repository;
mod logging_cache_invalidator;
mod postgres_audit_repository;
mod postgres_authorization_repository;
mod postgres_deletion_queue;
mod postgres_graph_repository;
mod redis_cache_invalidator;

pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_authorization_repository::InMemoryAuthorizationRepository;
pub use in_memory_deletion_queue::{DeletionJobStatus, InMemoryDeletionQueue};
pub use in_memory_graph_repository::InMemoryGraphRepository;
pub use logging_cache_invalidator::LoggingCacheInvalidator;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_deletion_queue::PostgresDeletionQueue;
pub use postgres_graph_repository::PostgresGraphRepository;
pub use redis_cache_invalidator::{DEFAULT_INVALIDATION_CHANNEL, RedisCacheInvalidator};

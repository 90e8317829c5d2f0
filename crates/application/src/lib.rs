//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_log_service;
mod audit_ports;
mod audit_recorder;
mod authorization_service;
mod deletion_ports;
mod deletion_service;
mod deletion_worker_service;
mod graph_ports;
mod visibility;

pub use audit_log_service::{AUDIT_LOG_MAX_LIMIT, AuditLogService};
pub use audit_ports::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditRepository};
pub use audit_recorder::AuditRecorder;
pub use authorization_service::{AuthorizationGate, AuthorizationRepository, AuthorizationService};
pub use deletion_ports::{
    ClaimedDeletionJob, DEFAULT_DELETION_MAX_ATTEMPTS, DeletionDispatcher, DeletionJob,
    DeletionJobQueue,
};
pub use deletion_service::{
    DELETION_PRIORITY, DeletionError, DeletionErrorKind, DeletionOutcome, DeletionService,
};
pub use deletion_worker_service::{DeletionJobReport, DeletionWorkerService};
pub use graph_ports::{
    CacheInvalidator, GraphElementRepository, GraphMutationRepository, InvalidationScope,
};
pub use visibility::{SandboxVisibilityClassifier, VisibilityClassifier};

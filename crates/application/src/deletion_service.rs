use std::sync::Arc;

use sandgraph_core::{AppError, ElementId, Requester, WorkspaceId};
use sandgraph_domain::{Priority, SandboxStatus};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    AuditRecorder, AuthorizationGate, DeletionDispatcher, DeletionJob, GraphElementRepository,
    VisibilityClassifier,
};

/// Priority every deletion is dispatched with, regardless of visibility.
pub const DELETION_PRIORITY: Priority = Priority::High;

/// Caller-visible failure category of a deletion request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeletionErrorKind {
    /// The element does not resolve in the requester's authorization scope.
    NotFound,
    /// The authorization gate rejected the requester.
    AccessDenied,
    /// The deletion could not be handed to the mutation pipeline.
    DispatchError,
}

impl DeletionErrorKind {
    /// Returns a stable transport value for the kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AccessDenied => "access_denied",
            Self::DispatchError => "dispatch_error",
        }
    }

    /// Returns whether the caller may retry the same request.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DispatchError)
    }
}

/// Classified deletion failure.
///
/// Messages carry the kind and the element id only; underlying causes are
/// logged where they are classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeletionError {
    /// The element does not resolve in the requester's authorization scope.
    #[error("element '{element_id}' was not found")]
    NotFound {
        /// Requested element.
        element_id: ElementId,
    },

    /// The authorization gate rejected the requester.
    #[error("element '{element_id}' is not deletable")]
    AccessDenied {
        /// Requested element.
        element_id: ElementId,
    },

    /// The deletion could not be handed to the mutation pipeline.
    #[error("deletion of element '{element_id}' could not be dispatched")]
    DispatchError {
        /// Requested element.
        element_id: ElementId,
    },
}

impl DeletionError {
    /// Returns the failure category.
    #[must_use]
    pub fn kind(&self) -> DeletionErrorKind {
        match self {
            Self::NotFound { .. } => DeletionErrorKind::NotFound,
            Self::AccessDenied { .. } => DeletionErrorKind::AccessDenied,
            Self::DispatchError { .. } => DeletionErrorKind::DispatchError,
        }
    }

    /// Returns the element the request targeted.
    #[must_use]
    pub fn element_id(&self) -> &ElementId {
        match self {
            Self::NotFound { element_id }
            | Self::AccessDenied { element_id }
            | Self::DispatchError { element_id } => element_id,
        }
    }
}

impl From<DeletionError> for AppError {
    fn from(value: DeletionError) -> Self {
        let message = value.to_string();
        match value.kind() {
            DeletionErrorKind::NotFound => AppError::NotFound(message),
            DeletionErrorKind::AccessDenied => AppError::Forbidden(message),
            DeletionErrorKind::DispatchError => AppError::Unavailable(message),
        }
    }
}

/// Acknowledgement of an accepted deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionOutcome {
    /// Identifier of the queued deletion job.
    pub job_id: String,
    /// Classification the dispatch decision was based on.
    pub sandbox_status: SandboxStatus,
    /// False when the audit trail could not be written (degraded success).
    pub audit_recorded: bool,
}

/// Orchestrates sandbox-aware, authorization-gated element deletion.
#[derive(Clone)]
pub struct DeletionService {
    element_repository: Arc<dyn GraphElementRepository>,
    authorization_gate: Arc<dyn AuthorizationGate>,
    visibility_classifier: Arc<dyn VisibilityClassifier>,
    dispatcher: Arc<dyn DeletionDispatcher>,
    audit_recorder: AuditRecorder,
}

impl DeletionService {
    /// Creates a deletion service from its collaborators.
    #[must_use]
    pub fn new(
        element_repository: Arc<dyn GraphElementRepository>,
        authorization_gate: Arc<dyn AuthorizationGate>,
        visibility_classifier: Arc<dyn VisibilityClassifier>,
        dispatcher: Arc<dyn DeletionDispatcher>,
        audit_recorder: AuditRecorder,
    ) -> Self {
        Self {
            element_repository,
            authorization_gate,
            visibility_classifier,
            dispatcher,
            audit_recorder,
        }
    }

    /// Deletes one element on behalf of the requester.
    ///
    /// Runs resolve, authorize, classify, dispatch and audit strictly in that
    /// order. Every failure before dispatch leaves no queued work and no audit
    /// entry; an audit failure after dispatch is reported through
    /// [`DeletionOutcome::audit_recorded`].
    pub async fn delete_element(
        &self,
        requester: &Requester,
        element_id: &ElementId,
        workspace_id: Option<&WorkspaceId>,
    ) -> Result<DeletionOutcome, DeletionError> {
        let subject = requester.subject();

        debug!(%element_id, subject, "resolving element for deletion");
        let element = self
            .element_repository
            .find_element(element_id, requester.authorizations())
            .await
            .map_err(|error| {
                warn!(%element_id, error = %error, "element lookup failed before dispatch");
                DeletionError::DispatchError {
                    element_id: element_id.clone(),
                }
            })?
            .ok_or_else(|| DeletionError::NotFound {
                element_id: element_id.clone(),
            })?;

        debug!(%element_id, subject, "authorizing element deletion");
        let allowed = self
            .authorization_gate
            .can_delete(&element, requester, workspace_id)
            .await
            .map_err(|error| {
                warn!(%element_id, error = %error, "authorization lookup failed before dispatch");
                DeletionError::DispatchError {
                    element_id: element_id.clone(),
                }
            })?;
        if !allowed {
            info!(%element_id, subject, "element deletion denied");
            return Err(DeletionError::AccessDenied {
                element_id: element_id.clone(),
            });
        }

        let sandbox_status = self.visibility_classifier.classify(&element, workspace_id);
        let is_public = sandbox_status.is_public();
        debug!(
            %element_id,
            sandbox_status = sandbox_status.as_str(),
            is_public,
            "classified element for deletion"
        );

        let job_id = self
            .dispatcher
            .submit(DeletionJob {
                element_id: element_id.clone(),
                element_kind: element.kind(),
                workspace_id: workspace_id.cloned(),
                is_public,
                priority: DELETION_PRIORITY,
                requested_by: subject.to_owned(),
                authorizations: requester.authorizations().clone(),
            })
            .await
            .map_err(|error| {
                warn!(%element_id, error = %error, "deletion dispatch failed");
                DeletionError::DispatchError {
                    element_id: element_id.clone(),
                }
            })?;

        let audit_recorded = match self
            .audit_recorder
            .record(
                requester.identity(),
                workspace_id,
                element.kind().delete_audit_action(),
                element_id.as_str(),
                Some(format!(
                    "job_id={job_id}; sandbox_status={}",
                    sandbox_status.as_str()
                )),
            )
            .await
        {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    %element_id,
                    job_id = %job_id,
                    error = %error,
                    "deletion dispatched but audit record could not be written"
                );
                false
            }
        };

        info!(
            %element_id,
            subject,
            job_id = %job_id,
            is_public,
            audit_recorded,
            "element deletion dispatched"
        );

        Ok(DeletionOutcome {
            job_id,
            sandbox_status,
            audit_recorded,
        })
    }
}

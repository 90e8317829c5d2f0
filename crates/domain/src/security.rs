use std::str::FromStr;

use sandgraph_core::AppError;
use serde::{Deserialize, Serialize};

/// Permissions enforced by application policy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows deleting graph elements.
    GraphElementDelete,
    /// Allows reading audit log entries.
    SecurityAuditRead,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GraphElementDelete => "graph.element.delete",
            Self::SecurityAuditRead => "security.audit.read",
        }
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "graph.element.delete" => Ok(Self::GraphElementDelete),
            "security.audit.read" => Ok(Self::SecurityAuditRead),
            _ => Err(AppError::Validation(format!(
                "unknown permission value '{value}'"
            ))),
        }
    }
}

/// Access level a subject holds on one workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceAccess {
    /// Can view workspace state.
    Read,
    /// Can edit workspace state.
    Write,
    /// Can edit and administer the workspace.
    Owner,
}

impl WorkspaceAccess {
    /// Returns a stable storage value for this access level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Owner => "owner",
        }
    }

    /// Returns whether this level allows mutating workspace state.
    #[must_use]
    pub fn can_write(&self) -> bool {
        matches!(self, Self::Write | Self::Owner)
    }
}

impl FromStr for WorkspaceAccess {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "owner" => Ok(Self::Owner),
            _ => Err(AppError::Validation(format!(
                "unknown workspace access value '{value}'"
            ))),
        }
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Emitted when a vertex deletion has been dispatched.
    DeleteVertex,
    /// Emitted when an edge deletion has been dispatched.
    DeleteEdge,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeleteVertex => "DELETE_VERTEX",
            Self::DeleteEdge => "DELETE_EDGE",
        }
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "DELETE_VERTEX" => Ok(Self::DeleteVertex),
            "DELETE_EDGE" => Ok(Self::DeleteEdge),
            _ => Err(AppError::Validation(format!(
                "unknown audit action '{value}'"
            ))),
        }
    }
}

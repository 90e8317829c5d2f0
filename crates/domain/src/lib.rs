//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod element;
mod priority;
mod security;

pub use element::{ElementKind, GraphElement, SandboxStatus};
pub use priority::Priority;
pub use security::{AuditAction, Permission, WorkspaceAccess};

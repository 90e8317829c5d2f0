use sandgraph_core::WorkspaceId;
use sandgraph_domain::{GraphElement, SandboxStatus};

/// Workspace-scoped visibility classification port.
///
/// Implementations must be deterministic and side-effect free; callers
/// classify again for every request instead of caching results.
pub trait VisibilityClassifier: Send + Sync {
    /// Classifies the element's current state relative to a workspace.
    fn classify(&self, element: &GraphElement, workspace_id: Option<&WorkspaceId>)
    -> SandboxStatus;
}

/// Classifier reading the sandbox state carried by the resolved element.
#[derive(Debug, Clone, Copy, Default)]
pub struct SandboxVisibilityClassifier;

impl VisibilityClassifier for SandboxVisibilityClassifier {
    fn classify(
        &self,
        element: &GraphElement,
        workspace_id: Option<&WorkspaceId>,
    ) -> SandboxStatus {
        element.sandbox_status(workspace_id)
    }
}

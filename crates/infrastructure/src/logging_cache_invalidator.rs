use async_trait::async_trait;
use sandgraph_application::{CacheInvalidator, InvalidationScope};
use sandgraph_core::{AppResult, ElementId};
use tracing::info;

/// Cache invalidator that only logs invalidations.
///
/// Used by workers when no message broker is configured. Nothing is retained
/// between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingCacheInvalidator;

#[async_trait]
impl CacheInvalidator for LoggingCacheInvalidator {
    async fn invalidate(
        &self,
        element_id: &ElementId,
        scope: InvalidationScope,
    ) -> AppResult<()> {
        match scope {
            InvalidationScope::AllWorkspaces => {
                info!(%element_id, "invalidated element for all workspaces");
            }
            InvalidationScope::Workspace(workspace_id) => {
                info!(%element_id, %workspace_id, "invalidated element for one workspace");
            }
        }

        Ok(())
    }
}

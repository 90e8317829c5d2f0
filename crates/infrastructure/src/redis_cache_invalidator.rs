//! Redis-backed cache invalidation publisher.

use async_trait::async_trait;
use redis::AsyncCommands;
use sandgraph_application::{CacheInvalidator, InvalidationScope};
use sandgraph_core::{AppError, AppResult, ElementId};
use serde::Serialize;
use tracing::debug;

/// Default channel invalidation messages are published on.
pub const DEFAULT_INVALIDATION_CHANNEL: &str = "sandgraph:element-invalidations";

/// Wire payload published for every invalidation.
#[derive(Debug, Serialize)]
struct InvalidationMessage<'a> {
    element_id: &'a str,
    scope: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    workspace_id: Option<&'a str>,
}

impl<'a> InvalidationMessage<'a> {
    fn new(element_id: &'a ElementId, scope: &'a InvalidationScope) -> Self {
        match scope {
            InvalidationScope::AllWorkspaces => Self {
                element_id: element_id.as_str(),
                scope: "all_workspaces",
                workspace_id: None,
            },
            InvalidationScope::Workspace(workspace_id) => Self {
                element_id: element_id.as_str(),
                scope: "workspace",
                workspace_id: Some(workspace_id.as_str()),
            },
        }
    }
}

/// Redis implementation of the cache invalidation port using `PUBLISH`.
#[derive(Clone)]
pub struct RedisCacheInvalidator {
    client: redis::Client,
    channel: String,
}

impl RedisCacheInvalidator {
    /// Creates an invalidator publishing on the given channel.
    #[must_use]
    pub fn new(client: redis::Client, channel: impl Into<String>) -> Self {
        Self {
            client,
            channel: channel.into(),
        }
    }

    fn encode_message(element_id: &ElementId, scope: &InvalidationScope) -> AppResult<String> {
        serde_json::to_string(&InvalidationMessage::new(element_id, scope)).map_err(|error| {
            AppError::Internal(format!(
                "failed to encode invalidation of element '{element_id}': {error}"
            ))
        })
    }
}

#[async_trait]
impl CacheInvalidator for RedisCacheInvalidator {
    async fn invalidate(
        &self,
        element_id: &ElementId,
        scope: InvalidationScope,
    ) -> AppResult<()> {
        let payload = Self::encode_message(element_id, &scope)?;
        let mut connection = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))?;

        let receivers: i64 = connection
            .publish(self.channel.as_str(), payload)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to publish invalidation of element '{element_id}': {error}"
                ))
            })?;

        debug!(%element_id, channel = %self.channel, receivers, "published element invalidation");
        Ok(())
    }
}

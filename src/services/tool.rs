//! Tool directory: likes, dislikes and access requests.

use serde::Serialize;
use tracing::info;

use super::CollectionService;
use crate::error::ServiceError;
use crate::models::{Tool, ToolVoteKind};
use crate::record::require;

/// Acknowledgement returned to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessRequestAck {
    pub success: bool,
    pub message: String,
}

impl CollectionService<Tool> {
    /// Record `user_id`'s like or dislike, replacing any earlier vote by the
    /// same user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the tool is absent.
    pub async fn vote(&self, id: i64, user_id: i64, kind: ToolVoteKind) -> Result<Tool, ServiceError> {
        let tool = self
            .mutate(id, move |tool: &mut Tool| {
                tool.cast_vote(user_id, kind);
                Ok(())
            })
            .await?;
        info!(id, user_id, ?kind, likes = tool.likes, dislikes = tool.dislikes, "tool vote recorded");
        Ok(tool)
    }

    /// Notify `recipient` that `user_email` wants access to a tool. Nothing
    /// is stored.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank email and `NotFound` when the tool
    /// is absent.
    pub async fn request_access(
        &self,
        tool_id: i64,
        user_email: &str,
        recipient: &str,
    ) -> Result<AccessRequestAck, ServiceError> {
        require("user_email", user_email)?;
        let tool = self.get_by_id(tool_id).await?;

        info!(tool_id, tool = %tool.name, %user_email, %recipient, "tool access requested");
        Ok(AccessRequestAck {
            success: true,
            message: format!("Access request for {} sent to {recipient}", tool.name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Data;
    use crate::services::test_helpers::fixture_service;

    #[tokio::test]
    async fn vote_switches_without_double_counting() {
        let tools = fixture_service::<Tool>();
        let liked = tools.vote(1, 2, ToolVoteKind::Like).await.unwrap();
        assert_eq!((liked.likes, liked.dislikes), (13, 1));

        let again = tools.vote(1, 2, ToolVoteKind::Like).await.unwrap();
        assert_eq!((again.likes, again.dislikes), (13, 1));

        let switched = tools.vote(1, 2, ToolVoteKind::Dislike).await.unwrap();
        assert_eq!((switched.likes, switched.dislikes), (12, 2));
        assert_eq!(tools.get_by_id(1).await.unwrap(), switched);
    }

    #[tokio::test]
    async fn vote_on_missing_tool_is_not_found() {
        let tools = fixture_service::<Tool>();
        let err = tools.vote(9, 2, ToolVoteKind::Like).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { collection: "tools", id: 9 }));
    }

    #[tokio::test]
    async fn counters_are_not_writable_through_update() {
        let tools = fixture_service::<Tool>();
        let patch = Data::from([("likes".to_owned(), serde_json::json!(500))]);
        assert!(matches!(tools.update(1, patch).await, Err(ServiceError::Validation(_))));
        assert_eq!(tools.get_by_id(1).await.unwrap().likes, 12);
    }

    #[tokio::test]
    async fn request_access_acknowledges_without_mutation() {
        let tools = fixture_service::<Tool>();
        let before = tools.get_all().await;
        let ack = tools
            .request_access(1, "jordan.lee@ppchub.io", "admin@ppchub.local")
            .await
            .unwrap();
        assert!(ack.success);
        assert!(ack.message.contains("Optmyzr"));
        assert!(ack.message.contains("admin@ppchub.local"));
        assert_eq!(tools.get_all().await, before);
    }

    #[tokio::test]
    async fn request_access_for_missing_tool_is_not_found() {
        let tools = fixture_service::<Tool>();
        let err = tools.request_access(9, "a@b.co", "admin@ppchub.local").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { collection: "tools", id: 9 }));
    }

    #[tokio::test]
    async fn request_access_requires_email() {
        let tools = fixture_service::<Tool>();
        assert!(matches!(tools.request_access(1, " ", "x").await, Err(ServiceError::Validation(_))));
    }
}

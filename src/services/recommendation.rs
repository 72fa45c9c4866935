//! Recommendation voting, discussion and review status.

use tracing::info;

use super::CollectionService;
use crate::error::ServiceError;
use crate::models::{Comment, Recommendation, RecommendationStatus, VoteKind};
use crate::record::{now, require};

impl CollectionService<Recommendation> {
    /// Record `user_id`'s vote, replacing any earlier vote by the same user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the recommendation is absent.
    pub async fn vote(
        &self,
        id: i64,
        user_id: i64,
        user_name: &str,
        kind: VoteKind,
    ) -> Result<Recommendation, ServiceError> {
        let user_name = user_name.to_owned();
        let recommendation = self
            .mutate(id, move |rec: &mut Recommendation| {
                rec.cast_vote(user_id, &user_name, kind);
                Ok(())
            })
            .await?;
        info!(
            id,
            user_id,
            ?kind,
            up = recommendation.upvote_count,
            down = recommendation.downvote_count,
            "recommendation vote recorded"
        );
        Ok(recommendation)
    }

    /// Append a comment by the given author.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for blank content and `NotFound` when the
    /// recommendation is absent.
    pub async fn comment(
        &self,
        id: i64,
        author_id: i64,
        author_name: &str,
        content: &str,
    ) -> Result<Recommendation, ServiceError> {
        require("content", content)?;
        let comment = Comment {
            author_id,
            author_name: author_name.to_owned(),
            content: content.trim().to_owned(),
            timestamp: now(),
        };
        self.mutate(id, move |rec: &mut Recommendation| {
            rec.comments.push(comment);
            Ok(())
        })
        .await
    }

    /// Move a recommendation to `status`. Any transition is allowed,
    /// including back to `open`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the recommendation is absent.
    pub async fn set_status(&self, id: i64, status: RecommendationStatus) -> Result<Recommendation, ServiceError> {
        let recommendation = self
            .mutate(id, move |rec: &mut Recommendation| {
                rec.status = status;
                Ok(())
            })
            .await?;
        info!(id, ?status, "recommendation status changed");
        Ok(recommendation)
    }
}

#[cfg(test)]
#[path = "recommendation_test.rs"]
mod tests;

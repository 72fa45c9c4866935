//! Process-improvement recommendations with up/down voting.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::embedded;
use crate::error::ServiceError;
use crate::record::{Record, require, sort_newest_first};

/// Review lifecycle. Any status may be set directly; transitions are not
/// restricted to the forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationStatus {
    Open,
    UnderReview,
    Implemented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: i64,
    #[serde(alias = "user_id")]
    pub author_id: i64,
    #[serde(default, alias = "user_name")]
    pub author_name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub status: RecommendationStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default, deserialize_with = "embedded::list")]
    pub votes: Vec<Vote>,
    #[serde(default, alias = "upvotes")]
    pub upvote_count: u32,
    #[serde(default, alias = "downvotes")]
    pub downvote_count: u32,
    #[serde(default, deserialize_with = "embedded::list")]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub user_id: i64,
    #[serde(default)]
    pub user_name: String,
    #[serde(rename = "type")]
    pub kind: VoteKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author_id: i64,
    #[serde(default)]
    pub author_name: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct NewRecommendation {
    #[serde(alias = "user_id")]
    pub author_id: i64,
    #[serde(default, alias = "user_name")]
    pub author_name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

impl Recommendation {
    /// Replace any prior vote by `user_id` with the new one and recount.
    pub fn cast_vote(&mut self, user_id: i64, user_name: &str, kind: VoteKind) {
        self.votes.retain(|vote| vote.user_id != user_id);
        self.votes.push(Vote { user_id, user_name: user_name.to_owned(), kind });
        self.recount();
    }

    fn recount(&mut self) {
        let tally = |kind: VoteKind| {
            let n = self.votes.iter().filter(|vote| vote.kind == kind).count();
            u32::try_from(n).unwrap_or(u32::MAX)
        };
        self.upvote_count = tally(VoteKind::Up);
        self.downvote_count = tally(VoteKind::Down);
    }
}

impl Record for Recommendation {
    type Draft = NewRecommendation;

    const COLLECTION: &'static str = "recommendations";
    const REMOTE_TABLE: &'static str = "recommendation_c";
    const READ_ONLY: &'static [&'static str] = &["id", "timestamp", "votes", "upvote_count", "downvote_count"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, now: OffsetDateTime, draft: NewRecommendation) -> Result<Self, ServiceError> {
        let recommendation = Self {
            id,
            author_id: draft.author_id,
            author_name: draft.author_name,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            status: RecommendationStatus::Open,
            timestamp: now,
            votes: Vec::new(),
            upvote_count: 0,
            downvote_count: 0,
            comments: Vec::new(),
        };
        recommendation.validate()?;
        Ok(recommendation)
    }

    fn validate(&self) -> Result<(), ServiceError> {
        require("title", &self.title)
    }

    fn sort(records: &mut [Self]) {
        sort_newest_first(records, |rec| rec.timestamp);
    }
}

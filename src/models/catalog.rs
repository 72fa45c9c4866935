//! Directory entries: tools, scripts and learning pages.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::embedded;
use crate::error::ServiceError;
use crate::record::{Record, require};

// =============================================================================
// TOOLS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "embedded::tags")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub dislikes: u32,
    #[serde(default, deserialize_with = "embedded::list")]
    pub votes: Vec<ToolVote>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolVoteKind {
    Like,
    Dislike,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolVote {
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: ToolVoteKind,
}

#[derive(Debug, Deserialize)]
pub struct NewTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "embedded::tags")]
    pub tags: Vec<String>,
}

impl Tool {
    /// Record `user_id`'s like or dislike. A repeat vote of another kind
    /// moves the user's count from one side to the other; a repeat of the
    /// same kind changes nothing.
    pub fn cast_vote(&mut self, user_id: i64, kind: ToolVoteKind) {
        if let Some(prior) = self.votes.iter().position(|vote| vote.user_id == user_id) {
            let prior = self.votes.remove(prior);
            let count = self.counter(prior.kind);
            *count = count.saturating_sub(1);
        }
        self.votes.push(ToolVote { user_id, kind });
        let count = self.counter(kind);
        *count = count.saturating_add(1);
    }

    fn counter(&mut self, kind: ToolVoteKind) -> &mut u32 {
        match kind {
            ToolVoteKind::Like => &mut self.likes,
            ToolVoteKind::Dislike => &mut self.dislikes,
        }
    }
}

impl Record for Tool {
    type Draft = NewTool;

    const COLLECTION: &'static str = "tools";
    const REMOTE_TABLE: &'static str = "tool_c";
    const READ_ONLY: &'static [&'static str] = &["id", "likes", "dislikes", "votes"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, _now: OffsetDateTime, draft: NewTool) -> Result<Self, ServiceError> {
        let tool = Self {
            id,
            name: draft.name,
            description: draft.description,
            category: draft.category,
            url: draft.url,
            icon: draft.icon,
            tags: draft.tags,
            likes: 0,
            dislikes: 0,
            votes: Vec::new(),
        };
        tool.validate()?;
        Ok(tool)
    }

    fn validate(&self) -> Result<(), ServiceError> {
        require("name", &self.name)
    }
}

// =============================================================================
// SCRIPTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub link: String,
    #[serde(default, deserialize_with = "embedded::tags")]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewScript {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, deserialize_with = "embedded::tags")]
    pub tags: Vec<String>,
}

impl Record for Script {
    type Draft = NewScript;

    const COLLECTION: &'static str = "scripts";
    const REMOTE_TABLE: &'static str = "script_c";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, _now: OffsetDateTime, draft: NewScript) -> Result<Self, ServiceError> {
        let script = Self {
            id,
            name: draft.name,
            description: draft.description,
            category: draft.category,
            link: draft.link,
            tags: draft.tags,
        };
        script.validate()?;
        Ok(script)
    }

    /// The admin form requires every descriptive field.
    fn validate(&self) -> Result<(), ServiceError> {
        require("name", &self.name)?;
        require("description", &self.description)?;
        require("category", &self.category)?;
        require("link", &self.link)
    }
}

// =============================================================================
// LEARNING PAGES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPage {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "embedded::list")]
    pub video_links: Vec<VideoLink>,
    #[serde(default, deserialize_with = "embedded::list")]
    pub resources: Vec<Resource>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoLink {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub upload_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct NewLearningPage {
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub video_links: Vec<VideoLink>,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Record for LearningPage {
    type Draft = NewLearningPage;

    const COLLECTION: &'static str = "learning";
    const REMOTE_TABLE: &'static str = "learning_page_c";
    const READ_ONLY: &'static [&'static str] = &["id", "last_updated"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, now: OffsetDateTime, draft: NewLearningPage) -> Result<Self, ServiceError> {
        let page = Self {
            id,
            title: draft.title,
            category: draft.category,
            content: draft.content,
            video_links: draft.video_links,
            resources: draft.resources,
            last_updated: now,
        };
        page.validate()?;
        Ok(page)
    }

    fn validate(&self) -> Result<(), ServiceError> {
        require("title", &self.title)?;
        for video in &self.video_links {
            require("video_links.url", &video.url)?;
        }
        Ok(())
    }

    fn touch(&mut self, now: OffsetDateTime) {
        self.last_updated = now;
    }
}

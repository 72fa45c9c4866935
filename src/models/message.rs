//! Team chat messages.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::embedded;
use crate::error::ServiceError;
use crate::record::{Record, require};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(alias = "user_id")]
    pub author_id: i64,
    #[serde(alias = "user_name")]
    pub author_name: String,
    #[serde(default, alias = "user_avatar")]
    pub author_avatar: Option<String>,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default, deserialize_with = "embedded::reactions")]
    pub reactions: Vec<Reaction>,
    #[serde(default, deserialize_with = "embedded::list")]
    pub attachments: Vec<Attachment>,
}

/// One emoji and the set of users who reacted with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reaction {
    pub emoji: String,
    pub count: usize,
    pub user_ids: BTreeSet<i64>,
    /// Voters known only by display name, from rows that predate user ids.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub user_names: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct NewMessage {
    #[serde(alias = "user_id")]
    pub author_id: i64,
    #[serde(alias = "user_name")]
    pub author_name: String,
    #[serde(default, alias = "user_avatar")]
    pub author_avatar: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Toggle `user_id` in the voter set for `emoji`.
    ///
    /// Returns `true` when the reaction was added, `false` when removed.
    /// Emoji entries whose voter set becomes empty are dropped.
    pub fn toggle_reaction(&mut self, emoji: &str, user_id: i64) -> bool {
        let Some(index) = self.reactions.iter().position(|r| r.emoji == emoji) else {
            self.reactions.push(Reaction {
                emoji: emoji.to_owned(),
                count: 1,
                user_ids: BTreeSet::from([user_id]),
                user_names: BTreeSet::new(),
            });
            return true;
        };

        let reaction = &mut self.reactions[index];
        let added = if reaction.user_ids.remove(&user_id) {
            false
        } else {
            reaction.user_ids.insert(user_id);
            true
        };
        reaction.count = reaction.user_ids.len() + reaction.user_names.len();

        if reaction.count == 0 {
            self.reactions.remove(index);
        }
        added
    }
}

impl Record for Message {
    type Draft = NewMessage;

    const COLLECTION: &'static str = "messages";
    const REMOTE_TABLE: &'static str = "message_c";
    const READ_ONLY: &'static [&'static str] = &["id", "timestamp", "reactions"];
    const REMOTE_RENAMES: &'static [(&'static str, &'static str)] =
        &[("author_id", "user_id"), ("author_name", "user_name"), ("author_avatar", "user_avatar")];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, now: OffsetDateTime, draft: NewMessage) -> Result<Self, ServiceError> {
        let message = Self {
            id,
            author_id: draft.author_id,
            author_name: draft.author_name,
            author_avatar: draft.author_avatar,
            content: draft.content,
            timestamp: now,
            reactions: Vec::new(),
            attachments: draft.attachments,
        };
        message.validate()?;
        Ok(message)
    }

    fn validate(&self) -> Result<(), ServiceError> {
        require("author_name", &self.author_name)?;
        if self.content.trim().is_empty() && self.attachments.is_empty() {
            return Err(ServiceError::validation("message needs `content` or at least one attachment"));
        }
        Ok(())
    }

    /// Chat reads oldest first.
    fn sort(records: &mut [Self]) {
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
    }
}

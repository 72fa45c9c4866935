//! Wins board entries and the awards teammates attach to them.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::embedded;
use crate::error::ServiceError;
use crate::record::{Record, require, sort_newest_first};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinCategory {
    Professional,
    Personal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Win {
    pub id: i64,
    #[serde(alias = "user_id")]
    pub author_id: i64,
    #[serde(default, alias = "user_name")]
    pub author_name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: WinCategory,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default, deserialize_with = "embedded::list")]
    pub awards: Vec<Award>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    #[serde(rename = "type")]
    pub kind: String,
    pub from_user: String,
    #[serde(default)]
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct NewWin {
    #[serde(alias = "user_id")]
    pub author_id: i64,
    #[serde(default, alias = "user_name")]
    pub author_name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: WinCategory,
}

#[derive(Debug, Deserialize)]
pub struct NewAward {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub from_user: String,
    #[serde(default)]
    pub message: String,
}

impl Record for Win {
    type Draft = NewWin;

    const COLLECTION: &'static str = "wins";
    const REMOTE_TABLE: &'static str = "win_c";
    const READ_ONLY: &'static [&'static str] = &["id", "timestamp", "awards"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, now: OffsetDateTime, draft: NewWin) -> Result<Self, ServiceError> {
        let win = Self {
            id,
            author_id: draft.author_id,
            author_name: draft.author_name,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            timestamp: now,
            awards: Vec::new(),
        };
        win.validate()?;
        Ok(win)
    }

    fn validate(&self) -> Result<(), ServiceError> {
        require("title", &self.title)
    }

    fn sort(records: &mut [Self]) {
        sort_newest_first(records, |win| win.timestamp);
    }
}

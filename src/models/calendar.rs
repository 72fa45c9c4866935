//! Team calendar events.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::embedded;
use crate::error::ServiceError;
use crate::record::{Record, require};

pub const DEFAULT_EVENT_TYPE: &str = "team-event";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    #[serde(with = "embedded::date")]
    pub date: Date,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default = "default_event_type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct NewCalendarEvent {
    pub title: String,
    #[serde(with = "embedded::date")]
    pub date: Date,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

fn default_event_type() -> String {
    DEFAULT_EVENT_TYPE.to_owned()
}

impl Record for CalendarEvent {
    type Draft = NewCalendarEvent;

    const COLLECTION: &'static str = "calendar";
    const REMOTE_TABLE: &'static str = "calendar_event_c";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, _now: OffsetDateTime, draft: NewCalendarEvent) -> Result<Self, ServiceError> {
        let kind = draft
            .kind
            .filter(|kind| !kind.trim().is_empty())
            .unwrap_or_else(default_event_type);
        let event = Self { id, title: draft.title, date: draft.date, time: draft.time, description: draft.description, kind };
        event.validate()?;
        Ok(event)
    }

    fn validate(&self) -> Result<(), ServiceError> {
        require("title", &self.title)
    }

    fn sort(records: &mut [Self]) {
        records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    }
}

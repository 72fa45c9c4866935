//! Entity records for every hub collection.
//!
//! Each entity pairs a stored record with a `New*` draft accepted by
//! `create`. JSON field names are the canonical snake_case schema; serde
//! aliases accept the `user_*` names the hosted backend uses for authors and
//! [`embedded`] decodes list fields stored as text.

pub mod calendar;
pub mod catalog;
pub mod embedded;
pub mod message;
pub mod recommendation;
pub mod user;
pub mod win;

pub use calendar::{CalendarEvent, NewCalendarEvent};
pub use catalog::{LearningPage, NewScript, NewTool, Script, Tool, ToolVoteKind, VideoLink};
pub use message::{Attachment, Message, NewMessage};
pub use recommendation::{Comment, NewRecommendation, Recommendation, RecommendationStatus, VoteKind};
pub use user::{NewUser, NewUserMetric, Role, User, UserMetric};
pub use win::{Award, NewAward, NewWin, Win, WinCategory};

#[cfg(test)]
#[path = "models_test.rs"]
mod tests;

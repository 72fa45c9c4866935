//! Team chat: recent feed and emoji reactions.

use tracing::info;

use super::CollectionService;
use crate::error::ServiceError;
use crate::models::Message;

impl CollectionService<Message> {
    /// Newest messages first, at most [`super::RECENT_LIMIT`].
    pub async fn recent(&self) -> Vec<Message> {
        self.recent_by(|message| message.timestamp).await
    }

    /// Toggle `user_id`'s `emoji` reaction on a message.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank emoji and `NotFound` when the message
    /// is absent.
    pub async fn react(&self, id: i64, emoji: &str, user_id: i64) -> Result<Message, ServiceError> {
        let emoji = emoji.trim().to_owned();
        if emoji.is_empty() {
            return Err(ServiceError::validation("`emoji` is required"));
        }

        let message = self
            .mutate(id, {
                let emoji = emoji.clone();
                move |message: &mut Message| {
                    message.toggle_reaction(&emoji, user_id);
                    Ok(())
                }
            })
            .await?;
        let added = message
            .reactions
            .iter()
            .any(|reaction| reaction.emoji == emoji && reaction.user_ids.contains(&user_id));
        info!(id, %emoji, user_id, added, "message reaction toggled");
        Ok(message)
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

//! Wins board: recent feed and awards.

use tracing::info;

use super::CollectionService;
use crate::error::ServiceError;
use crate::models::{Award, NewAward, Win};
use crate::record::{now, require};

impl CollectionService<Win> {
    /// Newest wins first, at most [`super::RECENT_LIMIT`].
    pub async fn recent(&self) -> Vec<Win> {
        self.recent_by(|win| win.timestamp).await
    }

    /// Append an award. The same member may award a win more than once.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank award type or giver, and `NotFound`
    /// when the win is absent.
    pub async fn award(&self, id: i64, award: NewAward) -> Result<Win, ServiceError> {
        require("type", &award.kind)?;
        require("from_user", &award.from_user)?;

        let kind = award.kind.clone();
        let win = self
            .mutate(id, move |win: &mut Win| {
                win.awards.push(Award {
                    kind: award.kind,
                    from_user: award.from_user,
                    message: award.message,
                    timestamp: now(),
                });
                Ok(())
            })
            .await?;
        info!(id, %kind, awards = win.awards.len(), "win awarded");
        Ok(win)
    }
}

#[cfg(test)]
#[path = "win_test.rs"]
mod tests;

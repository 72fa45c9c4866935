//! Team members: current user, activity and invitations.

use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;

use super::CollectionService;
use crate::error::ServiceError;
use crate::models::{Role, User};
use crate::record::now;

/// Acknowledgement for a sent invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvitationAck {
    pub success: bool,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub invited_at: OffsetDateTime,
}

impl CollectionService<User> {
    /// The member this deployment treats as signed in.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the configured id is absent.
    pub async fn current_user(&self, current_user_id: i64) -> Result<User, ServiceError> {
        self.get_by_id(current_user_id).await
    }

    /// Set `last_active` to now.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the user is absent.
    pub async fn touch_last_active(&self, id: i64) -> Result<User, ServiceError> {
        self.mutate(id, |user: &mut User| {
            user.last_active = now();
            Ok(())
        })
        .await
    }

    /// Invite `email` to join with `role`. Delivery is logged; nothing is
    /// stored until the invitee is created as a user.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when `email` is not an email address.
    pub async fn send_invitation(&self, email: &str, role: Role) -> Result<InvitationAck, ServiceError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ServiceError::validation(format!("`{email}` is not an email address")));
        }
        self.latency.wait().await;

        let invited_at = now();
        info!(%email, role = role.as_str(), "invitation sent");
        Ok(InvitationAck { success: true, message: format!("Invitation sent to {email} as {}", role.as_str()), invited_at })
    }
}

#[cfg(test)]
#[path = "user_test.rs"]
mod tests;

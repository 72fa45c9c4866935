//! Acting-user extractors.
//!
//! DESIGN
//! ======
//! There are no sessions: callers name themselves with `X-User-Id`, which is
//! resolved against the users collection on every request. Reads are open;
//! writes take an [`ActingUser`] so votes, reactions, awards and comments are
//! attributed to a real team member.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::error::ServiceError;
use crate::models::User;
use crate::routes::error::ApiError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

// =============================================================================
// ACTING USER
// =============================================================================

/// Team member named by the `X-User-Id` header.
/// Use as a handler parameter to require an identified caller.
#[derive(Debug)]
pub struct ActingUser {
    pub user: User,
}

impl ActingUser {
    /// Reject non-admins when `admin_only` is set.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` for a non-admin caller.
    pub fn authorize(&self, admin_only: bool) -> Result<(), ApiError> {
        if admin_only && !self.user.is_admin() {
            return Err(ApiError::Forbidden);
        }
        Ok(())
    }

    /// Allow the user acting on their own record, or any admin.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Forbidden` otherwise.
    pub fn authorize_self_or_admin(&self, user_id: i64) -> Result<(), ApiError> {
        self.authorize(self.user.id != user_id)
    }
}

impl<S> FromRequestParts<S> for ActingUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .ok_or(ApiError::Unauthorized)?;

        let app_state = AppState::from_ref(state);
        match app_state.users.get_by_id(id).await {
            Ok(user) => Ok(Self { user }),
            Err(ServiceError::NotFound { .. }) => Err(ApiError::Unauthorized),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// ADMIN USER
// =============================================================================

/// Acting user with the admin role.
#[derive(Debug)]
pub struct AdminUser {
    pub user: User,
}

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let acting = ActingUser::from_request_parts(parts, state).await?;
        acting.authorize(true)?;
        Ok(Self { user: acting.user })
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

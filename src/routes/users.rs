//! Team member, account metric and dashboard routes.

use axum::extract::{Path, State};
use axum::response::Json;
use serde::Deserialize;

use crate::models::{Role, User, UserMetric};
use crate::record::Data;
use crate::routes::auth::{ActingUser, AdminUser};
use crate::routes::error::ApiError;
use crate::services::dashboard::{self, DashboardSummary};
use crate::services::user::InvitationAck;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct InvitationBody {
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// `GET /api/users/me` — the configured current user.
pub async fn me(State(state): State<AppState>) -> Result<Json<User>, ApiError> {
    Ok(Json(state.users.current_user(state.current_user_id).await?))
}

/// `POST /api/users/{id}/last-active` — self or admin.
pub async fn touch_last_active(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    actor.authorize_self_or_admin(id)?;
    Ok(Json(state.users.touch_last_active(id).await?))
}

/// `POST /api/users/invitations` — admin only.
pub async fn send_invitation(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(body): Json<InvitationBody>,
) -> Result<Json<InvitationAck>, ApiError> {
    tracing::debug!(admin = admin.user.id, "invitation requested");
    Ok(Json(state.users.send_invitation(&body.email, body.role).await?))
}

/// `GET /api/metrics/users/{user_id}`
pub async fn metrics_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserMetric>, ApiError> {
    Ok(Json(state.metrics.get_by_user_id(user_id).await?))
}

/// `PATCH /api/metrics/users/{user_id}`
pub async fn update_metrics_for_user(
    State(state): State<AppState>,
    _actor: ActingUser,
    Path(user_id): Path<i64>,
    Json(patch): Json<Data>,
) -> Result<Json<UserMetric>, ApiError> {
    Ok(Json(state.metrics.update_for_user(user_id, patch).await?))
}

/// `GET /api/dashboard` — team totals plus the recent feeds.
pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardSummary> {
    Json(dashboard::summary(&state.metrics, &state.messages, &state.wins).await)
}

//! Tool directory, script library, learning pages and calendar routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use crate::models::{CalendarEvent, Script, Tool, ToolVoteKind, VideoLink};
use crate::routes::auth::{ActingUser, AdminUser};
use crate::routes::error::ApiError;
use crate::services::learning::NewVideo;
use crate::services::tool::AccessRequestAck;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ToolVoteBody {
    #[serde(alias = "type")]
    pub kind: ToolVoteKind,
}

#[derive(Deserialize, Default)]
pub struct AccessRequestBody {
    /// Defaults to the caller's email.
    #[serde(default)]
    pub user_email: Option<String>,
}

/// `POST /api/tools/{id}/votes` — like or dislike, replacing the caller's
/// earlier vote.
pub async fn vote_tool(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<i64>,
    Json(body): Json<ToolVoteBody>,
) -> Result<Json<Tool>, ApiError> {
    Ok(Json(state.tools.vote(id, actor.user.id, body.kind).await?))
}

/// `POST /api/tools/{id}/access-requests` — ask an admin for tool access.
pub async fn request_access(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<i64>,
    Json(body): Json<AccessRequestBody>,
) -> Result<Json<AccessRequestAck>, ApiError> {
    let email = body.user_email.unwrap_or(actor.user.email);
    let ack = state
        .tools
        .request_access(id, &email, &state.access_request_recipient)
        .await?;
    Ok(Json(ack))
}

/// `GET /api/scripts/categories/{category}`
pub async fn scripts_by_category(State(state): State<AppState>, Path(category): Path<String>) -> Json<Vec<Script>> {
    Json(state.scripts.by_category(&category).await)
}

/// `POST /api/learning/{id}/videos` — admin only.
pub async fn upload_video(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    Json(video): Json<NewVideo>,
) -> Result<(StatusCode, Json<VideoLink>), ApiError> {
    let link = state.learning.upload_video(id, video).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// `GET /api/calendar/months/{year}/{month}` — month is 1-based.
pub async fn calendar_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u8)>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
    Ok(Json(state.calendar.by_month(year, month).await?))
}

//! Recommendation voting, discussion and review status routes.

use axum::extract::{Path, State};
use axum::response::Json;
use serde::Deserialize;

use crate::models::{Recommendation, RecommendationStatus, VoteKind};
use crate::routes::auth::{ActingUser, AdminUser};
use crate::routes::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct VoteBody {
    #[serde(alias = "type")]
    pub kind: VoteKind,
}

#[derive(Deserialize)]
pub struct CommentBody {
    pub content: String,
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: RecommendationStatus,
}

/// `POST /api/recommendations/{id}/votes` — cast or switch the caller's vote.
pub async fn vote(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<i64>,
    Json(body): Json<VoteBody>,
) -> Result<Json<Recommendation>, ApiError> {
    let rec = state
        .recommendations
        .vote(id, actor.user.id, &actor.user.name, body.kind)
        .await?;
    Ok(Json(rec))
}

/// `POST /api/recommendations/{id}/comments`
pub async fn comment(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<i64>,
    Json(body): Json<CommentBody>,
) -> Result<Json<Recommendation>, ApiError> {
    let rec = state
        .recommendations
        .comment(id, actor.user.id, &actor.user.name, &body.content)
        .await?;
    Ok(Json(rec))
}

/// `PUT /api/recommendations/{id}/status` — admin only.
pub async fn set_status(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Recommendation>, ApiError> {
    tracing::debug!(id, admin = admin.user.id, "status change requested");
    Ok(Json(state.recommendations.set_status(id, body.status).await?))
}

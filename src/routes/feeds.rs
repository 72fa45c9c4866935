//! Team chat and wins board routes.

use axum::extract::{Path, State};
use axum::response::Json;
use serde::Deserialize;

use crate::models::{Message, NewAward, Win};
use crate::routes::auth::ActingUser;
use crate::routes::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ReactionBody {
    pub emoji: String,
}

#[derive(Deserialize)]
pub struct AwardBody {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: String,
}

/// `GET /api/messages/recent` — newest messages first.
pub async fn recent_messages(State(state): State<AppState>) -> Json<Vec<Message>> {
    Json(state.messages.recent().await)
}

/// `POST /api/messages/{id}/reactions` — toggle the caller's reaction.
pub async fn react(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<i64>,
    Json(body): Json<ReactionBody>,
) -> Result<Json<Message>, ApiError> {
    Ok(Json(state.messages.react(id, &body.emoji, actor.user.id).await?))
}

/// `GET /api/wins/recent` — newest wins first.
pub async fn recent_wins(State(state): State<AppState>) -> Json<Vec<Win>> {
    Json(state.wins.recent().await)
}

/// `POST /api/wins/{id}/awards` — attach an award from the caller.
pub async fn award(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<i64>,
    Json(body): Json<AwardBody>,
) -> Result<Json<Win>, ApiError> {
    let award = NewAward { kind: body.kind, from_user: actor.user.name, message: body.message };
    Ok(Json(state.wins.award(id, award).await?))
}

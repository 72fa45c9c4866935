//! CRUD routes shared by every collection.
//!
//! DESIGN
//! ======
//! Handlers are generic over [`Routed`], which ties a record type to its
//! service in [`AppState`] and says whether writes need the admin role.
//! `routes::app` mounts one copy per collection at `/api/{collection}`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;

use crate::models::*;
use crate::record::{Data, Record};
use crate::routes::auth::ActingUser;
use crate::routes::error::ApiError;
use crate::services::CollectionService;
use crate::state::AppState;

pub trait Routed: Record {
    /// Creates, updates and deletes require the admin role.
    const ADMIN_WRITES: bool = false;

    fn service(state: &AppState) -> &CollectionService<Self>;
}

macro_rules! routed {
    ($ty:ty, $field:ident) => {
        impl Routed for $ty {
            fn service(state: &AppState) -> &CollectionService<Self> {
                &state.$field
            }
        }
    };
    ($ty:ty, $field:ident, admin) => {
        impl Routed for $ty {
            const ADMIN_WRITES: bool = true;

            fn service(state: &AppState) -> &CollectionService<Self> {
                &state.$field
            }
        }
    };
}

routed!(Message, messages);
routed!(Win, wins);
routed!(Recommendation, recommendations);
routed!(Tool, tools, admin);
routed!(Script, scripts, admin);
routed!(LearningPage, learning, admin);
routed!(CalendarEvent, calendar);
routed!(User, users, admin);
routed!(UserMetric, metrics);

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/{collection}`
pub async fn list<T: Routed>(State(state): State<AppState>) -> Json<Vec<T>> {
    Json(T::service(&state).get_all().await)
}

/// `GET /api/{collection}/{id}`
pub async fn get_one<T: Routed>(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<T>, ApiError> {
    Ok(Json(T::service(&state).get_by_id(id).await?))
}

/// `POST /api/{collection}`
pub async fn create<T: Routed>(
    State(state): State<AppState>,
    actor: ActingUser,
    Json(draft): Json<T::Draft>,
) -> Result<(StatusCode, Json<T>), ApiError> {
    actor.authorize(T::ADMIN_WRITES)?;
    let record = T::service(&state).create(draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `PATCH /api/{collection}/{id}`
pub async fn update<T: Routed>(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<i64>,
    Json(patch): Json<Data>,
) -> Result<Json<T>, ApiError> {
    actor.authorize(T::ADMIN_WRITES)?;
    Ok(Json(T::service(&state).update(id, patch).await?))
}

/// `DELETE /api/{collection}/{id}`
pub async fn delete<T: Routed>(
    State(state): State<AppState>,
    actor: ActingUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    actor.authorize(T::ADMIN_WRITES)?;
    let deleted = T::service(&state).delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

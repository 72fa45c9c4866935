//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every collection is mounted at `/api/{collection}` with the shared CRUD
//! handlers from [`records`]. Entity-specific routes sit next to them; static
//! segments such as `/api/messages/recent` take precedence over `/{id}`.

pub mod auth;
pub mod catalog;
pub mod error;
pub mod feeds;
pub mod recommendations;
pub mod records;
pub mod users;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::models::*;
use crate::state::AppState;
use records::Routed;

/// Full HTTP API.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(collection::<Message>())
        .merge(collection::<Win>())
        .merge(collection::<Recommendation>())
        .merge(collection::<Tool>())
        .merge(collection::<Script>())
        .merge(collection::<LearningPage>())
        .merge(collection::<CalendarEvent>())
        .merge(collection::<User>())
        .merge(collection::<UserMetric>())
        .route("/api/messages/recent", get(feeds::recent_messages))
        .route("/api/messages/{id}/reactions", post(feeds::react))
        .route("/api/wins/recent", get(feeds::recent_wins))
        .route("/api/wins/{id}/awards", post(feeds::award))
        .route("/api/recommendations/{id}/votes", post(recommendations::vote))
        .route("/api/recommendations/{id}/comments", post(recommendations::comment))
        .route("/api/recommendations/{id}/status", put(recommendations::set_status))
        .route("/api/tools/{id}/votes", post(catalog::vote_tool))
        .route("/api/tools/{id}/access-requests", post(catalog::request_access))
        .route("/api/scripts/categories/{category}", get(catalog::scripts_by_category))
        .route("/api/learning/{id}/videos", post(catalog::upload_video))
        .route("/api/calendar/months/{year}/{month}", get(catalog::calendar_month))
        .route("/api/users/me", get(users::me))
        .route("/api/users/{id}/last-active", post(users::touch_last_active))
        .route("/api/users/invitations", post(users::send_invitation))
        .route(
            "/api/metrics/users/{user_id}",
            get(users::metrics_for_user).patch(users::update_metrics_for_user),
        )
        .route("/api/dashboard", get(users::dashboard))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CRUD routes for one collection.
fn collection<T: Routed>() -> Router<AppState> {
    let base = format!("/api/{}", T::COLLECTION);
    Router::new()
        .route(&base, get(records::list::<T>).post(records::create::<T>))
        .route(
            &format!("{base}/{{id}}"),
            get(records::get_one::<T>)
                .patch(records::update::<T>)
                .delete(records::delete::<T>),
        )
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;

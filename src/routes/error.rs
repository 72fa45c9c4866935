//! HTTP mapping of service failures.
//!
//! Every error leaves the API as `{"code": "E_…", "message": "…"}` with the
//! status chosen by [`service_error_to_status`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::error::{ErrorCode, ServiceError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("missing or unknown X-User-Id")]
    Unauthorized,
    #[error("admin role required")]
    Forbidden,
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Service(e) => e.error_code(),
            Self::Unauthorized => "E_UNAUTHORIZED",
            Self::Forbidden => "E_FORBIDDEN",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Service(e) if e.retryable())
    }
}

pub(crate) fn service_error_to_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound { .. } => StatusCode::NOT_FOUND,
        ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::External(_) => StatusCode::BAD_GATEWAY,
        ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(e) => service_error_to_status(e),
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), retryable = self.retryable(), "request failed");
        }
        let body = serde_json::json!({ "code": self.error_code(), "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

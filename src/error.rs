//! Service error taxonomy shared by every collection.
//!
//! DESIGN
//! ======
//! One enum covers all collections so generic routes can map failures to
//! HTTP statuses without knowing the entity. Each variant carries a stable,
//! grepable code via [`ErrorCode`].

/// Stable machine-readable code for an error, surfaced in API responses.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: i64 },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("external service error: {0}")]
    External(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    #[must_use]
    pub fn not_found(collection: &'static str, id: i64) -> Self {
        Self::NotFound { collection, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl ErrorCode for ServiceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::Validation(_) => "E_VALIDATION",
            Self::External(_) => "E_EXTERNAL_SERVICE",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::External(_) | Self::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_collection_and_id() {
        let err = ServiceError::not_found("wins", 42);
        assert_eq!(err.to_string(), "wins record not found: 42");
        assert_eq!(err.error_code(), "E_NOT_FOUND");
        assert!(!err.retryable());
    }

    #[test]
    fn external_errors_are_retryable() {
        let err = ServiceError::External("status 503".into());
        assert_eq!(err.error_code(), "E_EXTERNAL_SERVICE");
        assert!(err.retryable());
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// User-facing error kinds.
///
/// Each variant maps to exactly one HTTP status and one JSON envelope:
/// `{success:false, error:<kind>, message, current_count?, correlation_id?}`.
/// `AlreadyRegistered` is a normal outcome of a double tap and carries the
/// unchanged count so the client can still render the tally.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Unknown or invalid session")]
    BadSession,

    #[error("Session is closed")]
    SessionClosed,

    #[error("Already registered")]
    AlreadyRegistered { current_count: i64 },

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Temporary failure, retry shortly")]
    Retryable,

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::Malformed(_) => "Malformed",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::RateLimited => "RateLimited",
            ApiError::BadSession => "BadSession",
            ApiError::SessionClosed => "SessionClosed",
            ApiError::AlreadyRegistered { .. } => "AlreadyRegistered",
            ApiError::Invalid(_) => "Invalid",
            ApiError::Retryable => "Retryable",
            ApiError::Internal(_) => "Internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Malformed(_) | ApiError::Invalid(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadSession => StatusCode::NOT_FOUND,
            ApiError::SessionClosed => StatusCode::GONE,
            ApiError::AlreadyRegistered { .. } => StatusCode::CONFLICT,
            ApiError::Retryable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        let (message, current_count, correlation_id) = match &self {
            ApiError::AlreadyRegistered { current_count } => (
                "Runner is already registered for this session".to_string(),
                Some(*current_count),
                None,
            ),
            ApiError::Internal(detail) => {
                // The detail stays in the logs; the client gets a correlation
                // id to quote when reporting the failure.
                let correlation_id = uuid::Uuid::new_v4().to_string();
                tracing::error!(correlation_id = %correlation_id, "Internal error: {}", detail);
                ("An internal error occurred".to_string(), None, Some(correlation_id))
            }
            ApiError::RateLimited => (
                "Too many registration attempts. Please try again later.".to_string(),
                None,
                None,
            ),
            other => (other.to_string(), None, None),
        };

        let body = ErrorBody {
            success: false,
            error: kind,
            message,
            current_count,
            correlation_id,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if persistence::db::is_transient(&err) {
            ApiError::Retryable
        } else {
            ApiError::Internal(format!("Database error: {}", err))
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    format!(
                        "{}: {}",
                        field,
                        e.message.clone().unwrap_or_else(|| "invalid".into())
                    )
                })
            })
            .collect();
        ApiError::Invalid(messages.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Malformed("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::BadSession.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::SessionClosed.status(), StatusCode::GONE);
        assert_eq!(
            ApiError::AlreadyRegistered { current_count: 1 }.status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::Invalid("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Retryable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_kinds_use_spec_spelling() {
        assert_eq!(ApiError::BadSession.kind(), "BadSession");
        assert_eq!(ApiError::SessionClosed.kind(), "SessionClosed");
        assert_eq!(
            ApiError::AlreadyRegistered { current_count: 1 }.kind(),
            "AlreadyRegistered"
        );
    }

    #[test]
    fn test_transient_sqlx_errors_become_retryable() {
        let err: ApiError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, ApiError::Retryable));

        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}

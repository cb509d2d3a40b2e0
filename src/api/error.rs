use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{app::AppError, domain::UrlParseError};

/// Error sent back to the client as a plain text body. Internal details only go to the log.
#[derive(Debug)]
pub struct ApiError {
    status_code: StatusCode,
    reason: &'static str,
}

impl ApiError {
    pub fn public(status_code: StatusCode, reason: &'static str) -> Self {
        Self {
            status_code,
            reason,
        }
    }

    pub fn bad_request() -> Self {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            reason: "invalid request",
        }
    }

    pub fn not_found() -> Self {
        Self {
            status_code: StatusCode::NOT_FOUND,
            reason: "key not found",
        }
    }

    pub fn internal() -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            reason: "internal server error",
        }
    }
}

impl From<UrlParseError> for ApiError {
    fn from(error: UrlParseError) -> Self {
        match error {
            UrlParseError::Empty => Self::public(StatusCode::BAD_REQUEST, "url must not be empty"),
        }
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::NotFound => Self::not_found(),
            AppError::KeyAttemptsExhausted(attempts) => {
                tracing::error!(attempts, "could not allocate a key");
                Self::internal()
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                Self::public(StatusCode::INTERNAL_SERVER_ERROR, "database error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code, self.reason).into_response()
    }
}

use academia_code_api_types::ErrorResponse;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use identity_directory::DirectoryError;
use review_delegate::ReviewError;
use tracing::{debug, error, warn};

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    message: String,
    code: String,
    status: StatusCode,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: "invalid_request".to_string(),
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: "not_found".to_string(),
            status: StatusCode::NOT_FOUND,
        }
    }

    /// Scope violations are loud in development builds and quiet in release
    /// builds; the caller always gets the same generic body.
    pub fn forbidden(context: &str) -> Self {
        if cfg!(debug_assertions) {
            warn!(context, "rejected out-of-scope request");
        } else {
            debug!(context, "rejected out-of-scope request");
        }

        Self {
            message: "operation not allowed for this caller".to_string(),
            code: "forbidden".to_string(),
            status: StatusCode::FORBIDDEN,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: "unavailable".to_string(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        error!(error = ?err, "store operation failed");

        Self {
            message: "internal error".to_string(),
            code: "internal_error".to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            // The message is the localized string shown verbatim in the
            // admin screens.
            DirectoryError::EmailTaken { .. } => Self {
                message: err.to_string(),
                code: "email_taken".to_string(),
                status: StatusCode::CONFLICT,
            },
            DirectoryError::Http(_) | DirectoryError::InvalidResponse(_) => {
                error!(error = %err, "directory request failed");
                Self {
                    message: "directory operation failed".to_string(),
                    code: "directory_error".to_string(),
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                }
            }
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        warn!(error = %err, "review delegate request failed");

        Self {
            message: err.to_string(),
            code: "review_failed".to_string(),
            status: StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            code: self.code,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

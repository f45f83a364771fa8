// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

/// A single field-level validation violation, reported in the `details` array
/// of a 400 response.
#[derive(Debug, Clone, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages.
///
/// `NotFound` deliberately covers both "record absent" and "record owned by
/// someone else" - callers must not be able to tell the two apart.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation { details: Vec<FieldViolation> },

    // 401 Unauthorized
    Unauthorized { error: String, message: String },

    // 404 Not Found (or forbidden - conflated by design)
    NotFound { error: String, message: String },

    // 409 Conflict
    Conflict { error: String, message: String },

    // 500 Internal Server Error
    Internal { error: String },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to the JSON body shape the API exposes: a short `error` string,
    /// a human-readable `message`, and `details` for validation failures.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Validation { details } => json!({
                "error": "Validation failed",
                "details": details,
            }),
            ApiError::Unauthorized { error, message }
            | ApiError::NotFound { error, message }
            | ApiError::Conflict { error, message } => json!({
                "error": error,
                "message": message,
            }),
            ApiError::Internal { error } => json!({
                "error": error,
                "message": "Internal server error",
            }),
        }
    }

    pub fn validation(details: Vec<FieldViolation>) -> Self {
        ApiError::Validation { details }
    }

    pub fn unauthorized(error: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Unauthorized { error: error.into(), message: message.into() }
    }

    pub fn not_found(error: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::NotFound { error: error.into(), message: message.into() }
    }

    pub fn conflict(error: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::Conflict { error: error.into(), message: message.into() }
    }

    pub fn internal(error: impl Into<String>) -> Self {
        ApiError::Internal { error: error.into() }
    }
}

impl From<crate::services::ServiceError> for ApiError {
    fn from(err: crate::services::ServiceError) -> Self {
        use crate::services::ServiceError;

        match err {
            ServiceError::NotFound { error, message } => ApiError::not_found(error, message),
            ServiceError::Conflict { error, message } => ApiError::conflict(error, message),
            ServiceError::Unauthorized { error, message } => ApiError::unauthorized(error, message),
            ServiceError::Token(e) => {
                tracing::error!("token generation failed: {}", e);
                ApiError::internal("Authentication failed")
            }
            ServiceError::Database(e) => {
                // Never expose engine-level detail to clients
                tracing::error!("database error: {}", e);
                ApiError::internal("Request failed")
            }
        }
    }
}

impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        tracing::error!("database error: {}", err);
        ApiError::internal("Request failed")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation { details } => write!(f, "validation failed ({} fields)", details.len()),
            ApiError::Unauthorized { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Conflict { message, .. } => write!(f, "{}", message),
            ApiError::Internal { error } => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

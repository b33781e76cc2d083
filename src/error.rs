// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest {
        message: String,
        hint: Option<String>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound {
        message: String,
        hint: Option<String>,
    },

    // 413 Payload Too Large (request body over the upload limit)
    PayloadTooLarge(String),

    // 500 Internal Server Error
    InternalServerError {
        message: String,
        details: Option<String>,
    },

    // 503 Service Unavailable (IoT gateway or AI service down)
    ServiceUnavailable {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound { .. } => 404,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::InternalServerError { .. } => 500,
            ApiError::ServiceUnavailable { .. } => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest { message, .. } => message,
            ApiError::Unauthorized(message) => message,
            ApiError::NotFound { message, .. } => message,
            ApiError::PayloadTooLarge(message) => message,
            ApiError::InternalServerError { message, .. } => message,
            ApiError::ServiceUnavailable { message, .. } => message,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code(),
        });

        match self {
            ApiError::BadRequest { hint: Some(hint), .. }
            | ApiError::NotFound { hint: Some(hint), .. } => {
                body["hint"] = json!(hint);
            }
            ApiError::InternalServerError { details: Some(details), .. }
            | ApiError::ServiceUnavailable { details: Some(details), .. } => {
                body["details"] = json!(details);
            }
            _ => {}
        }

        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            hint: None,
        }
    }

    pub fn bad_request_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        ApiError::NotFound {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            details: None,
        }
    }

    pub fn internal_with_details(message: impl Into<String>, details: impl ToString) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            details: Some(details.to_string()),
        }
    }

    pub fn service_unavailable(message: impl Into<String>, details: impl ToString) -> Self {
        ApiError::ServiceUnavailable {
            message: message.into(),
            details: Some(details.to_string()),
        }
    }
}

impl From<crate::database::DatabaseError> for ApiError {
    fn from(err: crate::database::DatabaseError) -> Self {
        // Log the real error but never expose SQL details to clients
        tracing::error!("Database error: {}", err);
        ApiError::internal_server_error("Database error occurred")
    }
}

impl From<crate::iot::GatewayError> for ApiError {
    fn from(err: crate::iot::GatewayError) -> Self {
        use crate::iot::GatewayError;

        tracing::warn!("IoT gateway error: {}", err);
        let message = err.client_message();
        match &err {
            GatewayError::Request { source, .. } => ApiError::service_unavailable(message, source),
            GatewayError::Status { status, .. } => {
                ApiError::service_unavailable(message, format!("Device returned status {}", status))
            }
            GatewayError::Read { source, .. } => ApiError::internal_with_details(message, source),
            GatewayError::Decrypt { source, .. } => ApiError::internal_with_details(message, source),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Missing or malformed input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A money or voucher rule was violated; `details` echoes the
    /// authoritative state so the caller can reconcile its view
    #[error("{message}")]
    BalanceViolation {
        message: String,
        details: serde_json::Value,
    },

    /// Duplicate structure, assignment or external transaction
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Payment gateway errors
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing acting user identity
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        if status_code.is_server_error() {
            tracing::error!(status = status_code.as_u16(), error = %error_message, "Request failed");
        }

        let mut body = serde_json::json!({
            "message": error_message,
            "code": status_code.as_u16(),
        });
        if let AppError::BalanceViolation { details, .. } = self {
            body["details"] = details.clone();
        }

        HttpResponse::build(status_code).json(serde_json::json!({ "error": body }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BalanceViolation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn balance(msg: impl Into<String>, details: serde_json::Value) -> Self {
        AppError::BalanceViolation {
            message: msg.into(),
            details,
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn gateway(msg: impl Into<String>) -> Self {
        AppError::Gateway(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

/// True when a database error is a unique-key violation, optionally on a named key.
///
/// MySQL reports the key name in the message (`Duplicate entry '..' for key 'table.key'`).
pub fn is_unique_violation(err: &sqlx::Error, key: Option<&str>) -> bool {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => match key {
            Some(key) => db_err.message().contains(key),
            None => true,
        },
        _ => false,
    }
}

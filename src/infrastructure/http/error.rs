//! HTTP Error Handling
//!
//! 业务错误统一以 HTTP 200 + errno 返回，`code` 携带领域错误码（如 `Character.NotFound`）

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::{ApplicationError, ImageStorageError};

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, code: Option<String>, error: impl Into<String>) -> Self {
        Self {
            errno,
            code,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const UNAUTHORIZED: i32 = 401;
    pub const FORBIDDEN: i32 = 403;
    pub const NOT_FOUND: i32 = 404;
    pub const CONFLICT: i32 = 409;
    pub const PAYLOAD_TOO_LARGE: i32 = 413;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound { code: Option<String>, message: String },
    BadRequest { code: Option<String>, message: String },
    Unauthorized(String),
    Forbidden { code: Option<String>, message: String },
    Conflict(String),
    PayloadTooLarge(String),
    Internal(String),
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code: None,
            message: message.into(),
        }
    }

    pub fn errno(&self) -> i32 {
        match self {
            ApiError::NotFound { .. } => errno::NOT_FOUND,
            ApiError::BadRequest { .. } => errno::BAD_REQUEST,
            ApiError::Unauthorized(_) => errno::UNAUTHORIZED,
            ApiError::Forbidden { .. } => errno::FORBIDDEN,
            ApiError::Conflict(_) => errno::CONFLICT,
            ApiError::PayloadTooLarge(_) => errno::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
            ApiError::ServiceUnavailable(_) => errno::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { code, .. }
            | ApiError::BadRequest { code, .. }
            | ApiError::Forbidden { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    fn into_parts(self) -> (Option<String>, String) {
        match self {
            ApiError::NotFound { code, message }
            | ApiError::BadRequest { code, message }
            | ApiError::Forbidden { code, message } => (code, message),
            ApiError::Unauthorized(message)
            | ApiError::Conflict(message)
            | ApiError::PayloadTooLarge(message)
            | ApiError::Internal(message)
            | ApiError::ServiceUnavailable(message) => (None, message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errno = self.errno();
        let (code, message) = self.into_parts();
        let code_field = code.as_deref().unwrap_or("-");

        if errno >= errno::INTERNAL_ERROR {
            tracing::error!(errno, code = code_field, error = %message, "Internal server error");
        } else {
            tracing::warn!(errno, code = code_field, error = %message, "Request rejected");
        }

        (StatusCode::OK, Json(ErrorResponse::new(errno, code, message))).into_response()
    }
}

impl From<ImageStorageError> for ApiError {
    fn from(e: ImageStorageError) -> Self {
        let code = Some(e.code().to_string());
        let message = e.to_string();
        match e {
            ImageStorageError::NotFound(_) => ApiError::NotFound { code, message },
            ImageStorageError::InvalidContentType { .. } => ApiError::BadRequest { code, message },
            ImageStorageError::InvalidUploadToken(_) => ApiError::Forbidden { code, message },
            ImageStorageError::UploadUrlUnavailable(_) => ApiError::ServiceUnavailable(message),
            ImageStorageError::IoError(_) => ApiError::Internal(message),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::Domain(e) => {
                let code = Some(e.code().to_string());
                let message = e.message().to_string();
                if e.is_not_found() {
                    ApiError::NotFound { code, message }
                } else {
                    ApiError::BadRequest { code, message }
                }
            }
            ApplicationError::Storage(e) => e.into(),
            ApplicationError::Conflict(msg) => ApiError::Conflict(msg),
            ApplicationError::RepositoryError(msg) => ApiError::Internal(msg),
            ApplicationError::Cancelled => {
                ApiError::ServiceUnavailable("Server is shutting down".to_string())
            }
            ApplicationError::InternalError(msg) => ApiError::Internal(msg),
        }
    }
}

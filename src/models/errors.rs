//! Registry errors and their HTTP mapping
//!
//! Clients always get `{"error": "<message>"}` with a status picked from
//! [`ErrorCode`]. Server-side failures (storage, config, a crashed blocking
//! task) are logged with their source before the response goes out.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::error::Error as StdError;
use std::fmt;

use crate::models::types::ErrorBody;

type BoxedSource = Box<dyn StdError + Send + Sync>;

/// Failure of a registry, store or API operation
#[derive(Debug)]
pub struct AppError {
    pub code: ErrorCode,
    /// Sent to the client verbatim
    pub message: String,
    /// Underlying cause, logged but never sent
    pub source: Option<BoxedSource>,
}

/// Error category; decides the response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Bad count, bad digits/next, empty code, malformed body, exhausted numbering
    Validation,
    /// Missing or wrong `x-api-key`
    Unauthorized,
    /// No label with that id
    NotFound,
    /// Code already taken by another label
    Conflict,
    /// Request body over the size limit
    PayloadTooLarge,
    /// Reading or writing `db.json` failed
    Storage,
    /// Bad environment or CLI value
    Config,
    /// Anything else that is the server's fault
    Internal,
}

impl ErrorCode {
    /// Stable tag used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::Storage => "STORAGE_ERROR",
            Self::Config => "CONFIG_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage | Self::Config | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, msg)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            ErrorCode::Unauthorized,
            "Unauthorized: missing or invalid x-api-key",
        )
    }

    pub fn label_not_found(id: u64) -> Self {
        Self::new(ErrorCode::NotFound, format!("Label {} not found", id))
    }

    pub fn duplicate_code(code: &str) -> Self {
        Self::new(ErrorCode::Conflict, format!("Duplicate code: {}", code))
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Config, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {} ({})", self.code.as_str(), self.message, source),
            None => write!(f, "{}: {}", self.code.as_str(), self.message),
        }
    }
}

impl StdError for AppError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn StdError + 'static))
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Storage, "label document I/O failed", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::Storage, "label document encoding failed", err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code.http_status();
        if status.is_server_error() {
            tracing::error!(code = self.code.as_str(), error = ?self.source, "{}", self.message);
        }
        (status, Json(ErrorBody { error: self.message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_and_message() {
        let err = AppError::duplicate_code("A-001");
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(err.to_string(), "CONFLICT: Duplicate code: A-001");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::Validation.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Unauthorized.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Conflict.http_status(), StatusCode::CONFLICT);
        assert_eq!(ErrorCode::PayloadTooLarge.http_status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ErrorCode::Storage.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorCode::Internal.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io.into();
        assert_eq!(err.code, ErrorCode::Storage);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("denied"));
    }
}

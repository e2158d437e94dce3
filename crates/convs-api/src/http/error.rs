//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use convs_types::error::{BotError, ModuleError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Bot-related errors.
    Bot(BotError),
    /// Module-related errors.
    Module(ModuleError),
    /// Authentication failure.
    Unauthorized(String),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<BotError> for AppError {
    fn from(e: BotError) -> Self {
        AppError::Bot(e)
    }
}

impl From<ModuleError> for AppError {
    fn from(e: ModuleError) -> Self {
        AppError::Module(e)
    }
}

impl AppError {
    /// HTTP status, machine-readable code and message for this error.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Bot(BotError::NotFound) => {
                (StatusCode::NOT_FOUND, "BOT_NOT_FOUND", "Bot not found".to_string())
            }
            AppError::Bot(BotError::SlugConflict(slug)) => {
                (StatusCode::CONFLICT, "SLUG_CONFLICT", format!("Slug '{slug}' already exists"))
            }
            AppError::Bot(BotError::InvalidName(msg) | BotError::InvalidStatus(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Bot(e @ BotError::HasModules(_)) => {
                (StatusCode::CONFLICT, "BOT_HAS_MODULES", e.to_string())
            }
            AppError::Bot(e) => (StatusCode::INTERNAL_SERVER_ERROR, "BOT_ERROR", e.to_string()),
            AppError::Module(ModuleError::NotFound) => {
                (StatusCode::NOT_FOUND, "MODULE_NOT_FOUND", "Module not found".to_string())
            }
            AppError::Module(e @ (ModuleError::InvalidName(_) | ModuleError::MissingParent)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Module(e @ ModuleError::Integrity { .. }) => {
                (StatusCode::CONFLICT, "INTEGRITY_ERROR", e.to_string())
            }
            AppError::Module(e @ ModuleError::SaveFailed(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SAVE_FAILED", e.to_string())
            }
            AppError::Module(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MODULE_ERROR", e.to_string())
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        }

        ApiResponse::failure(status, code, message).into_response()
    }
}

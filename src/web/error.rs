use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Per-field validation messages, keyed by wire field name.
#[derive(Debug, Default, Serialize)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    /// Validates a required, non-blank string field, recording the failure
    /// and returning a placeholder when it is missing or blank.
    pub fn require_string(&mut self, value: Option<String>, field: &str) -> String {
        match value {
            Some(v) if !v.is_empty() => v,
            Some(_) => {
                self.push(field, "This field may not be blank.");
                String::new()
            }
            None => {
                self.push(field, "This field is required.");
                String::new()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(FieldErrors),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("User already exists: {0}")]
    UserAlreadyExists(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Password hashing failed: {0}")]
    PasswordHashingError(String),
    #[error("JWT creation failed: {0}")]
    TokenCreationError(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Invalid input.", "fields": fields }),
            ),
            // Bad credentials on the token endpoint are a request failure,
            // not an authentication challenge.
            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "Unable to authenticate with provided credentials." }),
            ),
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "error": msg }),
            ),
            AppError::UserAlreadyExists(msg) => (
                StatusCode::CONFLICT,
                serde_json::json!({ "error": msg }),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, serde_json::json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, serde_json::json!({ "error": msg })),
            AppError::PasswordHashingError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": format!("Password hashing error: {msg}") }),
            ),
            AppError::TokenCreationError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": format!("Token creation error: {msg}") }),
            ),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": format!("Database error: {msg}") }),
            ),
            AppError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": msg }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
            return AppError::Conflict("A row with these values already exists.".to_string());
        }
        AppError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalServerError(format!("JSON serialization/deserialization error: {err}"))
    }
}

//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned for every rejected write.
pub const VALIDATION_ERRORS: &str = "validation errors";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("validation: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("internal: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Serialize)]
pub struct ValidationBody {
    pub errors: Vec<String>,
}

impl AppError {
    pub fn restaurant_not_found() -> Self {
        AppError::NotFound("Restaurant not found".into())
    }

    pub fn pizza_not_found() -> Self {
        AppError::NotFound("Pizza not found".into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        AppError::Validation(vec![reason.into()])
    }

    /// Collapse any failure into the generic write envelope. The cause is logged, never returned.
    pub fn into_validation(self) -> Self {
        match &self {
            AppError::Validation(reasons) if reasons.len() == 1 && reasons[0] == VALIDATION_ERRORS => {}
            other => tracing::warn!(error = %other, "write rejected"),
        }
        AppError::Validation(vec![VALIDATION_ERRORS.to_string()])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Db(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for database errors raised by a schema constraint (foreign key, check, not null).
    pub fn is_constraint_violation(&self) -> bool {
        use sqlx::error::ErrorKind;
        match self {
            AppError::Db(sqlx::Error::Database(db)) => matches!(
                db.kind(),
                ErrorKind::ForeignKeyViolation | ErrorKind::CheckViolation | ErrorKind::NotNullViolation
            ),
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AppError::Validation(errors) => (status, Json(ValidationBody { errors })).into_response(),
            AppError::NotFound(message) => (status, Json(ErrorBody { error: message })).into_response(),
            other => {
                tracing::error!(error = %other, "request failed");
                (status, Json(ErrorBody { error: other.to_string() })).into_response()
            }
        }
    }
}

//! Error handling module
//!
//! Two layers: `RepositoryError` for the data access layer and `AppError`
//! for the HTTP surface, with `ResponseError` mapping each outcome to a
//! distinct status code. Unauthorized (no/bad credential) and Forbidden
//! (valid credential, wrong role) are separate variants on purpose.

use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Not authorized, {0}")]
    Unauthorized(&'static str),

    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Single-field validation shortcut.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<FieldError>>,
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::ProductNotFound(_) => HttpResponse::NotFound().json(ErrorBody {
                error: self.to_string(),
                code: "PRODUCT_NOT_FOUND",
                fields: None,
            }),
            AppError::UserNotFound(_) => HttpResponse::NotFound().json(ErrorBody {
                error: self.to_string(),
                code: "USER_NOT_FOUND",
                fields: None,
            }),
            AppError::Validation(fields) => HttpResponse::BadRequest().json(ErrorBody {
                error: self.to_string(),
                code: "VALIDATION_ERROR",
                fields: Some(fields.clone()),
            }),
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(ErrorBody {
                error: self.to_string(),
                code: "UNAUTHORIZED",
                fields: None,
            }),
            AppError::Forbidden(_) => HttpResponse::Forbidden().json(ErrorBody {
                error: self.to_string(),
                code: "FORBIDDEN",
                fields: None,
            }),
            AppError::Database(e) => {
                tracing::error!(error = %e, "store unavailable");
                HttpResponse::InternalServerError().json(ErrorBody {
                    error: "Internal server error".to_string(),
                    code: "STORE_UNAVAILABLE",
                    fields: None,
                })
            }
            AppError::Internal => HttpResponse::InternalServerError().json(ErrorBody {
                error: self.to_string(),
                code: "INTERNAL_ERROR",
                fields: None,
            }),
        }
    }
}

/// Repository-level errors.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Stored value out of domain: {column} = {value}")]
    Decode {
        column: &'static str,
        value: String,
    },

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // Callers map NotFound to the specific resource before it
            // reaches here; an unmapped one is a logic error.
            RepositoryError::NotFound => AppError::Internal,
            RepositoryError::DuplicateKey(field) => {
                let message = format!("{field} already registered");
                AppError::Validation(vec![FieldError::new(field, message)])
            }
            RepositoryError::Decode { column, value } => {
                tracing::error!(column, value, "corrupt row");
                AppError::Internal
            }
            RepositoryError::Hash(e) => {
                tracing::error!(error = %e, "hashing failure");
                AppError::Internal
            }
            RepositoryError::Query(e) => AppError::Database(e),
        }
    }
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for repository errors.
pub type RepoResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn status_codes_are_distinct_per_outcome() {
        let cases = [
            (
                AppError::ProductNotFound("x".into()),
                StatusCode::NOT_FOUND,
            ),
            (AppError::invalid("price", "must be >= 0"), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("no token"), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("Admins only"), StatusCode::FORBIDDEN),
            (AppError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.error_response().status(), status);
        }
    }

    #[test]
    fn duplicate_key_maps_to_field_level_validation() {
        let app: AppError = RepositoryError::DuplicateKey("email".into()).into();
        match app {
            AppError::Validation(fields) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].field, "email");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}

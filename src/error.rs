//! Error type shared by every HTTP handler.
//!
//! Handlers return `Result<HttpResponse, AppError>` and let `?` do the rest;
//! the `ResponseError` impl decides the status code and JSON body.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use sqlx::error::ErrorKind;
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "{}", _0)]
    BadRequest(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "{}", _0)]
    Database(sqlx::Error),

    #[display(fmt = "{}", _0)]
    Internal(String),
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        let classified = match &e {
            sqlx::Error::Database(db_err) => constraint_error(db_err.kind(), db_err.message()),
            _ => None,
        };
        classified.unwrap_or(AppError::Database(e))
    }
}

/// Constraint failures are the caller's fault; everything else stays a 500.
///
/// MySQL reports all of these as SQLSTATE 23000, so the split relies on the
/// error number behind `kind()`.
fn constraint_error(kind: ErrorKind, message: &str) -> Option<AppError> {
    match kind {
        ErrorKind::UniqueViolation | ErrorKind::ForeignKeyViolation => {
            Some(AppError::Conflict(message.to_string()))
        }
        ErrorKind::NotNullViolation | ErrorKind::CheckViolation => {
            Some(AppError::BadRequest(message.to_string()))
        }
        _ => None,
    }
}

/// Unique index violation (MySQL 1062).
pub fn is_duplicate_key(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Foreign key violation: the referenced row is missing (1452) or a
/// referencing row blocks the change (1451).
pub fn is_missing_reference(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            // error_id ties the response to the log line
            let error_id = Uuid::new_v4().to_string();
            error!(error = %self, error_id = %error_id, "Request failed");
            return HttpResponse::build(status).json(json!({
                "message": self.to_string(),
                "error_id": error_id
            }));
        }

        HttpResponse::build(status).json(json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_their_status() {
        assert_eq!(
            AppError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::conflict("x").status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_database_error_is_500_with_underlying_message() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), sqlx::Error::RowNotFound.to_string());
    }

    #[test]
    fn test_display_is_the_message() {
        let err = AppError::not_found("Employee not found");
        assert_eq!(err.to_string(), "Employee not found");
    }

    #[test]
    fn test_row_not_found_is_not_a_constraint_failure() {
        assert!(!is_duplicate_key(&sqlx::Error::RowNotFound));
        assert!(!is_missing_reference(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn test_not_null_violation_is_a_bad_request() {
        let err = constraint_error(
            ErrorKind::NotNullViolation,
            "Column 'first_name' cannot be null",
        )
        .unwrap();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Column 'first_name' cannot be null");
    }

    #[test]
    fn test_unique_and_foreign_key_violations_conflict() {
        for kind in [ErrorKind::UniqueViolation, ErrorKind::ForeignKeyViolation] {
            let err = constraint_error(kind, "constraint failed").unwrap();
            assert_eq!(err.status_code(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn test_other_database_errors_stay_internal() {
        assert!(constraint_error(ErrorKind::Other, "Lock wait timeout exceeded").is_none());
    }
}

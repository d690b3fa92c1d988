//! Error types for the resource server

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quire_common::{ErrorBody, ValidationError};
use std::path::PathBuf;
use thiserror::Error;

/// Persistence layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("failed to open database at {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("database lock poisoned")]
    LockPoisoned,

    #[error("database task failed: {0}")]
    Task(String),
}

impl DbError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Error returned by a request handler, rendered as `{ "error": ... }`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Generic message only; the cause is logged
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Map a persistence error, using `action` as the message for failures
    /// the client cannot act on
    pub fn from_db(action: &'static str) -> impl Fn(DbError) -> ApiError {
        move |e| match e {
            DbError::Validation(v) => ApiError::BadRequest(v.to_string()),
            DbError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            other => {
                tracing::error!(error = %other, "{action}");
                ApiError::Internal(action.to_string())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_errors_map_to_status() {
        let map = ApiError::from_db("Failed to update section");

        let not_found = map(DbError::not_found("section", "s1"));
        assert_eq!(not_found, ApiError::NotFound("section s1 not found".to_string()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = map(DbError::Validation(ValidationError::MissingField("title")));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let internal = map(DbError::LockPoisoned);
        assert_eq!(
            internal,
            ApiError::Internal("Failed to update section".to_string())
        );
    }
}

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to API callers as `{"error": message}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

pub const MISSING_FIELDS: &str = "Required fields are missing";
pub const EMAIL_TAKEN: &str = "This email is already registered";
pub const INVALID_USER_ID: &str = "Invalid user id";
pub const INCORRECT_EMAIL: &str = "Incorrect email";
pub const INCORRECT_PASSWORD: &str = "Incorrect password";

impl AppError {
    pub fn missing_fields() -> Self {
        Self::Validation(MISSING_FIELDS.into())
    }

    pub fn email_taken() -> Self {
        Self::Conflict(EMAIL_TAKEN.into())
    }

    pub fn invalid_user_id() -> Self {
        Self::NotFound(INVALID_USER_ID.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(e) => {
                error!(error = ?e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error: &message })).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::email_taken(),
            _ => Self::Internal(anyhow::Error::new(e).context("database error")),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        Self::Validation(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::missing_fields().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::email_taken().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Auth(INCORRECT_EMAIL.into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::invalid_user_id().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn internal_errors_are_masked() {
        let res = AppError::Internal(anyhow::anyhow!("password=hunter2")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn error_body_carries_message() {
        let res = AppError::email_taken().into_response();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": EMAIL_TAKEN }));
    }

    #[derive(Debug, Error)]
    #[error("duplicate key value violates unique constraint \"users_email_key\"")]
    struct UniqueEmail;

    impl sqlx::error::DatabaseError for UniqueEmail {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint \"users_email_key\""
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn unique_violation_is_conflict() {
        let err = AppError::from(sqlx::Error::Database(Box::new(UniqueEmail)));
        match err {
            AppError::Conflict(msg) => assert_eq!(msg, EMAIL_TAKEN),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn row_not_found_is_internal() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Internal(_)));
    }
}

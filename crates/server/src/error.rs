use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::auth::membership::MembershipError;
use crate::database::utils::is_unique_violation;
use crate::search::SearchError;
use crate::server::envelope::ErrorEnvelope;

const INTERNAL_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("the email, password or api key submitted is incorrect")]
    BadCredentials,
    #[error("requested object doesn't exist")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("search index error: {0}")]
    Search(#[from] SearchError),
    #[error("membership service error: {0}")]
    Membership(#[from] MembershipError),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(&'static str),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("request body is missing or empty")]
    MissingBody,
    #[error("request body is malformed: {reason}")]
    MalformedBody { reason: String },
    #[error("missing required field(s): {}", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },
    #[error("input value is invalid: `{value}`, reason: {reason}")]
    InvalidInput { value: String, reason: String },
    #[error("the value for `{param}` is invalid: `{value}`")]
    Unprocessable { param: &'static str, value: String },
    #[error("requested object already exists")]
    AlreadyExists,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingBody => "missing-body",
            Self::MalformedBody { .. } => "malformed-body",
            Self::MissingFields { .. } => "missing-params",
            Self::InvalidInput { .. } => "invalid-params",
            Self::Unprocessable { .. } => "unprocessable-entity",
            Self::AlreadyExists => "already-exists",
        }
    }
}

impl RequestError {
    /// Resolves the HTTP status, machine-readable code and client-facing message.
    /// Internal failures are logged here and never leak their details.
    fn classify(self) -> (StatusCode, &'static str, String) {
        match self {
            e @ Self::BadCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid-credentials",
                e.to_string(),
            ),
            e @ Self::NotFound => (StatusCode::NOT_FOUND, "not-found", e.to_string()),
            Self::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.code(), e.to_string()),
            Self::Sqlx(sqlx::Error::RowNotFound) => (
                StatusCode::NOT_FOUND,
                "not-found",
                Self::NotFound.to_string(),
            ),
            Self::Sqlx(e) if is_unique_violation(&e) => {
                let e = ValidationError::AlreadyExists;
                (StatusCode::UNPROCESSABLE_ENTITY, e.code(), e.to_string())
            }
            e => {
                error!("received internal error for user request: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal-server-error",
                    INTERNAL_MESSAGE.to_string(),
                )
            }
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.classify();
        ErrorEnvelope::new(status, code, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_unprocessable() {
        let (status, code, _) = RequestError::from(ValidationError::MissingFields {
            fields: vec!["name", "url"],
        })
        .classify();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "missing-params");
    }

    #[test]
    fn missing_fields_are_listed_in_message() {
        let e = ValidationError::MissingFields {
            fields: vec!["name", "paid"],
        };
        assert_eq!(e.to_string(), "missing required field(s): name, paid");
    }

    #[test]
    fn row_not_found_is_not_found() {
        let (status, code, _) = RequestError::Sqlx(sqlx::Error::RowNotFound).classify();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "not-found");
    }

    #[test]
    fn unexpected_errors_do_not_leak() {
        let (status, code, message) = RequestError::Sqlx(sqlx::Error::PoolTimedOut).classify();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "internal-server-error");
        assert_eq!(message, INTERNAL_MESSAGE);
    }

    #[test]
    fn bad_credentials_are_unauthorized() {
        let (status, code, _) = RequestError::BadCredentials.classify();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, "invalid-credentials");
    }

    #[test]
    fn internal_errors_are_server_errors() {
        let (status, code, message) =
            RequestError::Internal("api key vanished after conflict").classify();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "internal-server-error");
        assert_eq!(message, INTERNAL_MESSAGE);
    }
}

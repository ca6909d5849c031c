use crate::error::{RequestError, ValidationError};

pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(e) if e.is_unique_violation())
}

/// Integrity violations are client errors, everything else stays a database error.
pub fn map_integrity_violation(error: sqlx::Error) -> RequestError {
    if is_unique_violation(&error) {
        ValidationError::AlreadyExists.into()
    } else {
        error.into()
    }
}

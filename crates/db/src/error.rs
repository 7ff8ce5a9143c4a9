//! Error type for database operations.

use sqlx::error::ErrorKind;

/// Error type for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },
    #[error("Foreign key violation: {0}")]
    ForeignKey(String),
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Database error: {0}")]
    Sqlx(#[source] sqlx::Error),
}

/// Result type for repository operations.
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        DbError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: i64) -> Self {
        DbError::NotFound { entity, id }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::Database(db_err) => Some((db_err.kind(), db_err.message().to_string())),
            _ => None,
        };

        match kind {
            Some((ErrorKind::ForeignKeyViolation, msg)) => DbError::ForeignKey(msg),
            Some((ErrorKind::NotNullViolation, msg))
            | Some((ErrorKind::CheckViolation, msg))
            | Some((ErrorKind::UniqueViolation, msg)) => DbError::Constraint(msg),
            _ => DbError::Sqlx(err),
        }
    }
}

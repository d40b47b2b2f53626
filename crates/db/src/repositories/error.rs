//! Error type shared by every repository.

use sea_orm::{DbErr, SqlErr};
use tally_core::{listing::ListingError, records::RecordError, relation::RelationError};
use tally_shared::AppError;

/// Error types for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A record (or a record it references) does not exist in the tenant.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness rule would be violated.
    #[error("{0}")]
    Conflict(String),

    /// The input breaks a domain rule.
    #[error("{0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        // A lost race against a concurrent insert still lands on the unique index.
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::Conflict("Record already exists".to_string())
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::Conflict("Record is referenced by other records".to_string())
            }
            _ => Self::Database(err),
        }
    }
}

impl From<RecordError> for RepositoryError {
    fn from(err: RecordError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ListingError> for RepositoryError {
    fn from(err: ListingError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RelationError> for RepositoryError {
    fn from(err: RelationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(entity) => Self::NotFound(format!("{entity} not found")),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::Validation(msg) => Self::Validation(msg),
            RepositoryError::Database(e) => {
                tracing::error!(error = %e, "database operation failed");
                Self::Database(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_to_app_error() {
        let err = AppError::from(RepositoryError::NotFound("Customer"));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.public_message(), "Customer not found");

        let err = AppError::from(RepositoryError::Conflict("Customer 'Acme' already exists".into()));
        assert_eq!(err.status_code(), 409);

        let err = AppError::from(RepositoryError::from(DbErr::Custom("boom".into())));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.public_message(), "An unexpected error occurred");
    }

    #[test]
    fn test_record_rule_is_validation() {
        let err = RepositoryError::from(RecordError::TerminationBeforeHire);
        assert!(matches!(err, RepositoryError::Validation(_)));
    }
}

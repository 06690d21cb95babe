//! Domain errors for the tally reporting system.

use thiserror::Error;

use super::models::GroupField;

/// Domain-level errors raised by stores and catalog entries.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Field '{0}' cannot be grouped natively by this store")]
    UnsupportedGrouping(GroupField),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl DomainError {
    /// Short category used when the full message must not leave the process.
    pub fn category(&self) -> &'static str {
        match self {
            Self::DatabaseError(_) => "database error",
            Self::SerializationError(_) => "serialization error",
            Self::UnsupportedGrouping(_) => "unsupported grouping",
            Self::ValidationFailed(_) => "invalid data",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_hide_details() {
        let err = DomainError::DatabaseError("no such table: test_results (/srv/tally.db)".into());
        assert_eq!(err.category(), "database error");
        assert_eq!(DomainError::SerializationError("x".into()).category(), "serialization error");
        assert_eq!(DomainError::UnsupportedGrouping(GroupField::Day).category(), "unsupported grouping");
        assert_eq!(DomainError::ValidationFailed("x".into()).category(), "invalid data");
    }

    #[test]
    fn test_sqlx_errors_are_database_errors() {
        let err: DomainError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DomainError::DatabaseError(_)));
    }
}

//! Repository errors shared by every storage backend.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    /// The stored record moved on since it was loaded.
    #[error("record was modified concurrently (loaded version {loaded}, stored version {stored})")]
    Stale { loaded: u64, stored: u64 },

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for RepositoryError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData(error.to_string()),
            _ => Self::Sql(error),
        }
    }
}

/// Convert a stored `BIGINT` into an unsigned amount.
pub(crate) fn u64_from_db(column: &str, value: i64) -> Result<u64, sqlx::Error> {
    u64::try_from(value).map_err(|e| invalid_column(column, e))
}

/// Convert an unsigned amount into a `BIGINT` column value.
pub(crate) fn u64_to_db(column: &str, value: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| invalid_column(column, e))
}

pub(crate) fn invalid_column(
    column: &str,
    error: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: error.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert!(matches!(
            RepositoryError::from(Error::RowNotFound),
            RepositoryError::NotFound
        ));
    }

    #[test]
    fn other_errors_are_wrapped() {
        assert!(matches!(
            RepositoryError::from(Error::PoolTimedOut),
            RepositoryError::Sql(Error::PoolTimedOut)
        ));
    }

    #[test]
    fn amounts_outside_i64_are_rejected() {
        assert!(u64_to_db("cost", u64::MAX).is_err());
        assert!(u64_from_db("cost", -1).is_err());
        assert_eq!(u64_from_db("cost", 12_99).ok(), Some(12_99));
    }
}

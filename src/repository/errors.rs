use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::image_store::ImageStoreError;

/// Result type returned by repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Failures raised by the repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No row exists for the requested key.
    #[error("record not found")]
    NotFound,
    /// A uniqueness rule would be violated.
    #[error("{0}")]
    Conflict(String),
    /// Client-supplied structured data could not be parsed.
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    #[error(transparent)]
    Media(#[from] ImageStoreError),
    /// Query, flush or commit failure reported by the database.
    #[error("{0}")]
    Persistence(DieselError),
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),
}

impl From<DieselError> for RepositoryError {
    fn from(value: DieselError) -> Self {
        match value {
            DieselError::NotFound => RepositoryError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                RepositoryError::Conflict(info.message().to_string())
            }
            other => RepositoryError::Persistence(other),
        }
    }
}

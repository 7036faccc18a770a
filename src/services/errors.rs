use actix_web::error::BlockingError;
use thiserror::Error;

use crate::image_store::ImageStoreError;
use crate::repository::RepositoryError;

/// Result type returned by the service layer.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures surfaced to the HTTP layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    /// A uniqueness rule was violated.
    #[error("{0}")]
    Conflict(String),
    /// Submitted data failed validation.
    #[error("{0}")]
    Form(String),
    #[error("{0}")]
    InvalidMediaType(String),
    /// The database rejected a query or the commit.
    #[error("details: {0}")]
    Persistence(String),
    #[error("Internal server error")]
    Internal,
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::NotFound("Not found".to_string()),
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            RepositoryError::InvalidFormat(message) => ServiceError::Form(message),
            RepositoryError::Media(err) => err.into(),
            RepositoryError::Persistence(err) => ServiceError::Persistence(err.to_string()),
            RepositoryError::Pool(err) => {
                log::error!("Failed to acquire database connection: {err}");
                ServiceError::Internal
            }
        }
    }
}

impl From<ImageStoreError> for ServiceError {
    fn from(value: ImageStoreError) -> Self {
        match value {
            ImageStoreError::InvalidMediaType { .. } => {
                ServiceError::InvalidMediaType("Invalid image type".to_string())
            }
            other => {
                log::error!("Failed to store image: {other}");
                ServiceError::Internal
            }
        }
    }
}

impl From<BlockingError> for ServiceError {
    fn from(value: BlockingError) -> Self {
        log::error!("Blocking task failed: {value}");
        ServiceError::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_keeps_repository_message() {
        let err = ServiceError::from(RepositoryError::Conflict(
            "Category with provided name already exists!".to_string(),
        ));

        assert_eq!(err.to_string(), "Category with provided name already exists!");
    }

    #[test]
    fn persistence_is_prefixed_with_details() {
        let err = ServiceError::from(RepositoryError::Persistence(
            diesel::result::Error::RollbackTransaction,
        ));

        assert!(matches!(err, ServiceError::Persistence(_)));
        assert!(err.to_string().starts_with("details: "));
    }

    #[test]
    fn invalid_media_type_is_reported_as_such() {
        let err = ServiceError::from(RepositoryError::Media(ImageStoreError::InvalidMediaType {
            content_type: "text/plain".to_string(),
        }));

        assert!(matches!(err, ServiceError::InvalidMediaType(message) if message == "Invalid image type"));
    }

    #[test]
    fn io_failures_are_internal() {
        let err = ServiceError::from(ImageStoreError::Io(std::io::Error::other("disk full")));

        assert!(matches!(err, ServiceError::Internal));
    }
}

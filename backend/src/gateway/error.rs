//! Error type shared by both gateway capabilities

use catalog_storage::vehicle::VehicleStorageError;
use thiserror::Error;

use crate::image_storage::BucketError;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors surfaced by the document collection or the blob container
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The named document or blob does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The document collection failed
    #[error("Document collection error: {0}")]
    Collection(VehicleStorageError),

    /// The blob container failed
    #[error("Blob container error: {0}")]
    Blob(BucketError),

    /// The backend could not be reached
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl From<VehicleStorageError> for GatewayError {
    fn from(err: VehicleStorageError) -> Self {
        match err {
            VehicleStorageError::VehicleNotFound(id) => Self::NotFound(id),
            other => Self::Collection(other),
        }
    }
}

impl From<BucketError> for GatewayError {
    fn from(err: BucketError) -> Self {
        match err {
            BucketError::NotFound(name) => Self::NotFound(name),
            other => Self::Blob(other),
        }
    }
}

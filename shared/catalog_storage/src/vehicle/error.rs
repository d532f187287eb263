//! Error types for vehicle storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{
    delete_item::DeleteItemError, put_item::PutItemError, scan::ScanError,
    update_item::UpdateItemError,
};
use thiserror::Error;

/// Result type alias for vehicle storage operations
pub type VehicleStorageResult<T> = Result<T, VehicleStorageError>;

/// Storage error types for vehicle operations
#[derive(Debug, Error)]
pub enum VehicleStorageError {
    /// Failed to insert vehicle into `DynamoDB`
    #[error("Failed to insert vehicle into DynamoDB: {0:?}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to update vehicle in `DynamoDB`
    #[error("Failed to update vehicle in DynamoDB: {0:?}")]
    DynamoDbUpdateError(#[from] SdkError<UpdateItemError>),

    /// Failed to scan vehicles from `DynamoDB`
    #[error("Failed to scan vehicles from DynamoDB: {0:?}")]
    DynamoDbScanError(#[from] SdkError<ScanError>),

    /// Failed to delete vehicle from `DynamoDB`
    #[error("Failed to delete vehicle from DynamoDB: {0:?}")]
    DynamoDbDeleteError(#[from] SdkError<DeleteItemError>),

    /// Vehicle with this ID does not exist
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(String),

    /// Vehicle with this ID already exists
    #[error("Vehicle already exists: {0}")]
    VehicleExists(String),

    /// Failed to convert a vehicle to or from a `DynamoDB` item
    #[error("Failed to parse vehicle: {0}")]
    SerializationError(String),
}

impl From<serde_dynamo::Error> for VehicleStorageError {
    fn from(err: serde_dynamo::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

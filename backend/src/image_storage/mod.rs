//! S3-based vehicle image storage

mod error;

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::{
    error::SdkError, operation::head_object::HeadObjectError, presigning::PresigningConfig,
    primitives::ByteStream, Client as S3Client,
};
use chrono::{DateTime, Utc};
use tracing::{debug, error};

pub use error::{BucketError, BucketResult};

use crate::catalog::PendingImage;
use crate::gateway::{BlobContainer, GatewayResult};

/// Presigned URL with expiration information
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    /// The presigned URL for GET operations
    pub url: String,
    /// UTC timestamp when the URL expires
    pub expires_at: DateTime<Utc>,
}

/// Image storage client for S3 operations
pub struct ImageStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    image_url_expiry_secs: u64,
}

impl ImageStorage {
    /// Creates a new image storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for vehicle images
    /// * `image_url_expiry_secs` - Lifetime of the presigned URLs handed out for images
    #[must_use]
    pub const fn new(
        s3_client: Arc<S3Client>,
        bucket_name: String,
        image_url_expiry_secs: u64,
    ) -> Self {
        Self {
            s3_client,
            bucket_name,
            image_url_expiry_secs,
        }
    }

    /// Checks if an object exists in the bucket
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if object exists
    /// * `Ok(false)` if object does not exist
    /// * `Err(BucketError)` if S3 operation fails
    ///
    /// # Errors
    ///
    /// Returns `BucketError::S3Error` for S3 service errors
    /// Returns `BucketError::UpstreamError` for 5xx errors
    pub async fn check_object_exists(&self, key: &str) -> BucketResult<bool> {
        let result = self
            .s3_client
            .head_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
            {
                Ok(false)
            }
            Err(SdkError::ServiceError(service_err))
                if service_err.raw().status().as_u16() >= 500 =>
            {
                Err(BucketError::UpstreamError(format!("{service_err:?}")))
            }
            Err(e) => Err(BucketError::from(e)),
        }
    }

    /// Uploads an image under `key`, replacing any existing object
    ///
    /// # Errors
    ///
    /// Returns `BucketError::S3Error` if the put operation fails
    pub async fn put_image(&self, key: &str, image: &PendingImage) -> BucketResult<()> {
        debug!(
            key,
            size_bytes = image.bytes.len(),
            content_type = %image.content_type,
            "Uploading image"
        );

        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(&image.content_type)
            .body(ByteStream::from(image.bytes.clone()))
            .send()
            .await?;

        Ok(())
    }

    /// Generates a presigned URL for GET operations
    ///
    /// The object is not checked for existence.
    ///
    /// # Errors
    ///
    /// Returns `BucketError::ConfigError` if presigning config creation fails
    /// Returns `BucketError::S3Error` if presigned URL generation fails
    pub async fn generate_presigned_get_url(&self, key: &str) -> BucketResult<PresignedUrl> {
        let presigned_config =
            PresigningConfig::expires_in(Duration::from_secs(self.image_url_expiry_secs))
                .map_err(|e| {
                    BucketError::ConfigError(format!("Failed to create presigning config: {e}"))
                })?;

        let presigned_url = self
            .s3_client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .presigned(presigned_config)
            .await
            .map_err(|e| BucketError::S3Error(format!("Failed to generate presigned URL: {e}")))?;

        let expires_at: DateTime<Utc> =
            Utc::now() + Duration::from_secs(self.image_url_expiry_secs);

        Ok(PresignedUrl {
            url: presigned_url.uri().to_string(),
            expires_at,
        })
    }

    /// Resolves a fetchable URL for an existing image
    ///
    /// # Errors
    ///
    /// Returns `BucketError::NotFound` if no object is stored under `key`, or
    /// another `BucketError` if the S3 calls fail
    pub async fn resolve_image_url(&self, key: &str) -> BucketResult<PresignedUrl> {
        if !self.check_object_exists(key).await? {
            return Err(BucketError::NotFound(key.to_string()));
        }

        self.generate_presigned_get_url(key).await
    }

    /// Deletes the image stored under `key`
    ///
    /// S3 reports success for keys that do not exist.
    ///
    /// # Errors
    ///
    /// Returns `BucketError::S3Error` if the delete operation fails
    pub async fn delete_image(&self, key: &str) -> BucketResult<()> {
        self.s3_client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to delete image {key}: {e}");
                BucketError::from(e)
            })?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl BlobContainer for ImageStorage {
    async fn upload(&self, name: &str, image: &PendingImage) -> GatewayResult<()> {
        Ok(self.put_image(name, image).await?)
    }

    async fn resolve_url(&self, name: &str) -> GatewayResult<String> {
        let presigned = self.resolve_image_url(name).await?;
        debug!(%name, expires_at = %presigned.expires_at, "Resolved image URL");
        Ok(presigned.url)
    }

    async fn delete(&self, name: &str) -> GatewayResult<()> {
        Ok(self.delete_image(name).await?)
    }
}

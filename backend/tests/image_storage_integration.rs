use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::Client as S3Client;
use backend::{
    catalog::PendingImage,
    gateway::{BlobContainer, GatewayError},
    image_storage::{BucketError, ImageStorage},
};
use uuid::Uuid;

/// Test configuration for LocalStack
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const TEST_REGION: &str = "us-east-1";

/// Test context that removes the bucket and its objects on drop
struct TestContext {
    storage: ImageStorage,
    s3_client: Arc<S3Client>,
    bucket_name: String,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let client = self.s3_client.clone();
        let bucket = self.bucket_name.clone();

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Ok(listing) = client.list_objects_v2().bucket(&bucket).send().await {
                    for object in listing.contents() {
                        if let Some(key) = object.key() {
                            let _ = client.delete_object().bucket(&bucket).key(key).send().await;
                        }
                    }
                }
                let _ = client.delete_bucket().bucket(&bucket).send().await;
            });
        }
    }
}

async fn setup_test() -> TestContext {
    let bucket_name = format!("test-vehicle-images-{}", Uuid::new_v4());

    let credentials = Credentials::from_keys("test", "test", None);
    let config = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .region(Region::new(TEST_REGION))
        .credentials_provider(credentials)
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&config)
        .force_path_style(true)
        .build();
    let s3_client = Arc::new(S3Client::from_conf(s3_config));

    s3_client
        .create_bucket()
        .bucket(&bucket_name)
        .send()
        .await
        .expect("Failed to create test bucket");

    TestContext {
        storage: ImageStorage::new(s3_client.clone(), bucket_name.clone(), 60),
        s3_client,
        bucket_name,
    }
}

fn jpeg() -> PendingImage {
    PendingImage::new("civic.jpg".to_string(), None, vec![0xFF, 0xD8, 0xFF, 0xE0])
}

#[tokio::test]
async fn test_upload_and_resolve_url() {
    let context = setup_test().await;

    context
        .storage
        .put_image("vehicle-1.jpg", &jpeg())
        .await
        .expect("Failed to upload image");

    let presigned = context
        .storage
        .resolve_image_url("vehicle-1.jpg")
        .await
        .expect("Failed to resolve image URL");

    assert!(presigned.url.contains("localhost:4566"));
    assert!(presigned.url.contains("vehicle-1.jpg"));
    assert!(presigned.expires_at > chrono::Utc::now());

    let object = context
        .s3_client
        .head_object()
        .bucket(&context.bucket_name)
        .key("vehicle-1.jpg")
        .send()
        .await
        .expect("Uploaded object should exist");
    assert_eq!(object.content_type(), Some("image/jpeg"));
    assert_eq!(object.content_length(), Some(4));
}

#[tokio::test]
async fn test_resolve_missing_image() {
    let context = setup_test().await;

    let result = context.storage.resolve_image_url("missing.jpg").await;

    assert!(matches!(result, Err(BucketError::NotFound(key)) if key == "missing.jpg"));
    assert!(!context
        .storage
        .check_object_exists("missing.jpg")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_blob_container_round_trip() {
    let context = setup_test().await;
    let blobs: &dyn BlobContainer = &context.storage;

    blobs.upload("vehicle-2.jpg", &jpeg()).await.unwrap();
    assert!(blobs.resolve_url("vehicle-2.jpg").await.is_ok());

    blobs.delete("vehicle-2.jpg").await.unwrap();

    let result = blobs.resolve_url("vehicle-2.jpg").await;
    assert!(matches!(result, Err(GatewayError::NotFound(name)) if name == "vehicle-2.jpg"));
}

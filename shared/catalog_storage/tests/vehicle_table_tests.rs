use std::sync::Arc;
use std::time::Duration;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use catalog_storage::vehicle::{
    image_blob_name, ImageLink, VehicleAttribute, VehicleFields, VehicleStorage,
    VehicleStorageError,
};
use pretty_assertions::assert_eq;
use tokio::time::sleep;
use uuid::Uuid;

/// Test configuration for LocalStack
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const TEST_REGION: &str = "us-east-1";

/// Test context that automatically cleans up the table on drop
struct TestContext {
    storage: VehicleStorage,
    table_name: String,
    dynamodb_client: Arc<DynamoDbClient>,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let client = self.dynamodb_client.clone();
        let table = self.table_name.clone();

        let handle = tokio::runtime::Handle::try_current();
        if let Ok(handle) = handle {
            handle.spawn(async move {
                let _ = client.delete_table().table_name(&table).send().await;
            });
        }
    }
}

/// Creates a test setup with a unique table
async fn setup_test() -> TestContext {
    let table_name = format!("test-vehicles-{}", Uuid::new_v4());

    let credentials = Credentials::from_keys("test", "test", None);
    let config = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .region(Region::new(TEST_REGION))
        .credentials_provider(credentials)
        .load()
        .await;

    let dynamodb_client = Arc::new(DynamoDbClient::new(&config));

    dynamodb_client
        .create_table()
        .table_name(&table_name)
        .billing_mode(BillingMode::PayPerRequest)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(VehicleAttribute::Id.to_string())
                .key_type(KeyType::Hash)
                .build()
                .expect("Failed to build key schema"),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(VehicleAttribute::Id.to_string())
                .attribute_type(ScalarAttributeType::S)
                .build()
                .expect("Failed to build attribute definition"),
        )
        .send()
        .await
        .expect("Failed to create test table");

    // Wait for table to be ready
    sleep(Duration::from_millis(100)).await;

    let storage = VehicleStorage::new(dynamodb_client.clone(), table_name.clone());

    TestContext {
        storage,
        table_name,
        dynamodb_client,
    }
}

fn fields(name: &str) -> VehicleFields {
    VehicleFields {
        name: name.to_string(),
        color: "red".to_string(),
        year: "2020".to_string(),
        fuel: "gas".to_string(),
        price: "10000".to_string(),
        description: "clean".to_string(),
    }
}

#[tokio::test]
async fn test_list_is_ordered_by_name() {
    let context = setup_test().await;

    for name in ["Civic", "Accord", "Yaris"] {
        context.storage.insert(fields(name)).await.unwrap();
    }

    let names: Vec<String> = context
        .storage
        .list_ordered_by_name()
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.name)
        .collect();

    assert_eq!(names, vec!["Accord", "Civic", "Yaris"]);
}

#[tokio::test]
async fn test_list_empty_table() {
    let context = setup_test().await;

    let vehicles = context.storage.list_ordered_by_name().await.unwrap();

    assert!(vehicles.is_empty());
}

#[tokio::test]
async fn test_insert_assigns_unique_ids() {
    let context = setup_test().await;

    let first = context.storage.insert(fields("Civic")).await.unwrap();
    let second = context.storage.insert(fields("Civic")).await.unwrap();

    assert_ne!(first, second);
    assert!(Uuid::parse_str(&first).is_ok());
}

#[tokio::test]
async fn test_update_with_image_link() {
    let context = setup_test().await;

    let id = context.storage.insert(fields("Civic")).await.unwrap();
    let link = ImageLink {
        url: format!("http://localhost:4566/images/{id}.jpg"),
        blob_name: image_blob_name(&id),
    };

    context
        .storage
        .update(&id, &fields("Civic"), Some(&link))
        .await
        .unwrap();

    let vehicles = context.storage.list_ordered_by_name().await.unwrap();
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0].image_url.as_deref(), Some(link.url.as_str()));
    assert_eq!(vehicles[0].image.as_deref(), Some(link.blob_name.as_str()));
}

#[tokio::test]
async fn test_update_keeps_image_link_when_not_given() {
    let context = setup_test().await;

    let id = context.storage.insert(fields("Civic")).await.unwrap();
    let link = ImageLink {
        url: "http://localhost:4566/images/x.jpg".to_string(),
        blob_name: image_blob_name(&id),
    };
    context
        .storage
        .update(&id, &fields("Civic"), Some(&link))
        .await
        .unwrap();

    let mut edited = fields("Civic Type R");
    edited.color = "white".to_string();
    context.storage.update(&id, &edited, None).await.unwrap();

    let vehicle = context
        .storage
        .list_ordered_by_name()
        .await
        .unwrap()
        .remove(0);
    assert_eq!(vehicle.fields(), edited);
    assert_eq!(vehicle.image.as_deref(), Some(link.blob_name.as_str()));
}

#[tokio::test]
async fn test_update_missing_vehicle() {
    let context = setup_test().await;

    let result = context
        .storage
        .update("does-not-exist", &fields("Civic"), None)
        .await;

    assert!(matches!(
        result,
        Err(VehicleStorageError::VehicleNotFound(ref id)) if id == "does-not-exist"
    ));
}

#[tokio::test]
async fn test_delete() {
    let context = setup_test().await;

    let keep = context.storage.insert(fields("Accord")).await.unwrap();
    let remove = context.storage.insert(fields("Civic")).await.unwrap();

    context.storage.delete(&remove).await.unwrap();

    let ids: Vec<String> = context
        .storage
        .list_ordered_by_name()
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.id)
        .collect();
    assert_eq!(ids, vec![keep]);

    // Deleting again is not an error
    context.storage.delete(&remove).await.unwrap();
}

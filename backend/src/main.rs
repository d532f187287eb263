use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;

use backend::{
    catalog::CatalogController, image_storage::ImageStorage, server, types::Environment,
};
use catalog_storage::vehicle::VehicleStorage;
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    // JSON logs for staging/production, human-readable for development
    match environment {
        Environment::Production | Environment::Staging => {
            fmt().json().with_env_filter(env_filter).init();
        }
        Environment::Development { .. } => {
            fmt().with_env_filter(env_filter).init();
        }
    }

    let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
    let vehicle_storage = Arc::new(VehicleStorage::new(
        dynamodb_client,
        environment.vehicles_table_name(),
    ));

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let image_storage = Arc::new(ImageStorage::new(
        s3_client,
        environment.s3_bucket(),
        environment.image_url_expiry_secs(),
    ));

    let controller = Arc::new(CatalogController::new(
        vehicle_storage,
        image_storage,
        environment.controller_config(),
    ));

    // Initial listing; a failure is logged and the catalog starts empty
    if let Err(e) = controller.refresh().await {
        tracing::error!("Initial catalog refresh failed: {e}");
    }

    server::start(environment, controller).await
}

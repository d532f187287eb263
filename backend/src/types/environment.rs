//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use tracing::Level;

use crate::catalog::{ControllerConfig, FailurePolicy, DEFAULT_IMAGE_LOOKUP_CONCURRENCY};

/// Default lifetime of image URLs handed out in listings (1 hour)
const DEFAULT_IMAGE_URL_EXPIRY_SECS: u64 = 60 * 60;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Optional override for image URL expiry in seconds
        image_url_expiry_override: Option<u64>,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => {
                let image_url_expiry_override = env::var("IMAGE_URL_EXPIRY_SECS")
                    .ok()
                    .and_then(|val| val.parse::<u64>().ok());

                Self::Development {
                    image_url_expiry_override,
                }
            }
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the S3 bucket name for vehicle images
    ///
    /// # Panics
    ///
    /// Panics if the `S3_BUCKET_NAME` environment variable is not set in production or staging
    #[must_use]
    pub fn s3_bucket(&self) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var("S3_BUCKET_NAME").expect("S3_BUCKET_NAME environment variable is not set")
            }
            Self::Development { .. } => env::var("S3_BUCKET_NAME")
                .unwrap_or_else(|_| "vehicle-catalog-images".to_string()),
        }
    }

    /// Returns the `DynamoDB` table name for vehicle documents
    ///
    /// # Panics
    ///
    /// Panics if the `DYNAMODB_VEHICLES_TABLE_NAME` environment variable is not set in
    /// production or staging
    #[must_use]
    pub fn vehicles_table_name(&self) -> String {
        match self {
            Self::Production | Self::Staging => env::var("DYNAMODB_VEHICLES_TABLE_NAME")
                .expect("DYNAMODB_VEHICLES_TABLE_NAME environment variable is not set"),
            Self::Development { .. } => env::var("DYNAMODB_VEHICLES_TABLE_NAME")
                .unwrap_or_else(|_| "vehicles".to_string()),
        }
    }

    /// How backend failures are surfaced, from `BACKEND_FAILURE_POLICY`
    ///
    /// # Panics
    ///
    /// Panics if `BACKEND_FAILURE_POLICY` is set to anything but `log` or `propagate`
    #[must_use]
    pub fn failure_policy(&self) -> FailurePolicy {
        env::var("BACKEND_FAILURE_POLICY").map_or(FailurePolicy::Log, |val| {
            FailurePolicy::from_name(&val)
                .unwrap_or_else(|| panic!("Invalid backend failure policy: {val}"))
        })
    }

    /// Whether a failed create removes what it already wrote
    #[must_use]
    pub fn compensate_orphans(&self) -> bool {
        env::var("COMPENSATE_ORPHANED_DOCUMENTS")
            .ok()
            .and_then(|val| val.trim().parse::<bool>().ok())
            .unwrap_or(false)
    }

    /// Number of image lookups run concurrently during a refresh
    #[must_use]
    pub fn image_lookup_concurrency(&self) -> usize {
        env::var("IMAGE_LOOKUP_CONCURRENCY")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_IMAGE_LOOKUP_CONCURRENCY)
    }

    /// Catalog controller configuration
    #[must_use]
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            failure_policy: self.failure_policy(),
            compensate_orphans: self.compensate_orphans(),
            image_lookup_concurrency: self.image_lookup_concurrency(),
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development { .. } | Self::Staging)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            Self::Production | Self::Staging => None,
            // LocalStack
            Self::Development { .. } => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // LocalStack needs path-style bucket addressing
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development { .. }) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Lifetime of image URLs in seconds
    #[must_use]
    pub fn image_url_expiry_secs(&self) -> u64 {
        match self {
            Self::Production | Self::Staging => DEFAULT_IMAGE_URL_EXPIRY_SECS,
            Self::Development {
                image_url_expiry_override,
            } => image_url_expiry_override.unwrap_or(DEFAULT_IMAGE_URL_EXPIRY_SECS),
        }
    }

    /// Port the HTTP server listens on, from `PORT` (default 8001)
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number
    pub fn port(&self) -> Result<u16, std::num::ParseIntError> {
        env::var("PORT").map_or(Ok(8001), |p| p.parse())
    }

    /// Log level used when `RUST_LOG` is not set
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development { .. } => Level::DEBUG,
            })
    }
}

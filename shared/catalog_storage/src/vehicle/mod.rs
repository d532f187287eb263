//! Vehicle listing storage module for `DynamoDB` operations

mod error;

use std::sync::Arc;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;
pub use error::{VehicleStorageError, VehicleStorageResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_dynamo::{from_items, to_item};
use strum::Display;
use tracing::debug;

/// File extension shared by every vehicle image blob
pub const IMAGE_EXTENSION: &str = "jpg";

/// Returns the blob name of the image owned by the vehicle `id`
///
/// Images are not referenced by the document store; they are found by this
/// naming convention alone.
#[must_use]
pub fn image_blob_name(id: &str) -> String {
    format!("{id}.{IMAGE_EXTENSION}")
}

/// The six free-text fields of a vehicle listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VehicleFields {
    /// Display name, also the listing sort key
    pub name: String,
    /// Paint color
    pub color: String,
    /// Model year, kept as entered
    pub year: String,
    /// Fuel type
    pub fuel: String,
    /// Asking price, kept as entered
    pub price: String,
    /// Free-form description
    pub description: String,
}

impl VehicleFields {
    fn attributes(&self) -> [(VehicleAttribute, &str); 6] {
        [
            (VehicleAttribute::Name, self.name.as_str()),
            (VehicleAttribute::Color, self.color.as_str()),
            (VehicleAttribute::Year, self.year.as_str()),
            (VehicleAttribute::Fuel, self.fuel.as_str()),
            (VehicleAttribute::Price, self.price.as_str()),
            (VehicleAttribute::Description, self.description.as_str()),
        ]
    }
}

/// Location of the image linked to a vehicle document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImageLink {
    /// URL the image was resolved to right after upload
    pub url: String,
    /// Blob name, always `image_blob_name(id)`
    pub blob_name: String,
}

/// `DynamoDB` item for a vehicle listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Primary key - unique vehicle ID (UUID v4)
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Paint color
    #[serde(default)]
    pub color: String,
    /// Model year
    #[serde(default)]
    pub year: String,
    /// Fuel type
    #[serde(default)]
    pub fuel: String,
    /// Asking price
    #[serde(default)]
    pub price: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// URL stored when the image upload completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Blob name stored when the image upload completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Vehicle {
    /// Builds a new document without any image link
    #[must_use]
    pub fn new(id: String, fields: VehicleFields) -> Self {
        Self {
            id,
            name: fields.name,
            color: fields.color,
            year: fields.year,
            fuel: fields.fuel,
            price: fields.price,
            description: fields.description,
            image_url: None,
            image: None,
        }
    }

    /// Copies out the six text fields
    #[must_use]
    pub fn fields(&self) -> VehicleFields {
        VehicleFields {
            name: self.name.clone(),
            color: self.color.clone(),
            year: self.year.clone(),
            fuel: self.fuel.clone(),
            price: self.price.clone(),
            description: self.description.clone(),
        }
    }
}

/// `DynamoDB` attribute names for the vehicle table
#[derive(Debug, Clone, Copy, Display)]
#[strum(serialize_all = "snake_case")]
pub enum VehicleAttribute {
    /// Primary key - unique vehicle ID
    Id,
    /// Display name
    Name,
    /// Paint color
    Color,
    /// Model year
    Year,
    /// Fuel type
    Fuel,
    /// Asking price
    Price,
    /// Description
    Description,
    /// Resolved image URL
    ImageUrl,
    /// Image blob name
    Image,
}

/// Storage client for vehicle operations
pub struct VehicleStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl VehicleStorage {
    /// Creates a new storage instance
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured `DynamoDB` client
    /// * `table_name` - `DynamoDB` table name for vehicles
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }

    /// Lists every vehicle ordered by name
    ///
    /// The table is scanned page by page; the order is ascending byte-wise on
    /// `name`, and vehicles with equal names keep their scan order.
    ///
    /// # Errors
    ///
    /// Returns `VehicleStorageError` if the `DynamoDB` scan fails or an item cannot be parsed
    pub async fn list_ordered_by_name(&self) -> VehicleStorageResult<Vec<Vehicle>> {
        let mut vehicles = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let response = self
                .dynamodb_client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await?;

            let items = response.items.unwrap_or_default();
            vehicles.extend(from_items::<_, Vehicle>(items)?);

            match response.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        vehicles.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = vehicles.len(), "Listed vehicles");

        Ok(vehicles)
    }

    /// Inserts a new vehicle with a generated UUID and returns that ID
    ///
    /// # Errors
    ///
    /// Returns `VehicleStorageError::VehicleExists` on an ID collision, or another
    /// `VehicleStorageError` if the `DynamoDB` put operation fails
    pub async fn insert(&self, fields: VehicleFields) -> VehicleStorageResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let item = to_item(Vehicle::new(id.clone(), fields))?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", VehicleAttribute::Id.to_string())
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    VehicleStorageError::VehicleExists(id.clone())
                } else {
                    err.into()
                }
            })?;

        Ok(id)
    }

    /// Overwrites the text fields of an existing vehicle, and its image link when given
    ///
    /// Attributes not named here are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `VehicleStorageError::VehicleNotFound` if no vehicle has this ID, or another
    /// `VehicleStorageError` if the `DynamoDB` update operation fails
    pub async fn update(
        &self,
        id: &str,
        fields: &VehicleFields,
        image: Option<&ImageLink>,
    ) -> VehicleStorageResult<()> {
        let mut assignments: Vec<(VehicleAttribute, &str)> = fields.attributes().to_vec();
        if let Some(link) = image {
            assignments.push((VehicleAttribute::ImageUrl, link.url.as_str()));
            assignments.push((VehicleAttribute::Image, link.blob_name.as_str()));
        }

        let mut set_clauses = Vec::with_capacity(assignments.len());
        let mut request = self
            .dynamodb_client
            .update_item()
            .table_name(&self.table_name)
            .key(
                VehicleAttribute::Id.to_string(),
                AttributeValue::S(id.to_string()),
            )
            .condition_expression("attribute_exists(#pk)")
            .expression_attribute_names("#pk", VehicleAttribute::Id.to_string());

        for (attribute, value) in assignments {
            let name = format!("#{attribute}");
            let placeholder = format!(":{attribute}");
            set_clauses.push(format!("{name} = {placeholder}"));
            request = request
                .expression_attribute_names(name, attribute.to_string())
                .expression_attribute_values(placeholder, AttributeValue::S(value.to_string()));
        }

        request
            .update_expression(format!("SET {}", set_clauses.join(", ")))
            .send()
            .await
            .map_err(|err| {
                if matches!(
                    err,
                    SdkError::ServiceError(ref svc) if svc.err().is_conditional_check_failed_exception()
                ) {
                    VehicleStorageError::VehicleNotFound(id.to_string())
                } else {
                    err.into()
                }
            })?;

        Ok(())
    }

    /// Delete a vehicle by ID
    ///
    /// Deleting a missing vehicle succeeds.
    ///
    /// # Errors
    ///
    /// Returns `VehicleStorageError` if the `DynamoDB` delete operation fails
    pub async fn delete(&self, id: &str) -> VehicleStorageResult<()> {
        self.dynamodb_client
            .delete_item()
            .table_name(&self.table_name)
            .key(
                VehicleAttribute::Id.to_string(),
                AttributeValue::S(id.to_string()),
            )
            .send()
            .await?;

        Ok(())
    }
}

//! Backend gateway: the document collection and blob container behind the catalog
//!
//! Both capabilities are traits so the catalog can run against `DynamoDB` and S3
//! in production and against the in-memory [`mock`] in tests.

mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use catalog_storage::vehicle::{ImageLink, Vehicle, VehicleFields, VehicleStorage};

pub use error::{GatewayError, GatewayResult};

use crate::catalog::PendingImage;

/// Records keyed by a store-assigned identifier
#[async_trait::async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Every document, ascending by name
    async fn list_ordered_by_name(&self) -> GatewayResult<Vec<Vehicle>>;

    /// Stores a new document and returns its assigned identifier
    async fn insert(&self, fields: VehicleFields) -> GatewayResult<String>;

    /// Overwrites the text fields of an existing document, and its image link when given
    async fn update(
        &self,
        id: &str,
        fields: &VehicleFields,
        image: Option<&ImageLink>,
    ) -> GatewayResult<()>;

    /// Removes a document
    async fn delete(&self, id: &str) -> GatewayResult<()>;
}

/// Named binary objects
#[async_trait::async_trait]
pub trait BlobContainer: Send + Sync {
    /// Stores `image` under `name`, replacing any previous object
    async fn upload(&self, name: &str, image: &PendingImage) -> GatewayResult<()>;

    /// URL the object can be fetched from; `GatewayError::NotFound` when it is absent
    async fn resolve_url(&self, name: &str) -> GatewayResult<String>;

    /// Removes an object
    async fn delete(&self, name: &str) -> GatewayResult<()>;
}

#[async_trait::async_trait]
impl DocumentCollection for VehicleStorage {
    async fn list_ordered_by_name(&self) -> GatewayResult<Vec<Vehicle>> {
        Ok(Self::list_ordered_by_name(self).await?)
    }

    async fn insert(&self, fields: VehicleFields) -> GatewayResult<String> {
        Ok(Self::insert(self, fields).await?)
    }

    async fn update(
        &self,
        id: &str,
        fields: &VehicleFields,
        image: Option<&ImageLink>,
    ) -> GatewayResult<()> {
        Ok(Self::update(self, id, fields, image).await?)
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        Ok(Self::delete(self, id).await?)
    }
}

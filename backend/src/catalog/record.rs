//! Vehicle records as shown in the catalog

use catalog_storage::vehicle::{Vehicle, VehicleFields};
use schemars::JsonSchema;
use serde::Serialize;

/// A listed vehicle together with the image URL resolved at listing time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct VehicleRecord {
    /// Identifier assigned by the document store
    pub id: String,
    /// The six text fields
    #[serde(flatten)]
    pub fields: VehicleFields,
    /// `None` when the image could not be resolved
    pub image_url: Option<String>,
}

impl VehicleRecord {
    /// Pairs a stored vehicle with the outcome of its image lookup
    ///
    /// The URL stored on the document is ignored in favour of `image_url`.
    #[must_use]
    pub fn from_vehicle(vehicle: &Vehicle, image_url: Option<String>) -> Self {
        Self {
            id: vehicle.id.clone(),
            fields: vehicle.fields(),
            image_url,
        }
    }

    /// The fields searched by the catalog filter
    #[must_use]
    pub fn searchable_fields(&self) -> [&str; 6] {
        [
            self.fields.name.as_str(),
            self.fields.color.as_str(),
            self.fields.year.as_str(),
            self.fields.price.as_str(),
            self.fields.description.as_str(),
            self.fields.fuel.as_str(),
        ]
    }
}

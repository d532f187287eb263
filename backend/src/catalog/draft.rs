//! Unsaved form state for new and edited vehicles

use std::fmt;

use catalog_storage::vehicle::VehicleFields;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Content type assumed when an image is selected without one
pub const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// One of the six editable text fields of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
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
}

impl DraftField {
    /// Writes `value` into the matching field of `fields`
    pub fn apply(self, fields: &mut VehicleFields, value: String) {
        let slot = match self {
            Self::Name => &mut fields.name,
            Self::Color => &mut fields.color,
            Self::Year => &mut fields.year,
            Self::Fuel => &mut fields.fuel,
            Self::Price => &mut fields.price,
            Self::Description => &mut fields.description,
        };
        *slot = value;
    }
}

/// Image picked for a new vehicle, not uploaded yet
#[derive(Clone, PartialEq, Eq)]
pub struct PendingImage {
    /// File name as chosen by the user
    pub file_name: String,
    /// MIME type sent along with the upload
    pub content_type: String,
    /// Raw file contents
    pub bytes: Vec<u8>,
}

impl PendingImage {
    /// Creates a pending image, falling back to `image/jpeg` when no content type is known
    #[must_use]
    pub fn new(file_name: String, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name,
            content_type: content_type
                .filter(|ct| !ct.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_IMAGE_CONTENT_TYPE.to_string()),
            bytes,
        }
    }
}

impl fmt::Debug for PendingImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingImage")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

/// New-vehicle form: six text fields plus the selected image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewVehicleDraft {
    /// Text fields as typed so far
    pub fields: VehicleFields,
    /// Selected image, if any
    pub image: Option<PendingImage>,
}

/// Edit form seeded from an existing vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct EditDraft {
    /// ID of the vehicle being edited
    pub id: String,
    /// Text fields as edited so far
    #[serde(flatten)]
    pub fields: VehicleFields,
}

//! Checks run on the new-vehicle form before anything is written

use catalog_storage::vehicle::VehicleFields;
use thiserror::Error;

use super::{NewVehicleDraft, PendingImage};

/// Reasons a new vehicle is rejected before any backend call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One of the six text fields or the image is missing
    #[error("All fields are required")]
    MissingField,

    /// The year does not start with an integer
    #[error("Year must be a valid number")]
    InvalidYear,
}

impl ValidationError {
    /// Message shown to the user
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingField => "All fields are required",
            Self::InvalidYear => "Year must be a valid number",
        }
    }
}

/// Validates a new-vehicle draft and returns the values to write
///
/// Every text field and the image must be present (a whitespace-only field counts
/// as present). The year must parse as an integer.
///
/// # Errors
///
/// Returns `ValidationError::MissingField` before `ValidationError::InvalidYear`
/// when both apply.
pub fn validate_new_vehicle(
    draft: &NewVehicleDraft,
) -> Result<(VehicleFields, PendingImage), ValidationError> {
    let fields = &draft.fields;
    let any_empty = [
        &fields.name,
        &fields.color,
        &fields.year,
        &fields.fuel,
        &fields.price,
        &fields.description,
    ]
    .iter()
    .any(|value| value.is_empty());

    let Some(image) = draft.image.as_ref() else {
        return Err(ValidationError::MissingField);
    };
    if any_empty {
        return Err(ValidationError::MissingField);
    }

    if !has_integer_prefix(&fields.year) {
        return Err(ValidationError::InvalidYear);
    }

    Ok((fields.clone(), image.clone()))
}

/// Whether `value` starts with an integer, after optional whitespace and sign
///
/// Anything after the leading digits is ignored, so `"2020a"` is accepted.
fn has_integer_prefix(value: &str) -> bool {
    let unsigned = value
        .trim_start()
        .strip_prefix(['+', '-'])
        .unwrap_or_else(|| value.trim_start());

    unsigned.starts_with(|c: char| c.is_ascii_digit())
}

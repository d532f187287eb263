use std::sync::Arc;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use axum_valid::Valid;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use crate::{
    catalog::{
        Action, CatalogController, CatalogError, CatalogView, DraftField, FailurePolicy,
        PendingImage,
    },
    types::AppError,
};

/// Largest accepted image, after base64 decoding (10 MiB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Request to change the search text
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct SearchRequest {
    /// Free-text query, matched case-insensitively against the text fields
    #[validate(length(max = 256))]
    pub query: String,
}

/// Changed fields of a vehicle form; omitted fields keep their value
#[derive(Debug, Default, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct FieldsPatch {
    /// Display name
    #[validate(length(max = 200))]
    pub name: Option<String>,
    /// Paint color
    #[validate(length(max = 200))]
    pub color: Option<String>,
    /// Model year
    #[validate(length(max = 200))]
    pub year: Option<String>,
    /// Fuel type
    #[validate(length(max = 200))]
    pub fuel: Option<String>,
    /// Asking price
    #[validate(length(max = 200))]
    pub price: Option<String>,
    /// Description
    #[validate(length(max = 4000))]
    pub description: Option<String>,
}

impl FieldsPatch {
    /// The set fields paired with the form field they change
    fn into_changes(self) -> Vec<(DraftField, String)> {
        [
            (DraftField::Name, self.name),
            (DraftField::Color, self.color),
            (DraftField::Year, self.year),
            (DraftField::Fuel, self.fuel),
            (DraftField::Price, self.price),
            (DraftField::Description, self.description),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }
}

/// Request to pick the image of the new vehicle
#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct ImageSelectionRequest {
    /// File name as chosen by the user
    #[validate(length(min = 1, max = 255))]
    pub file_name: String,
    /// MIME type, `image/jpeg` when omitted
    pub content_type: Option<String>,
    /// File contents, base64 encoded
    #[validate(length(min = 1))]
    pub data_base64: String,
}

/// Maps a controller result to the response
///
/// Under `FailurePolicy::Log` a backend failure is answered with the unchanged view.
async fn respond(
    controller: &CatalogController,
    result: Result<CatalogView, CatalogError>,
) -> Result<Json<CatalogView>, AppError> {
    match result {
        Ok(view) => Ok(Json(view)),
        Err(CatalogError::Backend { .. })
            if controller.failure_policy() == FailurePolicy::Log =>
        {
            Ok(Json(controller.view().await))
        }
        Err(e) => Err(AppError::from(e)),
    }
}

/// Get the catalog
///
/// Returns the current view: the listed vehicles matching the search text, both
/// forms and the error to show, if any. No backend call is made.
pub async fn get_catalog(
    Extension(controller): Extension<Arc<CatalogController>>,
) -> Json<CatalogView> {
    Json(controller.view().await)
}

/// Refresh the listing
///
/// Lists every vehicle ordered by name and resolves each image URL. A vehicle
/// whose image cannot be resolved is listed without one.
///
/// # Errors
///
/// Returns an error if:
/// - `502 BAD_GATEWAY` - The vehicles cannot be listed and backend failures propagate
#[instrument(skip_all)]
pub async fn refresh(
    Extension(controller): Extension<Arc<CatalogController>>,
) -> Result<Json<CatalogView>, AppError> {
    let result = controller.refresh().await;
    respond(&controller, result).await
}

/// Set the search text
///
/// Filters the listing locally and clears the current error.
pub async fn set_search(
    Extension(controller): Extension<Arc<CatalogController>>,
    Valid(Json(payload)): Valid<Json<SearchRequest>>,
) -> Json<CatalogView> {
    Json(
        controller
            .dispatch(Action::SearchChanged(payload.query))
            .await,
    )
}

/// Change the new-vehicle form
///
/// Only the fields present in the body are changed.
pub async fn update_new_draft(
    Extension(controller): Extension<Arc<CatalogController>>,
    Valid(Json(payload)): Valid<Json<FieldsPatch>>,
) -> Json<CatalogView> {
    let actions = payload
        .into_changes()
        .into_iter()
        .map(|(field, value)| Action::NewDraftChanged(field, value))
        .collect();

    Json(controller.dispatch_all(actions).await)
}

/// Pick the image of the new vehicle
///
/// The image is kept with the form and uploaded when the vehicle is created.
///
/// # Errors
///
/// Returns an error if:
/// - `400 BAD_REQUEST` - The data is not valid base64 or exceeds 10 MiB
#[instrument(skip_all)]
pub async fn select_image(
    Extension(controller): Extension<Arc<CatalogController>>,
    Valid(Json(payload)): Valid<Json<ImageSelectionRequest>>,
) -> Result<Json<CatalogView>, AppError> {
    let bytes = STANDARD.decode(payload.data_base64.as_bytes()).map_err(|e| {
        tracing::debug!(file_name = %payload.file_name, "Rejected image data: {e}");
        AppError::new(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "Image data is not valid base64",
            false,
        )
    })?;

    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::new(
            StatusCode::BAD_REQUEST,
            "invalid_input",
            "Image exceeds the 10 MiB limit",
            false,
        ));
    }

    let image = PendingImage::new(payload.file_name, payload.content_type, bytes);
    Ok(Json(controller.dispatch(Action::ImageSelected(image)).await))
}

/// Remove the picked image from the new-vehicle form
pub async fn clear_image(
    Extension(controller): Extension<Arc<CatalogController>>,
) -> Json<CatalogView> {
    Json(controller.dispatch(Action::ImageCleared).await)
}

/// Create a vehicle from the new-vehicle form
///
/// Inserts the document, uploads the image as `<id>.jpg`, links the two and
/// refreshes the listing. The form is cleared on success.
///
/// # Errors
///
/// Returns an error if:
/// - `400 BAD_REQUEST` - A field or the image is missing, or the year is not a number
/// - `502 BAD_GATEWAY` - A backend call fails and backend failures propagate
#[instrument(skip_all)]
pub async fn create_vehicle(
    Extension(controller): Extension<Arc<CatalogController>>,
) -> Result<Json<CatalogView>, AppError> {
    let result = controller.create().await;
    respond(&controller, result).await
}

/// Delete a vehicle
///
/// Deletes the document and then its image, and refreshes the listing even if the
/// image could not be deleted.
///
/// # Errors
///
/// Returns an error if:
/// - `502 BAD_GATEWAY` - The document delete or the refresh fails and backend failures propagate
#[instrument(skip(controller))]
pub async fn delete_vehicle(
    Path(id): Path<String>,
    Extension(controller): Extension<Arc<CatalogController>>,
) -> Result<Json<CatalogView>, AppError> {
    let result = controller.delete(&id).await;
    respond(&controller, result).await
}

/// Open the edit form for a listed vehicle
///
/// # Errors
///
/// Returns an error if:
/// - `404 NOT_FOUND` - The vehicle is not in the current listing
#[instrument(skip(controller))]
pub async fn begin_edit(
    Path(id): Path<String>,
    Extension(controller): Extension<Arc<CatalogController>>,
) -> Result<Json<CatalogView>, AppError> {
    Ok(Json(controller.begin_edit(&id).await?))
}

/// Change the edit form
///
/// Only the fields present in the body are changed. Ignored while no edit form is open.
pub async fn update_edit_draft(
    Extension(controller): Extension<Arc<CatalogController>>,
    Valid(Json(payload)): Valid<Json<FieldsPatch>>,
) -> Json<CatalogView> {
    let actions = payload
        .into_changes()
        .into_iter()
        .map(|(field, value)| Action::EditDraftChanged(field, value))
        .collect();

    Json(controller.dispatch_all(actions).await)
}

/// Close the edit form without saving
pub async fn cancel_edit(
    Extension(controller): Extension<Arc<CatalogController>>,
) -> Json<CatalogView> {
    Json(controller.dispatch(Action::CancelEdit).await)
}

/// Save the edit form
///
/// Writes the edited fields as they are and refreshes the listing. The edit form
/// is closed on success.
///
/// # Errors
///
/// Returns an error if:
/// - `409 CONFLICT` - No edit form is open
/// - `502 BAD_GATEWAY` - The write or the refresh fails and backend failures propagate
#[instrument(skip_all)]
pub async fn submit_edit(
    Extension(controller): Extension<Arc<CatalogController>>,
) -> Result<Json<CatalogView>, AppError> {
    let result = controller.update().await;
    respond(&controller, result).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_keeps_only_set_fields_in_form_order() {
        let patch = FieldsPatch {
            price: Some("9000".to_string()),
            name: Some("Civic".to_string()),
            ..FieldsPatch::default()
        };

        assert_eq!(
            patch.into_changes(),
            vec![
                (DraftField::Name, "Civic".to_string()),
                (DraftField::Price, "9000".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        assert!(FieldsPatch::default().into_changes().is_empty());
    }
}

//! Two-phase creation of a vehicle and its image
//!
//! A vehicle is written in four steps: the document is inserted, the image is
//! uploaded under the name derived from the new ID, the image URL is resolved,
//! and the document is updated with that URL and the blob name. Nothing ties
//! the steps together on the backend, so a failure part-way leaves the writes
//! made so far in place. [`CreateStage`] names how far a run got, and
//! [`compensate`] undoes those writes when the caller opts in.

use catalog_storage::vehicle::{image_blob_name, ImageLink, VehicleFields};
use tracing::{debug, info, warn};

use super::PendingImage;
use crate::gateway::{BlobContainer, DocumentCollection, GatewayError};

/// Progress of a create run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateStage {
    /// Input validated, nothing written yet
    Validated,
    /// Document inserted without an image link
    DocumentCreated {
        /// Assigned document ID
        id: String,
    },
    /// Image uploaded, document not linked to it yet
    PendingImage {
        /// Assigned document ID
        id: String,
        /// Name the image was uploaded under
        blob_name: String,
    },
    /// Document linked to its image
    Linked {
        /// Assigned document ID
        id: String,
    },
}

/// A create run that stopped before [`CreateStage::Linked`]
#[derive(Debug)]
pub struct CreateFailure {
    /// Last stage reached before the failing step
    pub stage: CreateStage,
    /// Backend call that failed
    pub operation: &'static str,
    /// Error returned by that call
    pub source: GatewayError,
}

/// Runs every create step in order and returns the new vehicle's ID
///
/// # Errors
///
/// Returns a `CreateFailure` holding the stage reached before the first failing call.
pub async fn run_create(
    documents: &dyn DocumentCollection,
    blobs: &dyn BlobContainer,
    fields: VehicleFields,
    image: &PendingImage,
) -> Result<String, CreateFailure> {
    let mut stage = CreateStage::Validated;
    let fail = |stage: &CreateStage, operation: &'static str, source: GatewayError| CreateFailure {
        stage: stage.clone(),
        operation,
        source,
    };

    let id = documents
        .insert(fields.clone())
        .await
        .map_err(|e| fail(&stage, "insert document", e))?;
    stage = CreateStage::DocumentCreated { id: id.clone() };
    debug!(%id, "Vehicle document created");

    let blob_name = image_blob_name(&id);
    blobs
        .upload(&blob_name, image)
        .await
        .map_err(|e| fail(&stage, "upload image", e))?;
    stage = CreateStage::PendingImage {
        id: id.clone(),
        blob_name: blob_name.clone(),
    };
    info!(%id, %blob_name, "Vehicle image uploaded");

    let url = blobs
        .resolve_url(&blob_name)
        .await
        .map_err(|e| fail(&stage, "resolve image url", e))?;

    let link = ImageLink { url, blob_name };
    documents
        .update(&id, &fields, Some(&link))
        .await
        .map_err(|e| fail(&stage, "link image", e))?;
    stage = CreateStage::Linked { id: id.clone() };

    info!(?stage, "Vehicle added to the catalog");
    Ok(id)
}

/// Removes what a failed run wrote, newest write first
///
/// Failures while compensating are logged and otherwise ignored.
pub async fn compensate(
    documents: &dyn DocumentCollection,
    blobs: &dyn BlobContainer,
    stage: &CreateStage,
) {
    let (id, blob_name) = match stage {
        CreateStage::Validated | CreateStage::Linked { .. } => return,
        CreateStage::DocumentCreated { id } => (id, None),
        CreateStage::PendingImage { id, blob_name } => (id, Some(blob_name)),
    };

    if let Some(blob_name) = blob_name {
        if let Err(e) = blobs.delete(blob_name).await {
            warn!(%blob_name, error = %e, "Failed to remove image of failed create");
        }
    }

    match documents.delete(id).await {
        Ok(()) => info!(%id, "Removed orphaned vehicle document"),
        Err(e) => warn!(%id, error = %e, "Failed to remove orphaned vehicle document"),
    }
}

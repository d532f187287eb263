//! Async controller that maps catalog actions to backend calls

use std::mem;
use std::sync::Arc;

use catalog_storage::vehicle::image_blob_name;
use futures::{stream, StreamExt};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::saga::{compensate, run_create};
use super::{validate_new_vehicle, Action, CatalogState, CatalogView, ValidationError, VehicleRecord};
use crate::gateway::{BlobContainer, DocumentCollection, GatewayError, GatewayResult};

/// Default number of image lookups in flight during a refresh
pub const DEFAULT_IMAGE_LOOKUP_CONCURRENCY: usize = 8;

/// What happens to the view when a backend call fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and leave the view as it was
    #[default]
    Log,
    /// Log the failure and show it as the view's error
    Propagate,
}

impl FailurePolicy {
    /// Parses `log` or `propagate`, ignoring case and surrounding whitespace
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "log" => Some(Self::Log),
            "propagate" => Some(Self::Propagate),
            _ => None,
        }
    }
}

/// Tunables of the catalog controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Handling of backend failures
    pub failure_policy: FailurePolicy,
    /// Remove what a failed create already wrote
    pub compensate_orphans: bool,
    /// Upper bound on concurrent image lookups during a refresh
    pub image_lookup_concurrency: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Log,
            compensate_orphans: false,
            image_lookup_concurrency: DEFAULT_IMAGE_LOOKUP_CONCURRENCY,
        }
    }
}

/// Errors returned by catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The new-vehicle form was rejected before any backend call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A backend call failed
    #[error("Backend operation failed: {operation}")]
    Backend {
        /// Name of the failed operation
        operation: &'static str,
        /// Gateway error
        #[source]
        source: GatewayError,
    },

    /// No listed vehicle has the given ID
    #[error("Vehicle not found: {0}")]
    UnknownVehicle(String),

    /// An update was submitted while no edit form is open
    #[error("No edit in progress")]
    NoEditInProgress,
}

/// Owns the catalog state and runs every action against the backend
///
/// The state lock is held for the whole of an action, so actions never interleave.
pub struct CatalogController {
    documents: Arc<dyn DocumentCollection>,
    blobs: Arc<dyn BlobContainer>,
    config: ControllerConfig,
    state: Mutex<CatalogState>,
}

impl CatalogController {
    /// Creates a controller with an empty catalog
    #[must_use]
    pub fn new(
        documents: Arc<dyn DocumentCollection>,
        blobs: Arc<dyn BlobContainer>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            documents,
            blobs,
            config,
            state: Mutex::new(CatalogState::default()),
        }
    }

    /// Configured failure policy
    #[must_use]
    pub const fn failure_policy(&self) -> FailurePolicy {
        self.config.failure_policy
    }

    /// Current render model
    pub async fn view(&self) -> CatalogView {
        self.state.lock().await.view()
    }

    /// Applies a local action that needs no backend call
    pub async fn dispatch(&self, action: Action) -> CatalogView {
        self.dispatch_all(vec![action]).await
    }

    /// Applies local actions in order, with no other action in between
    pub async fn dispatch_all(&self, actions: Vec<Action>) -> CatalogView {
        let mut state = self.state.lock().await;
        for action in actions {
            apply(&mut state, action);
        }
        state.view()
    }

    /// Opens the edit form seeded from the listed vehicle `id`
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownVehicle` if `id` is not in the current listing.
    pub async fn begin_edit(&self, id: &str) -> Result<CatalogView, CatalogError> {
        let mut state = self.state.lock().await;
        let Some(record) = state.record(id).cloned() else {
            return Err(CatalogError::UnknownVehicle(id.to_string()));
        };
        apply(&mut state, Action::BeginEdit(record));
        Ok(state.view())
    }

    /// Replaces the listing with a fresh one from the backend
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Backend` if the documents cannot be listed.
    /// Failed image lookups only drop the image of the affected vehicle.
    pub async fn refresh(&self) -> Result<CatalogView, CatalogError> {
        let mut state = self.state.lock().await;
        self.refresh_locked(&mut state).await?;
        Ok(state.view())
    }

    /// Creates a vehicle from the new-vehicle form
    ///
    /// On success the form is cleared and the listing refreshed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` without calling the backend if the form
    /// is incomplete, or `CatalogError::Backend` if a create step or the refresh fails.
    pub async fn create(&self) -> Result<CatalogView, CatalogError> {
        let mut state = self.state.lock().await;

        let (fields, image) = match validate_new_vehicle(&state.new_draft) {
            Ok(valid) => valid,
            Err(e) => {
                warn!(reason = %e, "New vehicle rejected");
                apply(&mut state, Action::ValidationFailed(e.message().to_string()));
                return Err(CatalogError::Validation(e));
            }
        };

        if let Err(failure) =
            run_create(self.documents.as_ref(), self.blobs.as_ref(), fields, &image).await
        {
            if self.config.compensate_orphans {
                compensate(self.documents.as_ref(), self.blobs.as_ref(), &failure.stage).await;
            } else {
                warn!(stage = ?failure.stage, "Create stopped part-way, leaving written data in place");
            }
            return Err(self.backend_failure(&mut state, failure.operation, failure.source));
        }

        apply(&mut state, Action::Created);
        self.refresh_locked(&mut state).await?;
        Ok(state.view())
    }

    /// Writes the edit form back to its vehicle
    ///
    /// The fields are written as they are, without validation. On success the
    /// edit form is closed and the listing refreshed.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NoEditInProgress` if no edit form is open, or
    /// `CatalogError::Backend` if the write or the refresh fails.
    pub async fn update(&self) -> Result<CatalogView, CatalogError> {
        let mut state = self.state.lock().await;
        let Some(draft) = state.edit_draft.clone() else {
            return Err(CatalogError::NoEditInProgress);
        };

        if let Err(source) = self.documents.update(&draft.id, &draft.fields, None).await {
            return Err(self.backend_failure(&mut state, "update vehicle", source));
        }
        info!(id = %draft.id, "Vehicle updated");

        apply(&mut state, Action::Updated);
        self.refresh_locked(&mut state).await?;
        Ok(state.view())
    }

    /// Deletes a vehicle and then its image
    ///
    /// A failed image delete is logged and the listing is refreshed anyway.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Backend` if the document delete or the refresh fails.
    pub async fn delete(&self, id: &str) -> Result<CatalogView, CatalogError> {
        let mut state = self.state.lock().await;

        if let Err(source) = self.documents.delete(id).await {
            return Err(self.backend_failure(&mut state, "delete vehicle", source));
        }
        info!(%id, "Vehicle deleted");

        let blob_name = image_blob_name(id);
        if let Err(e) = self.blobs.delete(&blob_name).await {
            warn!(%id, %blob_name, error = %e, "Failed to delete vehicle image");
        }

        self.refresh_locked(&mut state).await?;
        Ok(state.view())
    }

    async fn refresh_locked(&self, state: &mut CatalogState) -> Result<(), CatalogError> {
        match self.load_records().await {
            Ok(records) => {
                info!(count = records.len(), "Catalog refreshed");
                apply(state, Action::RecordsLoaded(records));
                Ok(())
            }
            Err(source) => Err(self.backend_failure(state, "list vehicles", source)),
        }
    }

    /// Lists every vehicle and resolves the image URLs concurrently
    ///
    /// Lookups complete in any order but are paired with the vehicles by position.
    async fn load_records(&self) -> GatewayResult<Vec<VehicleRecord>> {
        let vehicles = self.documents.list_ordered_by_name().await?;

        let lookups: Vec<_> = vehicles
            .iter()
            .map(|vehicle| {
                let blobs = Arc::clone(&self.blobs);
                let id = vehicle.id.clone();
                async move {
                    let blob_name = image_blob_name(&id);
                    match blobs.resolve_url(&blob_name).await {
                        Ok(url) => Some(url),
                        Err(e) => {
                            warn!(
                                %id,
                                %blob_name,
                                error = %e,
                                "Image lookup failed, listing vehicle without image"
                            );
                            None
                        }
                    }
                }
            })
            .collect();

        let image_urls: Vec<Option<String>> = stream::iter(lookups)
            .buffered(self.config.image_lookup_concurrency.max(1))
            .collect()
            .await;

        Ok(vehicles
            .iter()
            .zip(image_urls)
            .map(|(vehicle, image_url)| VehicleRecord::from_vehicle(vehicle, image_url))
            .collect())
    }

    fn backend_failure(
        &self,
        state: &mut CatalogState,
        operation: &'static str,
        source: GatewayError,
    ) -> CatalogError {
        error!(operation, error = %source, "Backend operation failed");
        if self.config.failure_policy == FailurePolicy::Propagate {
            apply(
                state,
                Action::BackendFailed(format!("Backend operation failed: {operation}")),
            );
        }
        CatalogError::Backend { operation, source }
    }
}

fn apply(state: &mut CatalogState, action: Action) {
    *state = mem::take(state).reduce(action);
}

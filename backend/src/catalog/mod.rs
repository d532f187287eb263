//! Vehicle catalog: state, validation, search and the controller driving the backend

mod controller;
mod draft;
mod filter;
mod record;
pub mod saga;
mod state;
mod validation;

pub use controller::{
    CatalogController, CatalogError, ControllerConfig, FailurePolicy,
    DEFAULT_IMAGE_LOOKUP_CONCURRENCY,
};
pub use draft::{DraftField, EditDraft, NewVehicleDraft, PendingImage, DEFAULT_IMAGE_CONTENT_TYPE};
pub use filter::filter_records;
pub use record::VehicleRecord;
pub use state::{Action, CatalogState, CatalogView, NewDraftView, SelectedImage};
pub use validation::{validate_new_vehicle, ValidationError};

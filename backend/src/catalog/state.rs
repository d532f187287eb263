//! Catalog UI state as an immutable snapshot and its reducer

use catalog_storage::vehicle::VehicleFields;
use schemars::JsonSchema;
use serde::Serialize;

use super::{filter_records, DraftField, EditDraft, NewVehicleDraft, PendingImage, VehicleRecord};

/// Everything the catalog view is rendered from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogState {
    /// Free-text search
    pub search: String,
    /// New-vehicle form
    pub new_draft: NewVehicleDraft,
    /// Edit form, `Some` while it is shown
    pub edit_draft: Option<EditDraft>,
    /// Single user-visible error
    pub error: Option<String>,
    /// Last listing, ordered by name
    pub records: Vec<VehicleRecord>,
}

/// State transitions of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Search text changed
    SearchChanged(String),
    /// A field of the new-vehicle form changed
    NewDraftChanged(DraftField, String),
    /// An image was picked for the new vehicle
    ImageSelected(PendingImage),
    /// The picked image was removed
    ImageCleared,
    /// A field of the edit form changed
    EditDraftChanged(DraftField, String),
    /// The edit form was opened for a record
    BeginEdit(VehicleRecord),
    /// The edit form was closed without saving
    CancelEdit,
    /// The new-vehicle form failed validation
    ValidationFailed(String),
    /// A backend call failed and the failure is shown to the user
    BackendFailed(String),
    /// A fresh listing replaced the previous one
    RecordsLoaded(Vec<VehicleRecord>),
    /// A new vehicle was fully written
    Created,
    /// The edited vehicle was written
    Updated,
}

impl CatalogState {
    /// Applies `action` and returns the next snapshot
    ///
    /// Any user input clears the current error.
    #[must_use]
    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::SearchChanged(search) => Self {
                search,
                error: None,
                ..self
            },
            Action::NewDraftChanged(field, value) => {
                let mut new_draft = self.new_draft;
                field.apply(&mut new_draft.fields, value);
                Self {
                    new_draft,
                    error: None,
                    ..self
                }
            }
            Action::ImageSelected(image) => Self {
                new_draft: NewVehicleDraft {
                    image: Some(image),
                    ..self.new_draft
                },
                error: None,
                ..self
            },
            Action::ImageCleared => Self {
                new_draft: NewVehicleDraft {
                    image: None,
                    ..self.new_draft
                },
                error: None,
                ..self
            },
            Action::EditDraftChanged(field, value) => {
                let edit_draft = self.edit_draft.map(|mut draft| {
                    field.apply(&mut draft.fields, value);
                    draft
                });
                Self {
                    edit_draft,
                    error: None,
                    ..self
                }
            }
            Action::BeginEdit(record) => Self {
                edit_draft: Some(EditDraft {
                    id: record.id,
                    fields: record.fields,
                }),
                error: None,
                ..self
            },
            Action::CancelEdit => Self {
                edit_draft: None,
                error: None,
                ..self
            },
            Action::ValidationFailed(message) | Action::BackendFailed(message) => Self {
                error: Some(message),
                ..self
            },
            Action::RecordsLoaded(records) => Self { records, ..self },
            Action::Created => Self {
                new_draft: NewVehicleDraft::default(),
                ..self
            },
            Action::Updated => Self {
                edit_draft: None,
                ..self
            },
        }
    }

    /// Looks up a listed record by ID
    #[must_use]
    pub fn record(&self, id: &str) -> Option<&VehicleRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Builds the render model: filtered records plus form state
    #[must_use]
    pub fn view(&self) -> CatalogView {
        CatalogView {
            search: self.search.clone(),
            vehicles: filter_records(&self.records, &self.search)
                .into_iter()
                .cloned()
                .collect(),
            total: self.records.len(),
            error: self.error.clone(),
            new_draft: NewDraftView {
                fields: self.new_draft.fields.clone(),
                image: self.new_draft.image.as_ref().map(|image| SelectedImage {
                    file_name: image.file_name.clone(),
                    content_type: image.content_type.clone(),
                    size_bytes: image.bytes.len(),
                }),
            },
            edit: self.edit_draft.clone(),
        }
    }
}

/// Render model of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct CatalogView {
    /// Current search text
    pub search: String,
    /// Records matching the search, ordered by name
    pub vehicles: Vec<VehicleRecord>,
    /// Number of records before filtering
    pub total: usize,
    /// Error to show, if any
    pub error: Option<String>,
    /// New-vehicle form
    pub new_draft: NewDraftView,
    /// Edit form, present while it is shown
    pub edit: Option<EditDraft>,
}

/// New-vehicle form as rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct NewDraftView {
    /// Text fields typed so far
    pub fields: VehicleFields,
    /// Picked image, without its contents
    pub image: Option<SelectedImage>,
}

/// Summary of a picked image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct SelectedImage {
    /// File name as chosen by the user
    pub file_name: String,
    /// MIME type
    pub content_type: String,
    /// Size of the file
    pub size_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str) -> VehicleRecord {
        VehicleRecord {
            id: id.to_string(),
            fields: VehicleFields {
                name: name.to_string(),
                color: "red".to_string(),
                year: "2020".to_string(),
                fuel: "gas".to_string(),
                price: "10000".to_string(),
                description: "clean".to_string(),
            },
            image_url: Some(format!("memory://{id}.jpg")),
        }
    }

    fn with_error() -> CatalogState {
        CatalogState::default().reduce(Action::ValidationFailed("boom".to_string()))
    }

    #[test]
    fn test_user_input_clears_error() {
        let inputs = vec![
            Action::SearchChanged("civic".to_string()),
            Action::NewDraftChanged(DraftField::Name, "Civic".to_string()),
            Action::ImageSelected(PendingImage::new("a.jpg".to_string(), None, vec![1])),
            Action::ImageCleared,
            Action::EditDraftChanged(DraftField::Color, "blue".to_string()),
            Action::BeginEdit(record("1", "Civic")),
            Action::CancelEdit,
        ];

        for input in inputs {
            let state = with_error().reduce(input.clone());
            assert_eq!(state.error, None, "{input:?}");
        }
    }

    #[test]
    fn test_loading_records_keeps_error() {
        let state = with_error().reduce(Action::RecordsLoaded(vec![record("1", "Civic")]));

        assert_eq!(state.error.as_deref(), Some("boom"));
        assert_eq!(state.records.len(), 1);
    }

    #[test]
    fn test_begin_edit_seeds_draft_and_cancel_discards_it() {
        let civic = record("1", "Civic");

        let state = CatalogState::default().reduce(Action::BeginEdit(civic.clone()));
        let draft = state.edit_draft.clone().unwrap();
        assert_eq!(draft.id, "1");
        assert_eq!(draft.fields, civic.fields);

        let state = state.reduce(Action::CancelEdit);
        assert_eq!(state.edit_draft, None);
    }

    #[test]
    fn test_edit_change_without_open_form_is_ignored() {
        let state = CatalogState::default()
            .reduce(Action::EditDraftChanged(DraftField::Name, "X".to_string()));

        assert_eq!(state.edit_draft, None);
    }

    #[test]
    fn test_created_clears_draft_and_image() {
        let state = CatalogState::default()
            .reduce(Action::NewDraftChanged(DraftField::Name, "Civic".to_string()))
            .reduce(Action::ImageSelected(PendingImage::new(
                "a.jpg".to_string(),
                None,
                vec![1],
            )))
            .reduce(Action::SearchChanged("civ".to_string()))
            .reduce(Action::Created);

        assert_eq!(state.new_draft, NewVehicleDraft::default());
        assert_eq!(state.search, "civ");
    }

    #[test]
    fn test_updated_closes_edit_form() {
        let state = CatalogState::default()
            .reduce(Action::BeginEdit(record("1", "Civic")))
            .reduce(Action::Updated);

        assert_eq!(state.edit_draft, None);
    }

    #[test]
    fn test_view_filters_by_search() {
        let state = CatalogState::default()
            .reduce(Action::RecordsLoaded(vec![
                record("1", "Accord"),
                record("2", "Civic"),
            ]))
            .reduce(Action::SearchChanged("CIV".to_string()));

        let view = state.view();

        assert_eq!(view.total, 2);
        assert_eq!(view.vehicles.len(), 1);
        assert_eq!(view.vehicles[0].id, "2");
    }

    #[test]
    fn test_view_summarises_selected_image() {
        let state = CatalogState::default().reduce(Action::ImageSelected(PendingImage::new(
            "civic.png".to_string(),
            Some("image/png".to_string()),
            vec![0; 42],
        )));

        let image = state.view().new_draft.image.unwrap();

        assert_eq!(image.file_name, "civic.png");
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.size_bytes, 42);
    }
}

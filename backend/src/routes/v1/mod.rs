pub mod catalog;

use aide::axum::{
    routing::{delete, get, post, put},
    ApiRouter,
};

/// Creates the v1 API router with all v1 handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .api_route("/catalog", get(catalog::get_catalog))
        .api_route("/catalog/refresh", post(catalog::refresh))
        .api_route("/catalog/search", put(catalog::set_search))
        .api_route("/catalog/draft", put(catalog::update_new_draft))
        .api_route(
            "/catalog/draft/image",
            put(catalog::select_image).delete(catalog::clear_image),
        )
        .api_route("/catalog/vehicles", post(catalog::create_vehicle))
        .api_route("/catalog/vehicles/{id}", delete(catalog::delete_vehicle))
        .api_route("/catalog/vehicles/{id}/edit", post(catalog::begin_edit))
        .api_route(
            "/catalog/edit",
            put(catalog::update_edit_draft).delete(catalog::cancel_edit),
        )
        .api_route("/catalog/edit/submit", post(catalog::submit_edit))
}

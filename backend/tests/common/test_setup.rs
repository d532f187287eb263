use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use backend::{
    catalog::{CatalogController, ControllerConfig},
    gateway::mock::InMemoryBackend,
    server,
    types::Environment,
};
use catalog_storage::vehicle::VehicleFields;
use tower::ServiceExt;

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Router wired to an in-memory backend
pub struct TestContext {
    pub router: Router,
    pub backend: Arc<InMemoryBackend>,
    pub controller: Arc<CatalogController>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(ControllerConfig::default())
    }

    pub fn with_config(config: ControllerConfig) -> Self {
        setup_test_env();

        let backend = Arc::new(InMemoryBackend::new());
        let controller = Arc::new(CatalogController::new(
            backend.clone(),
            backend.clone(),
            config,
        ));

        let environment = Environment::Development {
            image_url_expiry_override: None,
        };
        let router = server::router(environment, controller.clone());

        Self {
            router,
            backend,
            controller,
        }
    }

    /// Stores vehicles with an image each and returns their IDs
    pub fn seed(&self, names: &[&str]) -> Vec<String> {
        names
            .iter()
            .map(|name| self.backend.seed(vehicle_fields(name), true))
            .collect()
    }

    pub async fn send_request(
        &self,
        method: Method,
        route: &str,
        payload: Option<serde_json::Value>,
    ) -> Response {
        let builder = Request::builder().uri(route).method(method);
        let request = match payload {
            Some(payload) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(payload.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    pub async fn get(&self, route: &str) -> Response {
        self.send_request(Method::GET, route, None).await
    }

    pub async fn post(&self, route: &str) -> Response {
        self.send_request(Method::POST, route, None).await
    }

    pub async fn put(&self, route: &str, payload: serde_json::Value) -> Response {
        self.send_request(Method::PUT, route, Some(payload)).await
    }

    pub async fn delete(&self, route: &str) -> Response {
        self.send_request(Method::DELETE, route, None).await
    }
}

/// The six text fields of a test vehicle
pub fn vehicle_fields(name: &str) -> VehicleFields {
    VehicleFields {
        name: name.to_string(),
        color: "red".to_string(),
        year: "2020".to_string(),
        fuel: "gas".to_string(),
        price: "10000".to_string(),
        description: "clean".to_string(),
    }
}

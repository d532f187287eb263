use axum::response::Response;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use serde_json::json;

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Draft patch setting all six text fields
pub fn complete_draft(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "color": "red",
        "year": "2020",
        "fuel": "gas",
        "price": "10000",
        "description": "clean"
    })
}

/// Image selection request carrying `data`
pub fn image_selection(file_name: &str, data: &[u8]) -> serde_json::Value {
    json!({
        "file_name": file_name,
        "content_type": "image/jpeg",
        "data_base64": STANDARD.encode(data)
    })
}

/// Names of the vehicles in a catalog view, in listing order
pub fn vehicle_names(view: &serde_json::Value) -> Vec<String> {
    view["vehicles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap().to_string())
        .collect()
}

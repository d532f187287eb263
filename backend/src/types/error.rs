//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::catalog::CatalogError;

/// API error response envelope
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(
        status: StatusCode,
        code: &'static str,
        msg: &'static str,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody { code, message: msg },
            },
        }
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.inner.error.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert catalog errors to application errors
impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(e) => Self::new(
                StatusCode::BAD_REQUEST,
                "validation_error",
                e.message(),
                false,
            ),
            CatalogError::Backend { operation, source } => {
                tracing::error!("Backend operation {operation} failed: {source}");
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    "backend_error",
                    "Backend operation failed",
                    true,
                )
            }
            CatalogError::UnknownVehicle(id) => {
                tracing::debug!("Vehicle not in listing: {id}");
                Self::new(
                    StatusCode::NOT_FOUND,
                    "vehicle_not_found",
                    "Vehicle not found",
                    false,
                )
            }
            CatalogError::NoEditInProgress => Self::new(
                StatusCode::CONFLICT,
                "no_edit_in_progress",
                "No vehicle is being edited",
                false,
            ),
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ValidationError;
    use crate::gateway::GatewayError;

    #[test]
    fn test_catalog_error_mapping() {
        let cases = [
            (
                CatalogError::Validation(ValidationError::InvalidYear),
                StatusCode::BAD_REQUEST,
                "validation_error",
            ),
            (
                CatalogError::Backend {
                    operation: "list vehicles",
                    source: GatewayError::Unavailable("down".to_string()),
                },
                StatusCode::BAD_GATEWAY,
                "backend_error",
            ),
            (
                CatalogError::UnknownVehicle("abc".to_string()),
                StatusCode::NOT_FOUND,
                "vehicle_not_found",
            ),
            (
                CatalogError::NoEditInProgress,
                StatusCode::CONFLICT,
                "no_edit_in_progress",
            ),
        ];

        for (err, status, code) in cases {
            let app_error = AppError::from(err);
            assert_eq!(app_error.status(), status);
            assert_eq!(app_error.code(), code);
        }
    }

    #[test]
    fn test_validation_message_is_kept() {
        let app_error = AppError::from(CatalogError::Validation(ValidationError::MissingField));

        assert_eq!(app_error.inner.error.message, "All fields are required");
        assert!(!app_error.inner.allow_retry);
    }
}

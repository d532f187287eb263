//! Vehicle Catalog backend service

#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Vehicle catalog state and controller
pub mod catalog;

/// Document collection and blob container seams
pub mod gateway;

/// S3 image storage
pub mod image_storage;

/// HTTP routes
pub mod routes;

/// HTTP server
pub mod server;

/// Configuration and API error types
pub mod types;

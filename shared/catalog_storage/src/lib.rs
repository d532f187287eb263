//! Storage services for the vehicle catalog
//!
//! This crate provides the `DynamoDB` document collection holding vehicle listings.
//! Images live in a separate blob container owned by the backend.

pub mod vehicle;

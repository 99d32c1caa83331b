//! DynamoDB document store adapter.
//!
//! - `settings`: `STORE_*` configuration resolved into connection and table names.
//! - `client`: [`DynamoStoreClient`], the [`crate::domain::ports::DocumentStore`]
//!   implementation.
//! - `error_taxonomy`: raw store failures classified into domain errors.

mod attribute_conversion;
mod client;
mod error_taxonomy;
mod settings;

pub use client::DynamoStoreClient;
pub use error_taxonomy::{DEFAULT_RESOURCE, StoreFailure, classify};
pub use settings::{StoreConnection, StoreSettings, StoreTables};

//! Entity repositories over the document store.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories translate between entities and items via
//!   a per-entity mapper. No business logic resides here.
//! - **Store agnostic**: every repository holds an
//!   `Arc<dyn DocumentStore>`, so the DynamoDB client and the in-memory store
//!   are interchangeable.
//! - **Typed reads**: missing or mistyped stored fields surface as
//!   `MalformedWireValue` errors naming the field.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lottery_backend::outbound::dynamodb::{DynamoStoreClient, StoreSettings};
//! use lottery_backend::outbound::persistence::DocumentUserRepository;
//!
//! let settings = StoreSettings::load()?;
//! let tables = settings.tables()?;
//! let store = Arc::new(DynamoStoreClient::connect(&settings.connection()?));
//! let users = DocumentUserRepository::new(store, tables.users, tables.users_email_index);
//! ```

mod document_draw_result_repository;
mod document_user_repository;
mod draw_result_mapper;
mod item_fields;
mod table;
mod user_mapper;

pub use document_draw_result_repository::DocumentDrawResultRepository;
pub use document_user_repository::DocumentUserRepository;

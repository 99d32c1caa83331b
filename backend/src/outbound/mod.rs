//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **dynamodb**: document store client, configuration and failure taxonomy
//! - **persistence**: entity repositories over any `DocumentStore`
//! - **cache**: Redis transport behind a `bb8` pool
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cache;
pub mod dynamodb;
pub mod persistence;

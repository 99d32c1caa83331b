//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod cache_metrics;
mod cache_transport;
mod document_store;
mod draw_result_repository;
mod token_issuer;
mod user_repository;

pub use cache_key::{CacheKey, CacheKeyValidationError, StatsKey};
#[cfg(test)]
pub use cache_metrics::MockCacheMetrics;
pub use cache_metrics::{CacheMetrics, CacheMetricsError, CacheOperation, NoOpCacheMetrics};
#[cfg(test)]
pub use cache_transport::MockCacheTransport;
pub use cache_transport::{CacheTransport, CacheTransportError};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    DocumentStore, ExpressionParams, QueryRequest, ScanRequest, UpdateRequest,
};
#[cfg(test)]
pub use draw_result_repository::MockDrawResultRepository;
pub use draw_result_repository::DrawResultRepository;
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{FixtureTokenIssuer, TokenClaims, TokenIssuer};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::UserRepository;

//! Port for the raw key-value cache transport.
use std::time::Duration;

use async_trait::async_trait;

use super::{CacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by the cache transport.
    pub enum CacheTransportError {
        /// Cache backend is unreachable or the pool could not hand out a connection.
        Connection { message: String } => "cache connection failed: {message}",
        /// The backend rejected a command.
        Command { message: String } => "cache command failed: {message}",
    }
}

/// String-valued cache operations. Serialisation happens above this port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheTransport: Send + Sync {
    /// Store `value`, expiring after `ttl` when given.
    async fn set(
        &self,
        key: &CacheKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), CacheTransportError>;

    /// Read the raw value, `None` when absent or expired.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheTransportError>;

    /// Remove the entry, returning how many entries were removed.
    async fn delete(&self, key: &CacheKey) -> Result<u64, CacheTransportError>;

    /// Whether an entry is present.
    async fn exists(&self, key: &CacheKey) -> Result<bool, CacheTransportError>;
}

//! Redis cache adapter.
//!
//! [`RedisCacheTransport`] implements the raw string transport; callers wrap
//! it in [`crate::domain::FailOpenCache`] for JSON values and fail-open
//! behaviour.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use lottery_backend::domain::FailOpenCache;
//! use lottery_backend::outbound::cache::{CacheSettings, RedisCacheTransport};
//!
//! let connection = CacheSettings::load()?.connection()?;
//! let transport = RedisCacheTransport::new(&connection)?;
//! let cache = FailOpenCache::new(Arc::new(transport))
//!     .with_default_ttl(connection.default_ttl());
//! ```

mod redis_transport;
mod settings;

pub use redis_transport::RedisCacheTransport;
pub use settings::{CacheConnection, CacheSettings};

//! Redis-backed [`CacheTransport`] using a `bb8` connection pool.
//!
//! The pool connects lazily, so building the transport never touches the
//! network. Connection problems appear on the first command and are left to
//! the fail-open cache above this adapter.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis::{AsyncCommands, RedisError};
use tracing::debug;

use super::settings::CacheConnection;
use crate::domain::DomainError;
use crate::domain::ports::{CacheKey, CacheTransport, CacheTransportError};

const DEFAULT_MAX_SIZE: u32 = 8;
const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Pooled Redis transport.
#[derive(Clone)]
pub struct RedisCacheTransport {
    pool: Pool<RedisConnectionManager>,
}

impl RedisCacheTransport {
    /// Build the pool without opening a connection.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the URL is rejected by the client.
    pub fn new(connection: &CacheConnection) -> Result<Self, DomainError> {
        let manager = RedisConnectionManager::new(connection.url()).map_err(|err| {
            DomainError::configuration(format!("invalid cache connection: {err}"))
        })?;
        let pool = Pool::builder()
            .max_size(DEFAULT_MAX_SIZE)
            .connection_timeout(DEFAULT_CONNECTION_TIMEOUT)
            .build_unchecked(manager);
        Ok(Self { pool })
    }

    async fn connection(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, CacheTransportError> {
        self.pool
            .get()
            .await
            .map_err(|err| CacheTransportError::connection(err.to_string()))
    }
}

fn map_redis_error(err: RedisError) -> CacheTransportError {
    debug!(error = %err, "redis command failed");
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        CacheTransportError::connection(err.to_string())
    } else {
        CacheTransportError::command(err.to_string())
    }
}

/// Whole seconds for `SETEX`, never below one.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheTransport for RedisCacheTransport {
    async fn set(
        &self,
        key: &CacheKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), CacheTransportError> {
        let mut conn = self.connection().await?;
        match ttl {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key.as_str(), value, expiry_seconds(ttl))
                .await
                .map_err(map_redis_error),
            None => conn
                .set::<_, _, ()>(key.as_str(), value)
                .await
                .map_err(map_redis_error),
        }
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheTransportError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(key.as_str())
            .await
            .map_err(map_redis_error)
    }

    async fn delete(&self, key: &CacheKey) -> Result<u64, CacheTransportError> {
        let mut conn = self.connection().await?;
        conn.del::<_, u64>(key.as_str())
            .await
            .map_err(map_redis_error)
    }

    async fn exists(&self, key: &CacheKey) -> Result<bool, CacheTransportError> {
        let mut conn = self.connection().await?;
        conn.exists::<_, bool>(key.as_str())
            .await
            .map_err(map_redis_error)
    }
}

//! Domain port surface for observing cache outcomes.
//!
//! The fail-open cache reports hits, misses and swallowed transport failures
//! here instead of writing to standard error. Implementations may export to a
//! metrics backend or discard everything.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording cache metrics.
    pub enum CacheMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "cache metrics exporter failed: {message}",
    }
}

/// Cache operation a metric refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOperation {
    Set,
    Get,
    Delete,
    Exists,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Get => "get",
            Self::Delete => "delete",
            Self::Exists => "exists",
        }
    }
}

/// Metrics recording port for cache outcomes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheMetrics: Send + Sync {
    /// Record a `get` that found a readable value.
    async fn record_hit(&self, key: &str) -> Result<(), CacheMetricsError>;

    /// Record a `get` that found nothing usable.
    async fn record_miss(&self, key: &str) -> Result<(), CacheMetricsError>;

    /// Record a transport failure that was swallowed.
    async fn record_failure(
        &self,
        operation: CacheOperation,
        key: &str,
        message: &str,
    ) -> Result<(), CacheMetricsError>;
}

/// No-op implementation for when metrics are disabled or in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpCacheMetrics;

#[async_trait]
impl CacheMetrics for NoOpCacheMetrics {
    async fn record_hit(&self, _key: &str) -> Result<(), CacheMetricsError> {
        Ok(())
    }

    async fn record_miss(&self, _key: &str) -> Result<(), CacheMetricsError> {
        Ok(())
    }

    async fn record_failure(
        &self,
        _operation: CacheOperation,
        _key: &str,
        _message: &str,
    ) -> Result<(), CacheMetricsError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_metrics_accept_every_event() {
        let metrics = NoOpCacheMetrics;
        assert!(metrics.record_hit("last_results").await.is_ok());
        assert!(metrics.record_miss("last_results").await.is_ok());
        assert!(
            metrics
                .record_failure(CacheOperation::Set, "last_results", "refused")
                .await
                .is_ok()
        );
    }

    #[test]
    fn error_constructor_accepts_str() {
        let err = CacheMetricsError::export("test error");
        assert_eq!(err.to_string(), "cache metrics exporter failed: test error");
    }
}

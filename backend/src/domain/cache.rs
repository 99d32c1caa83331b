//! Fail-open cache-aside wrapper.
//!
//! [`FailOpenCache`] stores JSON values through a [`CacheTransport`]. A cache
//! outage must never fail the caller, so transport errors are logged,
//! reported to [`CacheMetrics`] and then degraded:
//!
//! | operation | on transport failure |
//! |-----------|----------------------|
//! | `set`     | returns normally     |
//! | `get`     | miss                 |
//! | `delete`  | `false`              |
//! | `exists`  | `false`              |
//!
//! A stored value that no longer deserialises into the requested type is
//! also a miss.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::ports::{CacheKey, CacheMetrics, CacheOperation, CacheTransport, NoOpCacheMetrics};

/// JSON cache that never propagates transport failures.
#[derive(Clone)]
pub struct FailOpenCache {
    transport: Arc<dyn CacheTransport>,
    metrics: Arc<dyn CacheMetrics>,
    default_ttl: Option<Duration>,
}

impl FailOpenCache {
    /// Wrap a transport with no-op metrics and no default expiry.
    pub fn new(transport: Arc<dyn CacheTransport>) -> Self {
        Self {
            transport,
            metrics: Arc::new(NoOpCacheMetrics),
            default_ttl: None,
        }
    }

    /// Report hits, misses and swallowed failures to `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn CacheMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Expiry applied when `set` is called without one.
    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Store `value` as JSON.
    pub async fn set<V>(&self, key: &CacheKey, value: &V, ttl: Option<Duration>)
    where
        V: Serialize + ?Sized + Sync,
    {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(key = %key, error = %err, "cache value not serialisable; skipping set");
                self.report_failure(CacheOperation::Set, key, &err.to_string())
                    .await;
                return;
            }
        };
        let ttl = ttl.or(self.default_ttl);
        if let Err(err) = self.transport.set(key, &payload, ttl).await {
            warn!(key = %key, error = %err, "cache set failed; continuing without cache");
            self.report_failure(CacheOperation::Set, key, &err.to_string())
                .await;
        }
    }

    /// Read and deserialise the value under `key`; `None` on any miss.
    pub async fn get<V: DeserializeOwned>(&self, key: &CacheKey) -> Option<V> {
        let raw = match self.transport.get(key).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %key, error = %err, "cache get failed; treating as miss");
                self.report_failure(CacheOperation::Get, key, &err.to_string())
                    .await;
                return None;
            }
        };
        let value = raw.and_then(|payload| match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key = %key, error = %err, "cached value unreadable; treating as miss");
                None
            }
        });
        let recorded = match value {
            Some(_) => self.metrics.record_hit(key.as_str()).await,
            None => self.metrics.record_miss(key.as_str()).await,
        };
        if let Err(err) = recorded {
            debug!(key = %key, error = %err, "cache metrics write failed");
        }
        value
    }

    /// Remove `key`; `true` only when an entry was removed.
    pub async fn delete(&self, key: &CacheKey) -> bool {
        match self.transport.delete(key).await {
            Ok(removed) => removed > 0,
            Err(err) => {
                warn!(key = %key, error = %err, "cache delete failed");
                self.report_failure(CacheOperation::Delete, key, &err.to_string())
                    .await;
                false
            }
        }
    }

    /// Whether `key` currently holds an entry.
    pub async fn exists(&self, key: &CacheKey) -> bool {
        match self.transport.exists(key).await {
            Ok(present) => present,
            Err(err) => {
                warn!(key = %key, error = %err, "cache exists failed; reporting absent");
                self.report_failure(CacheOperation::Exists, key, &err.to_string())
                    .await;
                false
            }
        }
    }

    async fn report_failure(&self, operation: CacheOperation, key: &CacheKey, message: &str) {
        if let Err(err) = self
            .metrics
            .record_failure(operation, key.as_str(), message)
            .await
        {
            debug!(
                operation = operation.as_str(),
                error = %err,
                "cache metrics write failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{CacheTransportError, MockCacheMetrics, MockCacheTransport};
    use rstest::{fixture, rstest};
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stat {
        number: String,
        quantity: u32,
    }

    #[fixture]
    fn key() -> CacheKey {
        CacheKey::new("frequency_stats").expect("valid key")
    }

    fn refused() -> CacheTransportError {
        CacheTransportError::connection("connection refused")
    }

    #[rstest]
    #[tokio::test]
    async fn set_writes_json_with_default_ttl(key: CacheKey) {
        let mut transport = MockCacheTransport::new();
        transport
            .expect_set()
            .withf(|key, value, ttl| {
                key.as_str() == "frequency_stats"
                    && value == r#"{"number":"07","quantity":3}"#
                    && *ttl == Some(Duration::from_secs(60))
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let cache =
            FailOpenCache::new(Arc::new(transport)).with_default_ttl(Some(Duration::from_secs(60)));

        cache
            .set(
                &key,
                &Stat {
                    number: "07".into(),
                    quantity: 3,
                },
                None,
            )
            .await;
    }

    #[rstest]
    #[tokio::test]
    async fn set_swallows_transport_failure_and_reports_it(key: CacheKey) {
        let mut transport = MockCacheTransport::new();
        transport
            .expect_set()
            .returning(|_, _, _| Err(refused()));
        let mut metrics = MockCacheMetrics::new();
        metrics
            .expect_record_failure()
            .withf(|operation, key, _| {
                *operation == CacheOperation::Set && key == "frequency_stats"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let cache = FailOpenCache::new(Arc::new(transport)).with_metrics(Arc::new(metrics));

        cache.set(&key, &1_u32, None).await;
    }

    #[rstest]
    #[tokio::test]
    async fn get_returns_hits(key: CacheKey) {
        let mut transport = MockCacheTransport::new();
        transport
            .expect_get()
            .returning(|_| Ok(Some(r#"{"number":"01","quantity":9}"#.to_owned())));
        let mut metrics = MockCacheMetrics::new();
        metrics.expect_record_hit().times(1).returning(|_| Ok(()));
        let cache = FailOpenCache::new(Arc::new(transport)).with_metrics(Arc::new(metrics));

        let stat: Option<Stat> = cache.get(&key).await;
        assert_eq!(
            stat,
            Some(Stat {
                number: "01".into(),
                quantity: 9
            })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn get_misses_on_transport_failure(key: CacheKey) {
        let mut transport = MockCacheTransport::new();
        transport.expect_get().returning(|_| Err(refused()));
        let mut metrics = MockCacheMetrics::new();
        metrics
            .expect_record_failure()
            .times(1)
            .returning(|_, _, _| Ok(()));
        let cache = FailOpenCache::new(Arc::new(transport)).with_metrics(Arc::new(metrics));

        assert_eq!(cache.get::<Stat>(&key).await, None);
    }

    #[rstest]
    #[tokio::test]
    async fn get_misses_on_unreadable_value(key: CacheKey) {
        let mut transport = MockCacheTransport::new();
        transport
            .expect_get()
            .returning(|_| Ok(Some("not json".to_owned())));
        let mut metrics = MockCacheMetrics::new();
        metrics.expect_record_miss().times(1).returning(|_| Ok(()));
        let cache = FailOpenCache::new(Arc::new(transport)).with_metrics(Arc::new(metrics));

        assert_eq!(cache.get::<Stat>(&key).await, None);
    }

    #[rstest]
    #[case(Ok(1), true)]
    #[case(Ok(0), false)]
    #[case(Err(CacheTransportError::command("READONLY")), false)]
    #[tokio::test]
    async fn delete_reports_removal(
        key: CacheKey,
        #[case] outcome: Result<u64, CacheTransportError>,
        #[case] expected: bool,
    ) {
        let mut transport = MockCacheTransport::new();
        transport
            .expect_delete()
            .return_once(move |_| outcome);
        let cache = FailOpenCache::new(Arc::new(transport));

        assert_eq!(cache.delete(&key).await, expected);
    }

    #[rstest]
    #[tokio::test]
    async fn exists_is_false_on_transport_failure(key: CacheKey) {
        let mut transport = MockCacheTransport::new();
        transport.expect_exists().returning(|_| Err(refused()));
        let cache = FailOpenCache::new(Arc::new(transport));

        assert!(!cache.exists(&key).await);
    }

    #[rstest]
    #[tokio::test]
    async fn metrics_failures_do_not_leak(key: CacheKey) {
        let mut transport = MockCacheTransport::new();
        transport.expect_get().returning(|_| Ok(None));
        let mut metrics = MockCacheMetrics::new();
        metrics
            .expect_record_miss()
            .returning(|_| Err(crate::domain::ports::CacheMetricsError::export("down")));
        let cache = FailOpenCache::new(Arc::new(transport)).with_metrics(Arc::new(metrics));

        assert_eq!(cache.get::<Stat>(&key).await, None);
    }
}

//! In-memory cache transport and recording metrics.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::{
    CacheKey, CacheMetrics, CacheMetricsError, CacheOperation, CacheTransport,
    CacheTransportError,
};

/// Cache transport double. Entries never expire; the requested TTL is kept
/// for inspection.
#[derive(Default)]
pub struct InMemoryCacheTransport {
    entries: Mutex<BTreeMap<String, (String, Option<Duration>)>>,
    unavailable: AtomicBool,
}

impl InMemoryCacheTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Raw stored value and TTL for `key`.
    pub fn entry(&self, key: &str) -> Option<(String, Option<Duration>)> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, (String, Option<Duration>)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), CacheTransportError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CacheTransportError::connection("connection refused"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheTransport for InMemoryCacheTransport {
    async fn set(
        &self,
        key: &CacheKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), CacheTransportError> {
        self.check()?;
        self.lock()
            .insert(key.as_str().to_owned(), (value.to_owned(), ttl));
        Ok(())
    }

    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheTransportError> {
        self.check()?;
        Ok(self.lock().get(key.as_str()).map(|(value, _)| value.clone()))
    }

    async fn delete(&self, key: &CacheKey) -> Result<u64, CacheTransportError> {
        self.check()?;
        Ok(u64::from(self.lock().remove(key.as_str()).is_some()))
    }

    async fn exists(&self, key: &CacheKey) -> Result<bool, CacheTransportError> {
        self.check()?;
        Ok(self.lock().contains_key(key.as_str()))
    }
}

/// One observation reported to [`RecordingCacheMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Hit(String),
    Miss(String),
    Failure { operation: CacheOperation, key: String },
}

/// Metrics double that keeps every event in order.
#[derive(Default)]
pub struct RecordingCacheMetrics {
    events: Mutex<Vec<CacheEvent>>,
}

impl RecordingCacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CacheEvent> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CacheEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CacheMetrics for RecordingCacheMetrics {
    async fn record_hit(&self, key: &str) -> Result<(), CacheMetricsError> {
        self.lock().push(CacheEvent::Hit(key.to_owned()));
        Ok(())
    }

    async fn record_miss(&self, key: &str) -> Result<(), CacheMetricsError> {
        self.lock().push(CacheEvent::Miss(key.to_owned()));
        Ok(())
    }

    async fn record_failure(
        &self,
        operation: CacheOperation,
        key: &str,
        _message: &str,
    ) -> Result<(), CacheMetricsError> {
        self.lock().push(CacheEvent::Failure {
            operation,
            key: key.to_owned(),
        });
        Ok(())
    }
}

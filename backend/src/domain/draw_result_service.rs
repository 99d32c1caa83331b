//! Lottery result ingestion and cached statistics.
//!
//! Results are validated as a batch before any write, then saved
//! concurrently; the first failed save fails the batch, but saves already
//! sent are not rolled back. Statistics are opaque JSON documents computed
//! elsewhere and kept only in the cache under the six [`StatsKey`]s.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::future::{join_all, try_join_all};
use mockable::Clock;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::domain::ports::{DrawResultRepository, StatsKey};
use crate::domain::{DomainError, DrawResult, DrawResultDraft, ErrorKind, FailOpenCache};

/// Statistics documents keyed by their logical cache key.
pub type StatsSnapshot = BTreeMap<StatsKey, Value>;

/// Domain service for draw results.
#[derive(Clone)]
pub struct DrawResultService<R> {
    results: Arc<R>,
    clock: Arc<dyn Clock>,
    stats_cache: Option<FailOpenCache>,
}

impl<R> DrawResultService<R> {
    pub fn new(results: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            results,
            clock,
            stats_cache: None,
        }
    }

    /// Enable [`DrawResultService::save_stats`] and
    /// [`DrawResultService::analysis`].
    pub fn with_stats_cache(mut self, cache: FailOpenCache) -> Self {
        self.stats_cache = Some(cache);
        self
    }

    fn stats_cache(&self) -> Result<&FailOpenCache, DomainError> {
        self.stats_cache
            .as_ref()
            .ok_or_else(|| DomainError::configuration("statistics cache is not configured"))
    }

    /// Write each provided statistics document to the cache.
    ///
    /// Keys not in `stats` are left untouched. Cache failures are swallowed.
    pub async fn save_stats(&self, stats: &StatsSnapshot) -> Result<(), DomainError> {
        let cache = self.stats_cache()?;
        join_all(
            stats
                .iter()
                .map(|(key, value)| async move { cache.set(&key.cache_key(), value, None).await }),
        )
        .await;
        info!(keys = stats.len(), "statistics cached");
        Ok(())
    }

    /// Read every statistics document back; missing keys are absent.
    pub async fn analysis(&self) -> Result<StatsSnapshot, DomainError> {
        let cache = self.stats_cache()?;
        let values = join_all(StatsKey::ALL.into_iter().map(|key| async move {
            let value: Option<Value> = cache.get(&key.cache_key()).await;
            value.map(|value| (key, value))
        }))
        .await;
        Ok(values.into_iter().flatten().collect())
    }
}

impl<R: DrawResultRepository> DrawResultService<R> {
    /// Validate and store a batch of drafts, assigning fresh ids.
    pub async fn save_results(
        &self,
        drafts: Vec<DrawResultDraft>,
    ) -> Result<Vec<DrawResult>, DomainError> {
        let now = self.clock.utc();
        let results = drafts
            .into_iter()
            .map(|draft| DrawResult::from_draft(draft, Uuid::new_v4().to_string(), now))
            .collect::<Result<Vec<_>, _>>()?;
        let saved = try_join_all(results.iter().map(|result| self.results.save(result))).await?;
        info!(count = saved.len(), "draw results saved");
        Ok(saved)
    }

    /// The result with the highest contest number.
    pub async fn latest_result(&self) -> Result<DrawResult, DomainError> {
        self.results
            .latest()
            .await?
            .ok_or_else(|| DomainError::new(ErrorKind::NotFound, "No results found"))
    }
}

#[cfg(test)]
#[path = "draw_result_service_tests.rs"]
mod tests;

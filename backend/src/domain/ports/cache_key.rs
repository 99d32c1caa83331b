//! Keys for cached statistics documents.
//!
//! A statistics document is stored in the cache under its logical name
//! (`frequency_stats`, `last_results`, ...). Keys are written verbatim to the
//! cache server, so they carry no whitespace or control characters anywhere.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name under which one statistics document is cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        let raw = value.into();
        if raw.is_empty() {
            return Err(CacheKeyValidationError::Blank);
        }
        if let Some(character) = raw
            .chars()
            .find(|c| c.is_whitespace() || c.is_control())
        {
            return Err(CacheKeyValidationError::UnprintableCharacter { character });
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for CacheKey {
    type Error = CacheKeyValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Reasons a string cannot name a cached statistics document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    #[error("statistics cache key is blank")]
    Blank,
    #[error("statistics cache key contains unprintable character {character:?}")]
    UnprintableCharacter { character: char },
}

/// The six logical keys under which draw statistics are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsKey {
    FrequencyStats,
    CompanionStats,
    LastResults,
    AverageGapStats,
    SimplePredictions,
    TrainedPredictions,
}

impl StatsKey {
    /// Every statistics key, in a stable order.
    pub const ALL: [Self; 6] = [
        Self::FrequencyStats,
        Self::CompanionStats,
        Self::LastResults,
        Self::AverageGapStats,
        Self::SimplePredictions,
        Self::TrainedPredictions,
    ];

    /// Stored key text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FrequencyStats => "frequency_stats",
            Self::CompanionStats => "companion_stats",
            Self::LastResults => "last_results",
            Self::AverageGapStats => "average_gap_stats",
            Self::SimplePredictions => "simple_predictions",
            Self::TrainedPredictions => "trained_predictions",
        }
    }

    /// The key as a validated [`CacheKey`].
    pub fn cache_key(self) -> CacheKey {
        CacheKey(self.as_str().to_owned())
    }
}

impl std::fmt::Display for StatsKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

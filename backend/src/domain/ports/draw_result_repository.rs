//! Port abstraction for draw result persistence.
use async_trait::async_trait;

use crate::domain::{DomainError, DrawResult};

/// Entity-typed access to the draw results table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DrawResultRepository: Send + Sync {
    /// Store a result, overwriting any record with the same id.
    async fn save(&self, result: &DrawResult) -> Result<DrawResult, DomainError>;

    /// Fetch a result by id; `NotFound` when absent.
    async fn find_by_id(&self, id: &str) -> Result<DrawResult, DomainError>;

    /// The result for a contest number, if stored.
    async fn find_by_contest(&self, contest: u32) -> Result<Option<DrawResult>, DomainError>;

    /// The result with the highest contest number.
    ///
    /// Reads the whole table in one scan and picks the maximum client side.
    async fn latest(&self) -> Result<Option<DrawResult>, DomainError>;

    /// Remove a result; removing an absent result succeeds.
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}

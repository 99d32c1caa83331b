//! Port abstraction for user persistence.
use async_trait::async_trait;

use crate::domain::{DomainError, EmailAddress, User, UserId};

/// Entity-typed access to the users table.
///
/// Writes are last-write-wins; there is no optimistic concurrency check.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user, overwriting any record with the same id.
    async fn save(&self, user: &User) -> Result<User, DomainError>;

    /// Fetch a user by identifier; `NotFound` when absent.
    async fn find_by_id(&self, id: &UserId) -> Result<User, DomainError>;

    /// All users registered with `email`, through the email index.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Vec<User>, DomainError>;

    /// Write every mutable attribute and return the stored user.
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Remove a user; removing an absent user succeeds.
    async fn delete(&self, id: &UserId) -> Result<(), DomainError>;
}

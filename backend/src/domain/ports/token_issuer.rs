//! Port for issuing access tokens.
//!
//! Signing mechanics live outside the domain; services only supply claims.

use serde::Serialize;

use crate::domain::{DomainError, User};

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
}

impl From<&User> for TokenClaims {
    fn from(user: &User) -> Self {
        Self {
            sub: user.id().to_string(),
            email: user.email().to_string(),
            name: user.name().to_string(),
        }
    }
}

/// Turns claims into an opaque bearer token.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, claims: &TokenClaims) -> Result<String, DomainError>;
}

/// Deterministic issuer for tests and local tooling: `fixture.<sub>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTokenIssuer;

impl TokenIssuer for FixtureTokenIssuer {
    fn issue(&self, claims: &TokenClaims) -> Result<String, DomainError> {
        Ok(format!("fixture.{}", claims.sub))
    }
}

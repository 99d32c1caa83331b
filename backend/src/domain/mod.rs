//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed entities for users and draw results, the
//! attribute codec shared by every document-store adapter, and the services
//! that drive them through the ports in [`ports`]. Adapters live under
//! `crate::outbound`.
//!
//! Public surface:
//! - DomainError (alias to `error::DomainError`) with its `ErrorKind`.
//! - User and its validated parts (id, email, name, digest, preferences).
//! - DrawResult and the DrawResultDraft accepted by ingestion.
//! - FailOpenCache, the JSON cache facade that never fails a caller.
//! - UserService, AuthService and DrawResultService.

pub mod attribute;
pub mod auth_service;
pub mod cache;
pub mod draw_result;
pub mod draw_result_service;
pub mod error;
pub mod ports;
pub mod user;
pub mod user_service;

pub use self::auth_service::{AuthResponse, AuthService};
pub use self::cache::FailOpenCache;
pub use self::draw_result::{DrawResult, DrawResultDraft, DrawResultValidationError, PrizeTier};
pub use self::draw_result_service::{DrawResultService, StatsSnapshot};
pub use self::error::{DomainError, ErrorCode, ErrorKind};
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EmailAddress, PasswordDigest, Theme, User, UserId, UserParts,
    UserPreferences, UserValidationError,
};
pub use self::user_service::{
    CreateUserRequest, UpdatePreferencesRequest, UpdateUserRequest, UserService,
};

//! User data model.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::DomainError;

/// Validation errors raised while building user components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyEmail,
    InvalidEmail,
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
    EmptyPassword,
    PasswordHashFailed,
    MalformedPasswordDigest,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must not contain surrounding whitespace"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must look like local@domain.tld"),
            Self::EmptyDisplayName => write!(f, "name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "name must be at most {max} characters")
            }
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordHashFailed => write!(f, "password could not be hashed"),
            Self::MalformedPasswordDigest => write!(f, "stored password digest is malformed"),
        }
    }
}

impl std::error::Error for UserValidationError {}

impl From<UserValidationError> for DomainError {
    fn from(value: UserValidationError) -> Self {
        DomainError::validation(value.to_string())
    }
}

/// Stable user identifier.
///
/// New users get a UUID, but any non-empty trimmed string is accepted so
/// records created elsewhere stay addressable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Email address with a minimal shape check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let (local, domain) = email
            .split_once('@')
            .ok_or(UserValidationError::InvalidEmail)?;
        let domain_ok = domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
            && !domain.ends_with('.');
        if local.is_empty()
            || domain.contains('@')
            || !domain_ok
            || email.chars().any(char::is_whitespace)
        {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 100;

/// Human readable name for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`] from owned input.
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if display_name.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Argon2id password digest stored as a PHC string
/// (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`).
///
/// The plaintext never leaves [`PasswordDigest::derive`]. `Debug` hides the
/// digest.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Hash `plaintext` under a fresh random salt.
    pub fn derive(plaintext: &str) -> Result<Self, UserValidationError> {
        Self::derive_salted(plaintext, &SaltString::generate(&mut OsRng))
    }

    /// Hash `plaintext` under a caller-chosen salt of at least four bytes.
    pub fn derive_with_salt(plaintext: &str, salt: &str) -> Result<Self, UserValidationError> {
        let salt = SaltString::encode_b64(salt.as_bytes())
            .map_err(|_| UserValidationError::PasswordHashFailed)?;
        Self::derive_salted(plaintext, &salt)
    }

    fn derive_salted(plaintext: &str, salt: &SaltString) -> Result<Self, UserValidationError> {
        if plaintext.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        let digest = hasher()
            .hash_password(plaintext.as_bytes(), salt)
            .map_err(|_| UserValidationError::PasswordHashFailed)?;
        Ok(Self(digest.to_string()))
    }

    /// Accept a digest previously produced by [`PasswordDigest::derive`].
    pub fn from_stored(stored: impl Into<String>) -> Result<Self, UserValidationError> {
        let stored = stored.into();
        let parsed =
            PasswordHash::new(&stored).map_err(|_| UserValidationError::MalformedPasswordDigest)?;
        if parsed.algorithm != Algorithm::Argon2id.ident() || parsed.hash.is_none() {
            return Err(UserValidationError::MalformedPasswordDigest);
        }
        Ok(Self(stored))
    }

    /// Whether `plaintext` matches this digest. The comparison runs in
    /// constant time.
    pub fn verify(&self, plaintext: &str) -> bool {
        PasswordHash::new(&self.0).is_ok_and(|parsed| {
            hasher()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok()
        })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

/// Interface theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Per-user interface preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub theme: Theme,
    pub notifications: bool,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            notifications: true,
        }
    }
}

/// Every stored field of a [`User`], used to rebuild one from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserParts {
    pub id: UserId,
    pub email: EmailAddress,
    pub name: DisplayName,
    pub password: PasswordDigest,
    pub preferences: UserPreferences,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Application user.
///
/// ## Invariants
/// - Mutations refresh `updated_at`, except [`User::deactivate`], which
///   stamps `deleted_at` instead.
/// - A deactivated user keeps its record; only `is_active` and `deleted_at`
///   change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    name: DisplayName,
    password: PasswordDigest,
    preferences: UserPreferences,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build a new active user.
    pub fn register(
        id: UserId,
        email: EmailAddress,
        name: DisplayName,
        password: PasswordDigest,
        preferences: UserPreferences,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            name,
            password,
            preferences,
            is_active: true,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    pub fn password(&self) -> &PasswordDigest {
        &self.password
    }

    pub fn preferences(&self) -> UserPreferences {
        self.preferences
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn rename(&mut self, name: DisplayName, now: DateTime<Utc>) {
        self.name = name;
        self.updated_at = now;
    }

    pub fn change_email(&mut self, email: EmailAddress, now: DateTime<Utc>) {
        self.email = email;
        self.updated_at = now;
    }

    pub fn change_password(&mut self, password: PasswordDigest, now: DateTime<Utc>) {
        self.password = password;
        self.updated_at = now;
    }

    pub fn replace_preferences(&mut self, preferences: UserPreferences, now: DateTime<Utc>) {
        self.preferences = preferences;
        self.updated_at = now;
    }

    /// Mark the user active. `deleted_at` is left untouched.
    pub fn activate(&mut self, now: DateTime<Utc>) {
        self.is_active = true;
        self.updated_at = now;
    }

    /// Mark the user inactive and stamp `deleted_at`.
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.deleted_at = Some(now);
    }

    /// Mark the user active and clear `deleted_at`.
    pub fn reactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = true;
        self.deleted_at = None;
        self.updated_at = now;
    }

    pub fn into_parts(self) -> UserParts {
        UserParts {
            id: self.id,
            email: self.email,
            name: self.name,
            password: self.password,
            preferences: self.preferences,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

impl From<UserParts> for User {
    fn from(parts: UserParts) -> Self {
        Self {
            id: parts.id,
            email: parts.email,
            name: parts.name,
            password: parts.password,
            preferences: parts.preferences,
            is_active: parts.is_active,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
            deleted_at: parts.deleted_at,
        }
    }
}

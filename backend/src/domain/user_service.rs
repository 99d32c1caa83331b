//! User lifecycle service.
//!
//! Every mutation is a read-modify-write against [`UserRepository`]; there is
//! no optimistic concurrency, so concurrent writers are last-write-wins.

use std::sync::Arc;

use mockable::Clock;
use serde::Deserialize;
use tracing::info;

use crate::domain::ports::UserRepository;
use crate::domain::{
    DisplayName, DomainError, EmailAddress, ErrorKind, PasswordDigest, Theme, User, UserId,
    UserPreferences,
};

/// Input for [`UserService::create`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub preferences: Option<UserPreferences>,
}

/// Input for [`UserService::update`]; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Partial preferences merged into the current ones.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub theme: Option<Theme>,
    pub notifications: Option<bool>,
}

/// Domain service for user records.
#[derive(Clone)]
pub struct UserService<R> {
    users: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> UserService<R> {
    pub fn new(users: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }
}

impl<R: UserRepository> UserService<R> {
    /// Register a new active user with a fresh id and hashed password.
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        let user = User::register(
            UserId::random(),
            EmailAddress::new(request.email)?,
            DisplayName::new(request.name)?,
            PasswordDigest::derive(&request.password)?,
            request.preferences.unwrap_or_default(),
            self.clock.utc(),
        );
        let saved = self.users.save(&user).await?;
        info!(user_id = %saved.id(), "user created");
        Ok(saved)
    }

    pub async fn find_one(&self, id: &UserId) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await
            .map_err(|err| with_not_found_message(err, format!("User with ID {id} not found")))
    }

    /// First user registered with `email`.
    pub async fn find_by_email(&self, email: &str) -> Result<User, DomainError> {
        let not_found = || {
            DomainError::not_found("User").with_details(serde_json::json!({ "email": email }))
        };
        let Ok(address) = EmailAddress::new(email) else {
            return Err(not_found());
        };
        self.users
            .find_by_email(&address)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                with_not_found_message(not_found(), format!("User with email {email} not found"))
            })
    }

    pub async fn update(
        &self,
        id: &UserId,
        request: UpdateUserRequest,
    ) -> Result<User, DomainError> {
        let mut user = self.find_one(id).await?;
        let now = self.clock.utc();
        if let Some(email) = request.email {
            user.change_email(EmailAddress::new(email)?, now);
        }
        if let Some(name) = request.name {
            user.rename(DisplayName::new(name)?, now);
        }
        if let Some(password) = request.password {
            user.change_password(PasswordDigest::derive(&password)?, now);
        }
        self.users.update(&user).await
    }

    pub async fn update_preferences(
        &self,
        id: &UserId,
        request: UpdatePreferencesRequest,
    ) -> Result<User, DomainError> {
        let mut user = self.find_one(id).await?;
        let current = user.preferences();
        let merged = UserPreferences {
            theme: request.theme.unwrap_or(current.theme),
            notifications: request.notifications.unwrap_or(current.notifications),
        };
        user.replace_preferences(merged, self.clock.utc());
        self.users.update(&user).await
    }

    /// Delete an existing user; `NotFound` when absent.
    pub async fn remove(&self, id: &UserId) -> Result<(), DomainError> {
        self.find_one(id).await?;
        self.users.delete(id).await?;
        info!(user_id = %id, "user removed");
        Ok(())
    }

    pub async fn deactivate(&self, id: &UserId) -> Result<User, DomainError> {
        let mut user = self.find_one(id).await?;
        user.deactivate(self.clock.utc());
        self.users.update(&user).await
    }

    pub async fn activate(&self, id: &UserId) -> Result<User, DomainError> {
        let mut user = self.find_one(id).await?;
        user.activate(self.clock.utc());
        self.users.update(&user).await
    }
}

fn with_not_found_message(err: DomainError, message: String) -> DomainError {
    if err.kind() != ErrorKind::NotFound {
        return err;
    }
    let mut replaced = DomainError::new(ErrorKind::NotFound, message);
    if let Some(resource) = err.resource() {
        replaced = replaced.with_resource(resource);
    }
    if let Some(details) = err.details() {
        replaced = replaced.with_details(details.clone());
    }
    replaced
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;

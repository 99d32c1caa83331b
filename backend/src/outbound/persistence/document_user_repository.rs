//! Document-store-backed `UserRepository` implementation.
//!
//! Updates rewrite every mutable attribute in one `SET` expression, so the
//! stored record always matches the entity handed in. Updates never create a
//! user; updating one that has been deleted is `NotFound`. There is no version
//! check; concurrent updates are last-write-wins.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{DocumentStore, QueryRequest, UpdateRequest, UserRepository};
use crate::domain::{DomainError, EmailAddress, User, UserId};

use super::table::Table;
use super::user_mapper::{
    DELETED_AT, EMAIL, IS_ACTIVE, NAME, PASSWORD, PREFERENCES, UPDATED_AT, UserMapper,
    preferences_value,
};

const SET_MUTABLE: &str = "SET #name = :name, #email = :email, #password = :password, \
     #isActive = :isActive, #preferences = :preferences, #updatedAt = :updatedAt";

/// `UserRepository` over a [`DocumentStore`] table.
#[derive(Clone)]
pub struct DocumentUserRepository {
    table: Table<UserMapper>,
    email_index: String,
}

impl DocumentUserRepository {
    /// Bind the repository to `table`, looking up emails through `email_index`.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        table: impl Into<String>,
        email_index: impl Into<String>,
    ) -> Self {
        Self {
            table: Table::new(store, table),
            email_index: email_index.into(),
        }
    }
}

fn update_request(user: &User) -> Result<UpdateRequest, DomainError> {
    let expression = match user.deleted_at() {
        Some(_) => format!("{SET_MUTABLE}, #deletedAt = :deletedAt"),
        None => format!("{SET_MUTABLE} REMOVE #deletedAt"),
    };
    let mut request = UpdateRequest::new(expression)
        .name("#name", NAME)
        .name("#email", EMAIL)
        .name("#password", PASSWORD)
        .name("#isActive", IS_ACTIVE)
        .name("#preferences", PREFERENCES)
        .name("#updatedAt", UPDATED_AT)
        .name("#deletedAt", DELETED_AT)
        .value(":name", user.name().to_string())
        .value(":email", user.email().to_string())
        .value(":password", user.password().as_str())
        .value(":isActive", user.is_active())
        .value(":preferences", preferences_value(user)?)
        .value(":updatedAt", user.updated_at());
    if let Some(deleted_at) = user.deleted_at() {
        request = request.value(":deletedAt", deleted_at);
    }
    Ok(request)
}

#[async_trait]
impl UserRepository for DocumentUserRepository {
    async fn save(&self, user: &User) -> Result<User, DomainError> {
        self.table.put(user).await?;
        debug!(user_id = %user.id(), "user stored");
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<User, DomainError> {
        self.table.get(id.as_ref()).await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Vec<User>, DomainError> {
        let request = QueryRequest::new("#email = :email")
            .name("#email", EMAIL)
            .value(":email", email.to_string())
            .index(self.email_index.clone());
        self.table.query(&request).await
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let request = update_request(user)?;
        let stored = self.table.update(user.id().as_ref(), &request).await?;
        debug!(user_id = %user.id(), "user updated");
        Ok(stored)
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        self.table.delete(id.as_ref()).await
    }
}

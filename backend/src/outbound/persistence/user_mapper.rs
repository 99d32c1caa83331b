//! Stored layout of [`User`] records.
//!
//! ```text
//! id, email, name, password      strings
//! preferences                    map { theme, notifications }
//! isActive                       boolean
//! createdAt, updatedAt           ISO-8601 strings
//! deletedAt                      ISO-8601 string, absent while active
//! ```

use crate::domain::attribute::{Item, NativeValue, from_native, to_native};
use crate::domain::{
    DisplayName, DomainError, EmailAddress, PasswordDigest, User, UserId, UserParts,
};

use super::item_fields::{boolean, field, optional_timestamp, string, timestamp};
use super::table::{ID_ATTRIBUTE, ItemMapper};

pub(crate) const EMAIL: &str = "email";
pub(crate) const NAME: &str = "name";
pub(crate) const PASSWORD: &str = "password";
pub(crate) const PREFERENCES: &str = "preferences";
pub(crate) const IS_ACTIVE: &str = "isActive";
pub(crate) const CREATED_AT: &str = "createdAt";
pub(crate) const UPDATED_AT: &str = "updatedAt";
pub(crate) const DELETED_AT: &str = "deletedAt";

pub(crate) struct UserMapper;

impl ItemMapper for UserMapper {
    type Entity = User;

    const RESOURCE: &'static str = "User";

    fn to_item(user: &User) -> Result<Item, DomainError> {
        let mut item = Item::new();
        item.insert(ID_ATTRIBUTE.to_owned(), user.id().to_string().into());
        item.insert(EMAIL.to_owned(), user.email().to_string().into());
        item.insert(NAME.to_owned(), user.name().to_string().into());
        item.insert(PASSWORD.to_owned(), user.password().as_str().into());
        item.insert(PREFERENCES.to_owned(), to_native(&user.preferences())?);
        item.insert(IS_ACTIVE.to_owned(), user.is_active().into());
        item.insert(CREATED_AT.to_owned(), user.created_at().into());
        item.insert(UPDATED_AT.to_owned(), user.updated_at().into());
        if let Some(deleted_at) = user.deleted_at() {
            item.insert(DELETED_AT.to_owned(), deleted_at.into());
        }
        Ok(item)
    }

    fn from_item(item: &Item) -> Result<User, DomainError> {
        let parts = UserParts {
            id: UserId::new(string(item, ID_ATTRIBUTE)?)?,
            email: EmailAddress::new(string(item, EMAIL)?)?,
            name: DisplayName::new(string(item, NAME)?)?,
            password: PasswordDigest::from_stored(string(item, PASSWORD)?)?,
            preferences: from_native(field(item, PREFERENCES)?)?,
            is_active: boolean(item, IS_ACTIVE)?,
            created_at: timestamp(item, CREATED_AT)?,
            updated_at: timestamp(item, UPDATED_AT)?,
            deleted_at: optional_timestamp(item, DELETED_AT)?,
        };
        Ok(User::from(parts))
    }
}

/// Preferences as stored, for update expressions.
pub(crate) fn preferences_value(user: &User) -> Result<NativeValue, DomainError> {
    Ok(to_native(&user.preferences())?)
}

//! One logical table bound to an entity mapper.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::domain::{DomainError, ErrorKind};
use crate::domain::attribute::Item;
use crate::domain::ports::{DocumentStore, QueryRequest, ScanRequest, UpdateRequest};

/// Primary key attribute shared by every table.
pub(crate) const ID_ATTRIBUTE: &str = "id";

/// Translation between an entity and its stored item.
pub(crate) trait ItemMapper {
    type Entity;

    /// Resource name used in `NotFound` errors.
    const RESOURCE: &'static str;

    fn to_item(entity: &Self::Entity) -> Result<Item, DomainError>;

    fn from_item(item: &Item) -> Result<Self::Entity, DomainError>;
}

/// Name placeholder bound to [`ID_ATTRIBUTE`] in update conditions.
const ID_PLACEHOLDER: &str = "#id";

pub(crate) fn id_key(id: &str) -> Item {
    Item::from([(ID_ATTRIBUTE.to_owned(), id.into())])
}

/// Entity-typed operations against one table.
pub(crate) struct Table<M> {
    store: Arc<dyn DocumentStore>,
    name: String,
    mapper: PhantomData<fn() -> M>,
}

impl<M> Clone for Table<M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            name: self.name.clone(),
            mapper: PhantomData,
        }
    }
}

impl<M: ItemMapper> Table<M> {
    pub(crate) fn new(store: Arc<dyn DocumentStore>, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            mapper: PhantomData,
        }
    }

    pub(crate) async fn put(&self, entity: &M::Entity) -> Result<(), DomainError> {
        let item = M::to_item(entity)?;
        self.store.put(&self.name, &item).await
    }

    pub(crate) async fn find(&self, id: &str) -> Result<Option<M::Entity>, DomainError> {
        self.store
            .get(&self.name, &id_key(id))
            .await?
            .as_ref()
            .map(M::from_item)
            .transpose()
    }

    /// Like [`Table::find`], but absence is `NotFound`.
    pub(crate) async fn get(&self, id: &str) -> Result<M::Entity, DomainError> {
        self.find(id)
            .await?
            .ok_or_else(|| DomainError::not_found(M::RESOURCE))
    }

    pub(crate) async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.store.delete(&self.name, &id_key(id)).await
    }

    pub(crate) async fn query(&self, request: &QueryRequest) -> Result<Vec<M::Entity>, DomainError> {
        self.store
            .query(&self.name, request)
            .await?
            .iter()
            .map(M::from_item)
            .collect()
    }

    pub(crate) async fn scan(&self, request: &ScanRequest) -> Result<Vec<M::Entity>, DomainError> {
        self.store
            .scan(&self.name, request)
            .await?
            .iter()
            .map(M::from_item)
            .collect()
    }

    /// Update an existing item. The store is told to apply the request only
    /// while the item exists, so an update that races a delete is `NotFound`
    /// rather than recreating a partial item.
    pub(crate) async fn update(
        &self,
        id: &str,
        request: &UpdateRequest,
    ) -> Result<M::Entity, DomainError> {
        let guarded = request
            .clone()
            .condition(format!("attribute_exists({ID_PLACEHOLDER})"))
            .name(ID_PLACEHOLDER, ID_ATTRIBUTE);
        let item = self
            .store
            .update(&self.name, &id_key(id), &guarded)
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::Conflict => DomainError::not_found(M::RESOURCE),
                _ => err,
            })?;
        M::from_item(&item)
    }
}

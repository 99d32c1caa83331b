//! Port for the schemaless document store.
//!
//! Adapters own the transport connection, translate items through the
//! attribute codec and normalise every failure into a [`DomainError`].
//! Expressions and their placeholders are passed to the store unchanged.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::attribute::{Item, NativeValue};

/// Expression placeholder maps shared by query, scan and update requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionParams {
    /// `:placeholder` to value.
    pub values: Item,
    /// `#placeholder` to attribute name.
    pub names: BTreeMap<String, String>,
}

impl ExpressionParams {
    /// Check placeholder prefixes before any I/O.
    ///
    /// # Examples
    /// ```
    /// use lottery_backend::domain::ports::ExpressionParams;
    ///
    /// let mut params = ExpressionParams::default();
    /// params.values.insert("email".into(), "a@b.c".into());
    /// assert!(params.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(bad) = self.values.keys().find(|key| !is_placeholder(key, ':')) {
            return Err(DomainError::invalid_input(format!(
                "value placeholder `{bad}` must start with `:`"
            )));
        }
        if let Some(bad) = self.names.keys().find(|key| !is_placeholder(key, '#')) {
            return Err(DomainError::invalid_input(format!(
                "name placeholder `{bad}` must start with `#`"
            )));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.names.is_empty()
    }
}

fn is_placeholder(key: &str, prefix: char) -> bool {
    key.strip_prefix(prefix).is_some_and(|rest| !rest.is_empty())
}

/// Key-condition query against a table or one of its indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub key_condition: String,
    pub params: ExpressionParams,
    pub filter: Option<String>,
    pub index: Option<String>,
    pub limit: Option<u32>,
    /// `false` returns items in descending sort-key order.
    pub scan_forward: bool,
}

impl QueryRequest {
    pub fn new(key_condition: impl Into<String>) -> Self {
        Self {
            key_condition: key_condition.into(),
            params: ExpressionParams::default(),
            filter: None,
            index: None,
            limit: None,
            scan_forward: true,
        }
    }

    pub fn value(mut self, placeholder: impl Into<String>, value: impl Into<NativeValue>) -> Self {
        self.params.values.insert(placeholder.into(), value.into());
        self
    }

    pub fn name(mut self, placeholder: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.params.names.insert(placeholder.into(), attribute.into());
        self
    }

    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.filter = Some(expression.into());
        self
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn scan_forward(mut self, forward: bool) -> Self {
        self.scan_forward = forward;
        self
    }
}

/// Full-table scan, optionally filtered. Results are unordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRequest {
    pub filter: Option<String>,
    pub params: ExpressionParams,
    pub limit: Option<u32>,
}

impl ScanRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, expression: impl Into<String>) -> Self {
        self.filter = Some(expression.into());
        self
    }

    pub fn value(mut self, placeholder: impl Into<String>, value: impl Into<NativeValue>) -> Self {
        self.params.values.insert(placeholder.into(), value.into());
        self
    }

    pub fn name(mut self, placeholder: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.params.names.insert(placeholder.into(), attribute.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Update expression applied to a single item, optionally guarded by a
/// condition such as `attribute_exists(#id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub expression: String,
    pub condition: Option<String>,
    pub params: ExpressionParams,
}

impl UpdateRequest {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            condition: None,
            params: ExpressionParams::default(),
        }
    }

    /// Apply the update only when `expression` holds for the stored item.
    /// A failed condition is a `Conflict`.
    pub fn condition(mut self, expression: impl Into<String>) -> Self {
        self.condition = Some(expression.into());
        self
    }

    pub fn value(mut self, placeholder: impl Into<String>, value: impl Into<NativeValue>) -> Self {
        self.params.values.insert(placeholder.into(), value.into());
        self
    }

    pub fn name(mut self, placeholder: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.params.names.insert(placeholder.into(), attribute.into());
        self
    }
}

/// Item-level operations against named tables.
///
/// No operation retries internally; throttling surfaces as a retryable
/// [`DomainError`]. Dropping a returned future abandons only that request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one item by primary key; `None` when absent.
    async fn get(&self, table: &str, key: &Item) -> Result<Option<Item>, DomainError>;

    /// Write the item, overwriting any item with the same key.
    async fn put(&self, table: &str, item: &Item) -> Result<(), DomainError>;

    /// Remove the item; removing an absent item succeeds.
    async fn delete(&self, table: &str, key: &Item) -> Result<(), DomainError>;

    /// Items matching a key condition, in sort-key order.
    async fn query(&self, table: &str, request: &QueryRequest) -> Result<Vec<Item>, DomainError>;

    /// Every item in the table matching the optional filter.
    async fn scan(&self, table: &str, request: &ScanRequest) -> Result<Vec<Item>, DomainError>;

    /// Apply an update expression and return all attributes of the updated item.
    ///
    /// Without a condition an absent item is created from the key.
    async fn update(
        &self,
        table: &str,
        key: &Item,
        request: &UpdateRequest,
    ) -> Result<Item, DomainError>;
}

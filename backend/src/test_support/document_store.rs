//! In-memory [`DocumentStore`] for repository and service tests.
//!
//! Items are held in wire form, so every write and read goes through the
//! attribute codec exactly as it would against the real store. Expressions
//! support the subset the repositories use:
//!
//! - conditions: `attr = :value` clauses joined by `AND`;
//! - updates: `SET attr = :value, ...` optionally followed by
//!   `REMOVE attr, ...`;
//! - update conditions: `attribute_exists(attr)` and
//!   `attribute_not_exists(attr)`.
//!
//! Attribute names may be literal or `#placeholder` references. Anything else
//! fails the way the store rejects malformed expressions.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::DomainError;
use crate::domain::attribute::{
    Item, WireItem, WireValue, decode_item, encode, encode_item,
};
use crate::domain::ports::{
    DocumentStore, ExpressionParams, QueryRequest, ScanRequest, UpdateRequest,
};
use crate::outbound::dynamodb::{StoreFailure, classify};

const DEFAULT_KEY: &str = "id";

type Rows = BTreeMap<String, WireItem>;

#[derive(Default)]
struct State {
    keys: BTreeMap<String, Vec<String>>,
    tables: BTreeMap<String, Rows>,
    failures: Vec<StoreFailure>,
}

/// Document store double holding tables in memory.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    state: Mutex<State>,
    scans: AtomicUsize,
    queries: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the primary key attributes of `table`; undeclared tables are
    /// keyed by `id`.
    pub fn with_table(self, table: &str, key_attributes: &[&str]) -> Self {
        self.lock().keys.insert(
            table.to_owned(),
            key_attributes.iter().map(|name| (*name).to_owned()).collect(),
        );
        self
    }

    /// Fail the next operation with `failure`, classified as the real client
    /// would. Queued failures are consumed in order.
    pub fn fail_next(&self, failure: StoreFailure) {
        self.lock().failures.push(failure);
    }

    /// Number of scan requests served.
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Number of query requests served.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of items currently stored in `table`.
    pub fn item_count(&self, table: &str) -> usize {
        self.lock().tables.get(table).map_or(0, BTreeMap::len)
    }

    /// Raw wire items of `table`, in key order.
    pub fn wire_items(&self, table: &str) -> Vec<WireItem> {
        self.lock()
            .tables
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the state, surfacing any queued failure first.
    fn begin(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        let mut state = self.lock();
        if state.failures.is_empty() {
            Ok(state)
        } else {
            let failure = state.failures.remove(0);
            Err(classify(&failure))
        }
    }
}

impl State {
    fn key_attributes(&self, table: &str) -> Vec<String> {
        self.keys
            .get(table)
            .cloned()
            .unwrap_or_else(|| vec![DEFAULT_KEY.to_owned()])
    }

    fn row_key(&self, table: &str, item: &WireItem) -> Result<String, DomainError> {
        self.key_attributes(table)
            .iter()
            .map(|name| {
                item.get(name)
                    .map(|value| value.to_tagged_json().to_string())
                    .ok_or_else(|| {
                        rejected(format!("missing key attribute `{name}` for table {table}"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|parts| parts.join("|"))
    }
}

fn rejected(message: impl Into<String>) -> DomainError {
    classify(&StoreFailure::new("ValidationException", message))
}

fn decode(item: &WireItem) -> Result<Item, DomainError> {
    Ok(decode_item(item)?)
}

fn attribute_name<'a>(token: &'a str, params: &'a ExpressionParams) -> Result<&'a str, DomainError> {
    if token.starts_with('#') {
        params
            .names
            .get(token)
            .map(String::as_str)
            .ok_or_else(|| rejected(format!("undefined name placeholder {token}")))
    } else if token.is_empty() || token.contains(char::is_whitespace) {
        Err(rejected(format!("invalid attribute name `{token}`")))
    } else {
        Ok(token)
    }
}

fn placeholder_value(token: &str, params: &ExpressionParams) -> Result<WireValue, DomainError> {
    params
        .values
        .get(token)
        .map(encode)
        .ok_or_else(|| rejected(format!("undefined value placeholder {token}")))
}

/// Parse `a = :x AND #b = :y` into attribute/value pairs.
fn equalities(
    expression: &str,
    params: &ExpressionParams,
) -> Result<Vec<(String, WireValue)>, DomainError> {
    expression
        .split(" AND ")
        .map(|clause| {
            let (lhs, rhs) = clause
                .split_once('=')
                .ok_or_else(|| rejected(format!("unsupported condition `{clause}`")))?;
            let name = attribute_name(lhs.trim(), params)?;
            let value = placeholder_value(rhs.trim(), params)?;
            Ok((name.to_owned(), value))
        })
        .collect()
}

fn matches(item: &WireItem, conditions: &[(String, WireValue)]) -> bool {
    conditions
        .iter()
        .all(|(name, expected)| item.get(name) == Some(expected))
}

fn select(
    rows: Option<&Rows>,
    conditions: &[(String, WireValue)],
    filter: &[(String, WireValue)],
) -> Vec<WireItem> {
    rows.into_iter()
        .flat_map(BTreeMap::values)
        .filter(|item| matches(item, conditions) && matches(item, filter))
        .cloned()
        .collect()
}

fn finish(mut items: Vec<WireItem>, limit: Option<u32>) -> Result<Vec<Item>, DomainError> {
    if let Some(limit) = limit.and_then(|limit| usize::try_from(limit).ok()) {
        items.truncate(limit);
    }
    items.iter().map(decode).collect()
}

/// Evaluate an update condition against the stored item, if any.
fn condition_holds(
    item: Option<&WireItem>,
    condition: &str,
    params: &ExpressionParams,
) -> Result<bool, DomainError> {
    let condition = condition.trim();
    let (negated, operand) = if let Some(rest) = condition.strip_prefix("attribute_exists(") {
        (false, rest)
    } else if let Some(rest) = condition.strip_prefix("attribute_not_exists(") {
        (true, rest)
    } else {
        return Err(rejected(format!("unsupported condition `{condition}`")));
    };
    let token = operand
        .strip_suffix(')')
        .ok_or_else(|| rejected(format!("unsupported condition `{condition}`")))?;
    let name = attribute_name(token.trim(), params)?;
    let present = item.is_some_and(|item| item.contains_key(name));
    Ok(present != negated)
}

fn apply_update(
    item: &mut WireItem,
    expression: &str,
    params: &ExpressionParams,
) -> Result<(), DomainError> {
    let expression = expression.trim();
    let (set_part, remove_part) = match expression.split_once("REMOVE ") {
        Some((set_part, remove_part)) => (set_part.trim(), Some(remove_part)),
        None => (expression, None),
    };
    if !set_part.is_empty() {
        let assignments = set_part
            .strip_prefix("SET ")
            .ok_or_else(|| rejected(format!("unsupported update expression `{expression}`")))?;
        for assignment in assignments.split(',') {
            let (lhs, rhs) = assignment
                .split_once('=')
                .ok_or_else(|| rejected(format!("unsupported assignment `{assignment}`")))?;
            let name = attribute_name(lhs.trim(), params)?;
            item.insert(name.to_owned(), placeholder_value(rhs.trim(), params)?);
        }
    }
    for token in remove_part.into_iter().flat_map(|names| names.split(',')) {
        item.remove(attribute_name(token.trim(), params)?);
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, table: &str, key: &Item) -> Result<Option<Item>, DomainError> {
        let state = self.begin()?;
        let row_key = state.row_key(table, &encode_item(key))?;
        state
            .tables
            .get(table)
            .and_then(|rows| rows.get(&row_key))
            .map(decode)
            .transpose()
    }

    async fn put(&self, table: &str, item: &Item) -> Result<(), DomainError> {
        let mut state = self.begin()?;
        let wire = encode_item(item);
        let row_key = state.row_key(table, &wire)?;
        state
            .tables
            .entry(table.to_owned())
            .or_default()
            .insert(row_key, wire);
        Ok(())
    }

    async fn delete(&self, table: &str, key: &Item) -> Result<(), DomainError> {
        let mut state = self.begin()?;
        let row_key = state.row_key(table, &encode_item(key))?;
        if let Some(rows) = state.tables.get_mut(table) {
            rows.remove(&row_key);
        }
        Ok(())
    }

    async fn query(&self, table: &str, request: &QueryRequest) -> Result<Vec<Item>, DomainError> {
        request.params.validate()?;
        let state = self.begin()?;
        self.queries.fetch_add(1, Ordering::SeqCst);
        let conditions = equalities(&request.key_condition, &request.params)?;
        let filter = match &request.filter {
            Some(filter) => equalities(filter, &request.params)?,
            None => Vec::new(),
        };
        let mut items = select(state.tables.get(table), &conditions, &filter);
        if !request.scan_forward {
            items.reverse();
        }
        finish(items, request.limit)
    }

    async fn scan(&self, table: &str, request: &ScanRequest) -> Result<Vec<Item>, DomainError> {
        request.params.validate()?;
        let state = self.begin()?;
        self.scans.fetch_add(1, Ordering::SeqCst);
        let filter = match &request.filter {
            Some(filter) => equalities(filter, &request.params)?,
            None => Vec::new(),
        };
        finish(select(state.tables.get(table), &[], &filter), request.limit)
    }

    async fn update(
        &self,
        table: &str,
        key: &Item,
        request: &UpdateRequest,
    ) -> Result<Item, DomainError> {
        request.params.validate()?;
        let mut state = self.begin()?;
        let wire_key = encode_item(key);
        let row_key = state.row_key(table, &wire_key)?;
        let rows = state.tables.entry(table.to_owned()).or_default();
        let stored = rows.get(&row_key);
        let allowed = match &request.condition {
            Some(condition) => condition_holds(stored, condition, &request.params)?,
            None => true,
        };
        if !allowed {
            return Err(classify(&StoreFailure::new(
                "ConditionalCheckFailedException",
                "The conditional request failed",
            )));
        }
        let mut item = stored.cloned().unwrap_or(wire_key);
        apply_update(&mut item, &request.expression, &request.params)?;
        rows.insert(row_key, item.clone());
        decode(&item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use crate::domain::attribute::NativeValue;
    use rstest::{fixture, rstest};

    fn item(id: &str, email: &str) -> Item {
        Item::from([
            ("id".to_owned(), NativeValue::from(id)),
            ("email".to_owned(), NativeValue::from(email)),
        ])
    }

    fn key(id: &str) -> Item {
        Item::from([("id".to_owned(), NativeValue::from(id))])
    }

    #[fixture]
    fn store() -> InMemoryDocumentStore {
        InMemoryDocumentStore::new()
    }

    #[rstest]
    #[tokio::test]
    async fn put_then_get_round_trips(store: InMemoryDocumentStore) {
        store.put("users", &item("1", "a@x.io")).await.expect("put");
        let found = store.get("users", &key("1")).await.expect("get");
        assert_eq!(found, Some(item("1", "a@x.io")));
        assert_eq!(store.get("users", &key("2")).await.expect("get"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn query_matches_named_equalities(store: InMemoryDocumentStore) {
        store.put("users", &item("1", "a@x.io")).await.expect("put");
        store.put("users", &item("2", "b@x.io")).await.expect("put");
        let request = QueryRequest::new("#email = :email")
            .name("#email", "email")
            .value(":email", "b@x.io")
            .index("email-index");

        let found = store.query("users", &request).await.expect("query");
        assert_eq!(found, vec![item("2", "b@x.io")]);
        assert_eq!(store.query_count(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn update_sets_and_removes(store: InMemoryDocumentStore) {
        store.put("users", &item("1", "a@x.io")).await.expect("put");
        let request = UpdateRequest::new("SET #name = :name REMOVE email")
            .name("#name", "name")
            .value(":name", "B");

        let updated = store.update("users", &key("1"), &request).await.expect("update");
        assert_eq!(updated.get("name"), Some(&NativeValue::from("B")));
        assert!(!updated.contains_key("email"));
    }

    #[rstest]
    #[case::exists_on_present("attribute_exists(#id)", true, true)]
    #[case::exists_on_absent("attribute_exists(#id)", false, false)]
    #[case::not_exists_on_absent("attribute_not_exists(#id)", false, true)]
    #[case::not_exists_on_present("attribute_not_exists(#id)", true, false)]
    #[tokio::test]
    async fn update_conditions_guard_the_write(
        store: InMemoryDocumentStore,
        #[case] condition: &str,
        #[case] seeded: bool,
        #[case] applies: bool,
    ) {
        if seeded {
            store.put("users", &item("1", "a@x.io")).await.expect("put");
        }
        let request = UpdateRequest::new("SET #name = :name")
            .condition(condition)
            .name("#id", "id")
            .name("#name", "name")
            .value(":name", "B");

        let result = store.update("users", &key("1"), &request).await;
        if applies {
            let updated = result.expect("condition holds");
            assert_eq!(updated.get("name"), Some(&NativeValue::from("B")));
        } else {
            let err = result.expect_err("condition fails");
            assert_eq!(err.kind(), ErrorKind::Conflict);
            assert_eq!(store.item_count("users"), usize::from(seeded));
        }
    }

    #[rstest]
    #[tokio::test]
    async fn queued_failures_are_classified(store: InMemoryDocumentStore) {
        store.fail_next(StoreFailure::new("ProvisionedThroughputExceededException", ""));

        let err = store.scan("users", &ScanRequest::new()).await.expect_err("throttled");
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert!(err.is_retryable());
        assert!(store.scan("users", &ScanRequest::new()).await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn unsupported_expressions_are_rejected(store: InMemoryDocumentStore) {
        let request = ScanRequest::new()
            .filter("begins_with(#n, :p)")
            .name("#n", "name")
            .value(":p", "A");

        let err = store.scan("users", &request).await.expect_err("unsupported");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}

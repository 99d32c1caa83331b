//! DynamoDB-backed [`DocumentStore`] adapter.
//!
//! The SDK client is built once from validated [`StoreConnection`] values and
//! shared. Built-in retries are disabled so throttling reaches callers as a
//! retryable [`DomainError`]. Query and scan follow `LastEvaluatedKey` until
//! the table is exhausted or the requested limit is reached.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::retry::RetryConfig;
use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use tracing::debug;

use super::attribute_conversion::{from_sdk_item, to_sdk_item};
use super::error_taxonomy::{StoreFailure, classify};
use super::settings::StoreConnection;
use crate::domain::DomainError;
use crate::domain::attribute::{Item, decode_item, encode_item};
use crate::domain::ports::{
    DocumentStore, ExpressionParams, QueryRequest, ScanRequest, UpdateRequest,
};

type SdkItem = HashMap<String, AttributeValue>;

/// Error code recorded when the SDK fails before the service answers.
const TRANSPORT_FAILURE: &str = "TransportError";

/// Document store client over the AWS SDK.
#[derive(Debug, Clone)]
pub struct DynamoStoreClient {
    client: Client,
}

impl DynamoStoreClient {
    /// Build the SDK client with static credentials and no retries.
    ///
    /// No request is sent; connectivity problems surface on first use.
    pub fn connect(connection: &StoreConnection) -> Self {
        let credentials = Credentials::new(
            connection.access_key_id.clone(),
            connection.secret_access_key.clone(),
            None,
            None,
            "static",
        );
        let mut builder = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(connection.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled());
        if let Some(endpoint) = &connection.endpoint_url {
            builder = builder.endpoint_url(endpoint.clone());
        }
        debug!(
            region = %connection.region,
            endpoint = ?connection.endpoint_url,
            "document store client configured"
        );
        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentStore for DynamoStoreClient {
    async fn get(&self, table: &str, key: &Item) -> Result<Option<Item>, DomainError> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .set_key(Some(sdk_item(key)))
            .send()
            .await
            .map_err(store_error)?;
        output.item().map(native_item).transpose()
    }

    async fn put(&self, table: &str, item: &Item) -> Result<(), DomainError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(sdk_item(item)))
            .send()
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn delete(&self, table: &str, key: &Item) -> Result<(), DomainError> {
        self.client
            .delete_item()
            .table_name(table)
            .set_key(Some(sdk_item(key)))
            .send()
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn query(&self, table: &str, request: &QueryRequest) -> Result<Vec<Item>, DomainError> {
        request.params.validate()?;
        let (values, names) = expression_maps(&request.params);
        let mut items = Vec::new();
        let mut start_key: Option<SdkItem> = None;
        loop {
            let output = self
                .client
                .query()
                .table_name(table)
                .key_condition_expression(&request.key_condition)
                .set_filter_expression(request.filter.clone())
                .set_index_name(request.index.clone())
                .set_expression_attribute_values(values.clone())
                .set_expression_attribute_names(names.clone())
                .set_limit(page_limit(request.limit, items.len()))
                .scan_index_forward(request.scan_forward)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(store_error)?;
            for item in output.items() {
                items.push(native_item(item)?);
            }
            start_key = output.last_evaluated_key().cloned();
            if start_key.is_none() || limit_reached(request.limit, items.len()) {
                break;
            }
        }
        truncate(&mut items, request.limit);
        debug!(table, count = items.len(), "query complete");
        Ok(items)
    }

    async fn scan(&self, table: &str, request: &ScanRequest) -> Result<Vec<Item>, DomainError> {
        request.params.validate()?;
        let (values, names) = expression_maps(&request.params);
        let mut items = Vec::new();
        let mut start_key: Option<SdkItem> = None;
        loop {
            let output = self
                .client
                .scan()
                .table_name(table)
                .set_filter_expression(request.filter.clone())
                .set_expression_attribute_values(values.clone())
                .set_expression_attribute_names(names.clone())
                .set_limit(page_limit(request.limit, items.len()))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(store_error)?;
            for item in output.items() {
                items.push(native_item(item)?);
            }
            start_key = output.last_evaluated_key().cloned();
            if start_key.is_none() || limit_reached(request.limit, items.len()) {
                break;
            }
        }
        truncate(&mut items, request.limit);
        debug!(table, count = items.len(), "scan complete");
        Ok(items)
    }

    async fn update(
        &self,
        table: &str,
        key: &Item,
        request: &UpdateRequest,
    ) -> Result<Item, DomainError> {
        request.params.validate()?;
        let (values, names) = expression_maps(&request.params);
        let output = self
            .client
            .update_item()
            .table_name(table)
            .set_key(Some(sdk_item(key)))
            .update_expression(&request.expression)
            .set_condition_expression(request.condition.clone())
            .set_expression_attribute_values(values)
            .set_expression_attribute_names(names)
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(store_error)?;
        output
            .attributes()
            .map(native_item)
            .transpose()?
            .ok_or_else(|| DomainError::not_found(super::DEFAULT_RESOURCE))
    }
}

fn sdk_item(item: &Item) -> SdkItem {
    to_sdk_item(&encode_item(item))
}

fn native_item(item: &SdkItem) -> Result<Item, DomainError> {
    let wire = from_sdk_item(item)?;
    Ok(decode_item(&wire)?)
}

/// Placeholder maps for the SDK; empty maps are omitted.
fn expression_maps(
    params: &ExpressionParams,
) -> (Option<SdkItem>, Option<HashMap<String, String>>) {
    let values = (!params.values.is_empty()).then(|| sdk_item(&params.values));
    let names = (!params.names.is_empty()).then(|| {
        params
            .names
            .iter()
            .map(|(placeholder, name)| (placeholder.clone(), name.clone()))
            .collect()
    });
    (values, names)
}

fn page_limit(limit: Option<u32>, collected: usize) -> Option<i32> {
    limit.map(|limit| {
        let remaining = usize::try_from(limit)
            .unwrap_or(usize::MAX)
            .saturating_sub(collected);
        i32::try_from(remaining).unwrap_or(i32::MAX).max(1)
    })
}

fn limit_reached(limit: Option<u32>, collected: usize) -> bool {
    limit.is_some_and(|limit| usize::try_from(limit).is_ok_and(|limit| collected >= limit))
}

fn truncate(items: &mut Vec<Item>, limit: Option<u32>) {
    if let Some(limit) = limit.and_then(|limit| usize::try_from(limit).ok()) {
        items.truncate(limit);
    }
}

fn store_error<E, R>(err: SdkError<E, R>) -> DomainError
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: Debug,
{
    let failure = match err.code() {
        Some(code) => {
            let message = err.message().unwrap_or_default().to_owned();
            StoreFailure::new(code, message.clone()).with_detail(message)
        }
        None => StoreFailure::new(
            TRANSPORT_FAILURE,
            DisplayErrorContext(&err).to_string(),
        ),
    };
    debug!(code = %failure.code, message = %failure.message, "document store request failed");
    classify(&failure)
}

//! Amazon DynamoDB record store

use super::RecordStore;
use crate::config::StoreConfig;
use crate::core::models::{RecordId, StoredItem, TenantId};
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

/// Partition key attribute
pub const PARTITION_KEY: &str = "tenant_id";
/// Sort key attribute
pub const SORT_KEY: &str = "log_id";
/// Attribute holding the full item document for lossless reads
const DOCUMENT_ATTRIBUTE: &str = "item_document";

/// Store backed by a DynamoDB table keyed by `tenant_id` / `log_id`
#[derive(Debug, Clone)]
pub struct DynamoDbStore {
    client: Client,
    table_name: String,
}

impl DynamoDbStore {
    pub async fn new(config: &StoreConfig) -> Result<Self> {
        let table_name = config
            .table_name
            .clone()
            .ok_or_else(|| PipelineError::config("dynamodb store requires a table name"))?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        info!(table = %table_name, "Using DynamoDB store");
        Ok(Self {
            client: Client::new(&sdk_config),
            table_name,
        })
    }

    pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

fn dynamo_error<E, R>(action: &str, err: SdkError<E, R>) -> PipelineError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let message = format!("DynamoDB {} failed: {}", action, DisplayErrorContext(&err));
    match err {
        SdkError::TimeoutError(_) => PipelineError::timeout(message),
        _ => PipelineError::store(message),
    }
}

/// Convert a JSON value into a DynamoDB attribute
pub fn to_attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(to_attribute_value).collect()),
        Value::Object(fields) => AttributeValue::M(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), to_attribute_value(v)))
                .collect(),
        ),
    }
}

fn to_item(item: &StoredItem) -> Result<HashMap<String, AttributeValue>> {
    let mut attributes: HashMap<String, AttributeValue> = item
        .attributes()
        .iter()
        .map(|(k, v)| (k.clone(), to_attribute_value(v)))
        .collect();

    attributes.remove("record_id");
    attributes.insert(
        SORT_KEY.to_string(),
        AttributeValue::S(item.record_id.to_string()),
    );
    attributes.insert(
        DOCUMENT_ATTRIBUTE.to_string(),
        AttributeValue::S(serde_json::to_string(item)?),
    );
    Ok(attributes)
}

fn from_item(attributes: &HashMap<String, AttributeValue>) -> Result<StoredItem> {
    let document = attributes
        .get(DOCUMENT_ATTRIBUTE)
        .and_then(|v| v.as_s().ok())
        .ok_or_else(|| PipelineError::store("item is missing its document attribute"))?;
    Ok(serde_json::from_str(document)?)
}

#[async_trait]
impl RecordStore for DynamoDbStore {
    fn name(&self) -> &'static str {
        "dynamodb"
    }

    async fn put(&self, item: &StoredItem) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(item)?))
            .send()
            .await
            .map_err(|e| dynamo_error("put", e))?;

        debug!(
            tenant_id = %item.tenant_id,
            record_id = %item.record_id,
            "Stored item"
        );
        Ok(())
    }

    async fn get(&self, tenant_id: &TenantId, record_id: &RecordId) -> Result<Option<StoredItem>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(PARTITION_KEY, AttributeValue::S(tenant_id.to_string()))
            .key(SORT_KEY, AttributeValue::S(record_id.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| dynamo_error("get", e))?;

        output.item().map(from_item).transpose()
    }

    async fn query_tenant(&self, tenant_id: &TenantId) -> Result<Vec<StoredItem>> {
        let mut items = Vec::new();
        let mut start_key = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#pk = :tenant")
                .expression_attribute_names("#pk", PARTITION_KEY)
                .expression_attribute_values(":tenant", AttributeValue::S(tenant_id.to_string()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| dynamo_error("query", e))?;

            for attributes in output.items() {
                items.push(from_item(attributes)?);
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(items)
    }

    async fn health_check(&self) -> Result<()> {
        self.client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
            .map_err(|e| dynamo_error("describe table", e))?;
        Ok(())
    }
}

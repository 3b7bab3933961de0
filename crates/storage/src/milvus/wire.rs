//! Request and response bodies of the Milvus v2 REST API

use crate::client::{PrimaryKey, Row};
use milvus_manager_core::{
    CollectionSchema, ConsistencyLevel, DataType, Error, FieldSchema, IndexDescription,
    IndexParams, IndexType, MetricType, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Envelope around every REST response
#[derive(Debug, Deserialize)]
pub(super) struct MilvusResponse<T> {
    pub code: i64,
    pub data: Option<T>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CollectionRequest<'a> {
    pub collection_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PartitionRequest<'a> {
    pub collection_name: &'a str,
    pub partition_name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LoadRequest<'a> {
    pub collection_name: &'a str,
    pub replica_number: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct HasData {
    pub has: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateCollectionRequest<'a> {
    pub collection_name: &'a str,
    pub schema: WireSchema,
    pub params: CreateCollectionParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateCollectionParams {
    pub shards_num: u32,
    pub consistency_level: ConsistencyLevel,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireSchema {
    pub auto_id: bool,
    pub enable_dynamic_field: bool,
    pub fields: Vec<WireField>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireField {
    pub field_name: String,
    pub data_type: DataType,
    pub is_primary: bool,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub element_type_params: Map<String, Value>,
}

impl From<&CollectionSchema> for WireSchema {
    fn from(schema: &CollectionSchema) -> Self {
        let fields = schema
            .fields
            .iter()
            .map(|field| {
                let mut element_type_params = Map::new();
                if let Some(dim) = field.dim {
                    element_type_params.insert("dim".to_string(), Value::from(dim.to_string()));
                }
                if let Some(max_length) = field.max_length {
                    element_type_params.insert("max_length".to_string(), Value::from(max_length));
                }
                WireField {
                    field_name: field.name.clone(),
                    data_type: field.data_type,
                    is_primary: field.is_primary,
                    element_type_params,
                }
            })
            .collect();

        Self {
            auto_id: schema.auto_id,
            enable_dynamic_field: schema.enable_dynamic_field,
            fields,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DescribeCollectionData {
    #[serde(default)]
    pub auto_id: bool,
    #[serde(default)]
    pub enable_dynamic_field: bool,
    #[serde(default)]
    pub fields: Vec<DescribedField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DescribedField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_id: bool,
    #[serde(default)]
    pub params: Vec<KeyValue>,
}

#[derive(Debug, Deserialize)]
pub(super) struct KeyValue {
    pub key: String,
    pub value: Value,
}

impl KeyValue {
    /// Parameter values arrive either as numbers or as numeric strings
    fn as_u64(&self) -> Option<u64> {
        match &self.value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl DescribeCollectionData {
    pub fn into_schema(self) -> Result<CollectionSchema> {
        let fields = self
            .fields
            .into_iter()
            .map(|field| {
                let data_type = DataType::from_str(&field.field_type).map_err(|_| {
                    Error::schema_mismatch(format!(
                        "Unknown type '{}' for field '{}'",
                        field.field_type, field.name
                    ))
                })?;
                let param = |key: &str| {
                    field
                        .params
                        .iter()
                        .find(|p| p.key == key)
                        .and_then(KeyValue::as_u64)
                };
                Ok(FieldSchema {
                    dim: param("dim").map(|d| d as usize),
                    max_length: param("max_length").map(|l| l as u32),
                    name: field.name,
                    data_type,
                    is_primary: field.primary_key,
                    auto_id: field.auto_id,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CollectionSchema {
            fields,
            auto_id: self.auto_id,
            enable_dynamic_field: self.enable_dynamic_field,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DescribeIndexRequest<'a> {
    pub collection_name: &'a str,
    pub index_name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DescribedIndex {
    pub field_name: String,
    pub index_name: String,
    #[serde(default)]
    pub index_type: Option<String>,
    #[serde(default)]
    pub metric_type: Option<String>,
}

impl From<DescribedIndex> for IndexDescription {
    fn from(index: DescribedIndex) -> Self {
        Self {
            field_name: index.field_name,
            index_name: index.index_name,
            index_type: index
                .index_type
                .and_then(|t| IndexType::from_str(&t).ok()),
            metric_type: index
                .metric_type
                .and_then(|m| MetricType::from_str(&m).ok()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateIndexRequest<'a> {
    pub collection_name: &'a str,
    pub index_params: Vec<WireIndexParams<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireIndexParams<'a> {
    pub field_name: &'a str,
    pub index_name: &'a str,
    pub metric_type: MetricType,
    pub params: Map<String, Value>,
}

impl<'a> WireIndexParams<'a> {
    /// The index type travels inside `params` next to the build parameters
    pub fn new(field: &'a str, params: &IndexParams) -> Self {
        let mut wire_params = params.params.clone();
        wire_params.insert(
            "index_type".to_string(),
            Value::from(params.index_type.to_string()),
        );
        Self {
            field_name: field,
            index_name: field,
            metric_type: params.metric_type,
            params: wire_params,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WriteRequest<'a> {
    pub collection_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_name: Option<&'a str>,
    pub data: Vec<Row>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct InsertData {
    #[serde(default)]
    pub insert_ids: Vec<PrimaryKey>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpsertData {
    #[serde(default)]
    pub upsert_ids: Vec<PrimaryKey>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeleteRequest<'a> {
    pub collection_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_name: Option<&'a str>,
    pub filter: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DeleteData {
    #[serde(default)]
    pub delete_count: u64,
}

//! Database client seam
//!
//! Everything the collection manager needs from the external database goes
//! through [`VectorDatabase`]. The REST client and the in-memory mock are the
//! two implementations.

use async_trait::async_trait;
use milvus_manager_core::{
    CollectionSchema, ConsistencyLevel, IndexDescription, IndexParams, Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single entity as sent to the database: field name to value
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Primary key value of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Str(id) => write!(f, "{id}"),
        }
    }
}

impl PrimaryKey {
    /// Reads a primary key out of a JSON value
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_i64().map(Self::Int),
            serde_json::Value::String(s) => Some(Self::Str(s.clone())),
            _ => None,
        }
    }
}

/// Request to create a collection
#[derive(Debug, Clone)]
pub struct CreateCollection {
    pub collection_name: String,
    pub schema: CollectionSchema,
    pub shards: u32,
    pub consistency_level: ConsistencyLevel,
}

/// Operations of the external vector database used by the manager
#[async_trait]
pub trait VectorDatabase: Send + Sync {
    async fn has_collection(&self, collection: &str) -> Result<bool>;

    async fn create_collection(&self, request: &CreateCollection) -> Result<()>;

    async fn describe_collection(&self, collection: &str) -> Result<CollectionSchema>;

    async fn drop_collection(&self, collection: &str) -> Result<()>;

    /// All indexes built on the collection
    async fn describe_indexes(&self, collection: &str) -> Result<Vec<IndexDescription>>;

    async fn create_index(&self, collection: &str, field: &str, params: &IndexParams)
        -> Result<()>;

    async fn has_partition(&self, collection: &str, partition: &str) -> Result<bool>;

    async fn create_partition(&self, collection: &str, partition: &str) -> Result<()>;

    /// Load the collection into memory so it can be searched
    async fn load_collection(&self, collection: &str, replicas: u32) -> Result<()>;

    /// Insert rows, returning the primary keys in row order
    async fn insert(
        &self,
        collection: &str,
        partition: Option<&str>,
        rows: Vec<Row>,
    ) -> Result<Vec<PrimaryKey>>;

    /// Insert or replace rows by primary key
    async fn upsert(
        &self,
        collection: &str,
        partition: Option<&str>,
        rows: Vec<Row>,
    ) -> Result<Vec<PrimaryKey>>;

    /// Delete every entity matching a boolean filter expression
    async fn delete(&self, collection: &str, partition: Option<&str>, filter: &str)
        -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primary_key_untagged() {
        let ids: Vec<PrimaryKey> = serde_json::from_value(json!([1, "abc"])).unwrap();
        assert_eq!(ids, vec![PrimaryKey::Int(1), PrimaryKey::Str("abc".to_string())]);
        assert_eq!(PrimaryKey::Int(7).to_string(), "7");
    }

    #[test]
    fn test_primary_key_from_value() {
        assert_eq!(PrimaryKey::from_value(&json!(3)), Some(PrimaryKey::Int(3)));
        assert_eq!(
            PrimaryKey::from_value(&json!("x")),
            Some(PrimaryKey::Str("x".to_string()))
        );
        assert_eq!(PrimaryKey::from_value(&json!(1.5)), None);
        assert_eq!(PrimaryKey::from_value(&json!(null)), None);
    }
}

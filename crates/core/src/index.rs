//! Index, search and consistency parameters

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use strum::{Display, EnumString};

/// Index types understood by the database
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexType {
    Flat,
    IvfFlat,
    #[serde(rename = "IVF_SQ8")]
    #[strum(serialize = "IVF_SQ8")]
    IvfSq8,
    IvfPq,
    Hnsw,
    RhnswFlat,
    RhnswSq,
    RhnswPq,
    IvfHnsw,
    Annoy,
    #[serde(rename = "AUTOINDEX")]
    #[strum(serialize = "AUTOINDEX")]
    AutoIndex,
}

/// Distance metrics
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum MetricType {
    #[default]
    L2,
    IP,
    Cosine,
    Hamming,
    Jaccard,
}

/// Parameters used to build an index on the vector field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexParams {
    pub index_type: IndexType,
    #[serde(default)]
    pub metric_type: MetricType,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl IndexParams {
    pub fn new(index_type: IndexType, metric_type: MetricType) -> Self {
        Self {
            index_type,
            metric_type,
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// HNSW index used when no parameters were configured
    pub fn default_hnsw() -> Self {
        Self::new(IndexType::Hnsw, MetricType::L2)
            .with_param("M", 8)
            .with_param("efConstruction", 64)
    }

    /// Server-chosen index, the fallback for deployments rejecting the primary type
    pub fn auto_index(metric_type: MetricType) -> Self {
        Self::new(IndexType::AutoIndex, metric_type)
    }
}

/// An index present on a remote collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescription {
    pub field_name: String,
    pub index_name: String,
    pub index_type: Option<IndexType>,
    pub metric_type: Option<MetricType>,
}

/// Parameters passed along with similarity searches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub metric_type: MetricType,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl SearchParams {
    /// Default search parameters for an index type
    pub fn default_for(index_type: IndexType) -> Self {
        let params = match index_type {
            IndexType::IvfFlat | IndexType::IvfSq8 | IndexType::IvfPq => json!({"nprobe": 10}),
            IndexType::Hnsw | IndexType::RhnswFlat | IndexType::RhnswSq | IndexType::RhnswPq => {
                json!({"ef": 10})
            }
            IndexType::IvfHnsw => json!({"nprobe": 10, "ef": 10}),
            IndexType::Annoy => json!({"search_k": 10}),
            IndexType::AutoIndex | IndexType::Flat => json!({}),
        };

        Self {
            metric_type: MetricType::L2,
            params: match params {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }
}

/// Read consistency guarantees
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum ConsistencyLevel {
    Strong,
    #[default]
    Session,
    Bounded,
    Eventually,
    Customized,
}

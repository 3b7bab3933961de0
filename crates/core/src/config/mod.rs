//! Configuration module for the collection manager
//!
//! A manager is configured once at construction. Configuration can be loaded
//! from a TOML file and/or environment variables.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use crate::index::{ConsistencyLevel, IndexParams, SearchParams};
use serde::{Deserialize, Serialize};

use defaults::*;

/// Configuration for a single managed collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Base URL of the database REST endpoint
    #[serde(default = "default_connection_address")]
    pub connection_address: String,

    /// Optional API token (`user:password` or a cloud API key)
    #[serde(default)]
    pub token: Option<String>,

    /// Name of the managed collection
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    /// Shard count used when the collection is created
    #[serde(default = "default_shards")]
    pub shards: u32,

    /// Partitions created alongside the collection
    #[serde(default)]
    pub partitions: Vec<String>,

    /// Consistency level used when the collection is created
    #[serde(default)]
    pub consistency_level: ConsistencyLevel,

    /// Number of in-memory replicas when loading
    #[serde(default = "default_replica_count")]
    pub replica_count: u32,

    /// Index parameters; a default HNSW index is built when absent
    #[serde(default)]
    pub index_params: Option<IndexParams>,

    /// Search parameters; derived from the index type when absent
    #[serde(default)]
    pub search_params: Option<SearchParams>,

    /// Per-request timeout in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Drop any existing collection of the same name on construction
    #[serde(default)]
    pub drop_old: bool,

    /// Preferred primary key field name, replaced by the remote one on attach
    #[serde(default)]
    pub pk_field: Option<String>,

    /// Preferred vector field name, replaced by the remote one on attach
    #[serde(default)]
    pub vector_field: Option<String>,

    /// Vector dimension for creating a collection without sample data
    #[serde(default)]
    pub dimension: Option<usize>,

    /// Rows per insert/upsert request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            connection_address: default_connection_address(),
            token: None,
            collection_name: default_collection_name(),
            shards: default_shards(),
            partitions: Vec::new(),
            consistency_level: ConsistencyLevel::default(),
            replica_count: default_replica_count(),
            index_params: None,
            search_params: None,
            timeout_ms: None,
            drop_old: false,
            pk_field: None,
            vector_field: None,
            dimension: None,
            batch_size: default_batch_size(),
        }
    }
}

impl ManagerConfig {
    /// Config for the given collection with every other value defaulted
    pub fn for_collection(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            ..Default::default()
        }
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.connection_address.starts_with("http://")
            || self.connection_address.starts_with("https://"))
        {
            return Err(Error::config(format!(
                "Invalid connection address '{}'. Must start with http:// or https://",
                self.connection_address
            )));
        }

        if self.collection_name.trim().is_empty() {
            return Err(Error::config("Collection name must not be empty"));
        }

        if self.shards == 0 || self.shards > MAX_SHARDS {
            return Err(Error::config(format!(
                "Invalid shard count {}. Must be between 1 and {MAX_SHARDS}",
                self.shards
            )));
        }

        if self.replica_count == 0 {
            return Err(Error::config("Replica count must be at least 1"));
        }

        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(Error::config(format!(
                "Invalid batch size {}. Must be between 1 and {MAX_BATCH_SIZE}",
                self.batch_size
            )));
        }

        if let Some(dim) = self.dimension {
            if dim == 0 || dim > MAX_DIMENSION {
                return Err(Error::config(format!(
                    "Invalid dimension {dim}. Must be between 1 and {MAX_DIMENSION}"
                )));
            }
        }

        if let Some(partition) = self.partitions.iter().find(|p| p.trim().is_empty()) {
            return Err(Error::config(format!("Invalid partition name '{partition}'")));
        }

        Ok(())
    }
}

//! Core types for the Milvus collection manager
//!
//! This crate provides the foundational pieces shared by the storage layer
//! and the CLI:
//!
//! - **Configuration**: per-collection manager configuration
//! - **Schema**: field types, collection schemas and the field registry
//! - **Index**: index, search and consistency parameters
//! - **Error handling**: unified error types
//!

pub mod config;
pub mod error;
pub mod index;
pub mod schema;

// Re-export main types for convenience
pub use config::ManagerConfig;
pub use error::{Error, Result};
pub use index::{
    ConsistencyLevel, IndexDescription, IndexParams, IndexType, MetricType, SearchParams,
};
pub use schema::{infer_data_type, CollectionSchema, DataType, FieldRegistry, FieldSchema};

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod client;
mod collection_manager;
mod factory;
pub mod mock;

// Keep the REST client private
mod milvus;

pub use client::{CreateCollection, PrimaryKey, Row, VectorDatabase};
pub use collection_manager::{
    CollectionInfo, CollectionManager, WriteOptions, DEFAULT_PK_FIELD, DEFAULT_VECTOR_FIELD,
};
pub use factory::{create_and_initialize_manager, create_database_client};
pub use mock::MockDatabase;

//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_CONNECTION_ADDRESS: &str = "http://localhost:19530";
pub(crate) const DEFAULT_COLLECTION_NAME: &str = "ClientCollection";

/// Upper bound on shards per collection accepted by the database
pub(crate) const MAX_SHARDS: u32 = 64;
pub(crate) const MAX_BATCH_SIZE: usize = 10_000;
pub(crate) const MAX_DIMENSION: usize = 32_768;

pub(crate) fn default_connection_address() -> String {
    DEFAULT_CONNECTION_ADDRESS.to_string()
}

pub(crate) fn default_collection_name() -> String {
    DEFAULT_COLLECTION_NAME.to_string()
}

pub(crate) fn default_shards() -> u32 {
    2
}

pub(crate) fn default_replica_count() -> u32 {
    1
}

pub(crate) fn default_batch_size() -> usize {
    100
}

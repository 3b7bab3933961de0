//! Library interface for the milvus-manager CLI
//!
//! Command handlers live here so integration tests can drive them against
//! the in-memory database; main.rs only parses arguments and prints.

pub mod commands;

pub use anyhow::Result;
pub use milvus_manager_core::ManagerConfig;

use std::path::Path;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "milvus-manager.toml";

/// Load the configuration, applying a command-line dimension override
pub fn load_config(path: Option<&Path>, dimension: Option<usize>) -> Result<ManagerConfig> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let mut config = ManagerConfig::from_file(path)?;
    if dimension.is_some() {
        config.dimension = dimension;
    }
    config.validate()?;
    Ok(config)
}

//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, Environment, File, FileFormat};
use std::path::Path;

use super::ManagerConfig;

impl ManagerConfig {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `MILVUS_MANAGER_` and use double
    /// underscores for nested values. For example:
    /// - `MILVUS_MANAGER_COLLECTION_NAME=documents`
    /// - `MILVUS_MANAGER_INDEX_PARAMS__INDEX_TYPE=IVF_FLAT`
    ///
    /// `MILVUS_URI` and `MILVUS_TOKEN` are honoured as shorthands for the
    /// connection address and token.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut builder = ConfigLib::builder();

        // Add the config file if it exists, whatever its extension
        if path.exists() {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("MILVUS_MANAGER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(uri) = std::env::var("MILVUS_URI") {
            builder = builder
                .set_override("connection_address", uri)
                .map_err(|e| Error::config(format!("Failed to set MILVUS_URI: {e}")))?;
        }
        if let Ok(token) = std::env::var("MILVUS_TOKEN") {
            builder = builder
                .set_override("token", token)
                .map_err(|e| Error::config(format!("Failed to set MILVUS_TOKEN: {e}")))?;
        }

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Saves the configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, toml_string)
            .map_err(|e| Error::config(format!("Failed to write config file: {e}")))?;

        Ok(())
    }
}

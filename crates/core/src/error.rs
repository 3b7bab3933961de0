use thiserror::Error;

/// Result type for collection manager operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for collection manager operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure reported by the database itself (non-zero response code)
    #[error("Database error (code {code}): {message}")]
    Database { code: i64, message: String },

    /// HTTP or connection level failure before the database answered
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request did not complete in time
    #[error("Operation timeout after {0}ms")]
    Timeout(u64),

    /// No collection is attached or the remote collection is gone
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Remote schema or row shape does not match what the manager expects
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation the target collection cannot serve
    #[error("Not supported: {0}")]
    NotSupported(String),
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a database-reported error
    pub fn database(code: i64, message: impl Into<String>) -> Self {
        Self::Database {
            code,
            message: message.into(),
        }
    }

    /// Creates a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a collection-not-found error
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound(name.into())
    }

    /// Creates a schema mismatch error
    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    /// Creates an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates a not-supported error
    pub fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    /// Whether the database itself rejected the request
    pub fn is_database(&self) -> bool {
        matches!(self, Self::Database { .. })
    }
}

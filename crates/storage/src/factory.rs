use crate::client::VectorDatabase;
use crate::collection_manager::CollectionManager;
use crate::milvus::MilvusRestClient;
use milvus_manager_core::{ManagerConfig, Result};
use std::sync::Arc;

/// Creates a database client for the endpoint named in the configuration.
///
/// Returns a trait object so the REST client and the in-memory mock can be
/// used interchangeably by [`CollectionManager`].
///
/// # Errors
/// Returns an error if the HTTP client cannot be built
///
/// # Example
/// ```ignore
/// let config = ManagerConfig::for_collection("docs");
/// let client = create_database_client(&config)?;
/// let manager = CollectionManager::new(config, client).await?;
/// ```
pub fn create_database_client(config: &ManagerConfig) -> Result<Arc<dyn VectorDatabase>> {
    let client = MilvusRestClient::new(config)?;
    Ok(Arc::new(client) as Arc<dyn VectorDatabase>)
}

/// Creates a collection manager and makes sure its collection exists.
///
/// Equivalent to [`CollectionManager::new`] followed by
/// [`CollectionManager::init`]; the collection is created from the
/// configured dimension when it does not exist yet.
pub async fn create_and_initialize_manager(
    config: ManagerConfig,
    client: Arc<dyn VectorDatabase>,
) -> Result<CollectionManager> {
    let manager = CollectionManager::new(config, client).await?;
    manager.init().await?;
    Ok(manager)
}

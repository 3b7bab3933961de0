use anyhow::{Context, Result};
use milvus_manager_core::ManagerConfig;
use milvus_manager_storage::{CollectionManager, MockDatabase, VectorDatabase};
use std::sync::Arc;
use tracing::info;

/// Connect a manager to the configured endpoint, or to an empty in-memory
/// database when `mock` is set
pub async fn connect(config: ManagerConfig, mock: bool) -> Result<CollectionManager> {
    let address = config.connection_address.clone();
    let manager = if mock {
        let db: Arc<dyn VectorDatabase> = Arc::new(MockDatabase::new());
        CollectionManager::new(config, db).await
    } else {
        CollectionManager::from_config(config).await
    };
    manager.with_context(|| format!("Failed to connect to {address}"))
}

/// Pretty-printed snapshot of the manager's collection state
pub async fn status(manager: &CollectionManager) -> Result<String> {
    let info = manager.info().await;
    serde_json::to_string_pretty(&info).context("Failed to serialize collection info")
}

pub async fn create(manager: &CollectionManager) -> Result<String> {
    manager
        .init()
        .await
        .with_context(|| format!("Failed to create collection {}", manager.collection_name()))?;
    info!("Collection {} is ready", manager.collection_name());
    Ok(format!("Collection {} is ready", manager.collection_name()))
}

pub async fn drop(manager: &CollectionManager) -> Result<String> {
    manager
        .delete_collection(true)
        .await
        .with_context(|| format!("Failed to drop collection {}", manager.collection_name()))?;
    Ok(format!("Dropped collection {}", manager.collection_name()))
}

/// Drop and recreate the collection with the same schema
pub async fn truncate(manager: &CollectionManager) -> Result<String> {
    manager
        .delete_collection(false)
        .await
        .with_context(|| format!("Failed to truncate collection {}", manager.collection_name()))?;
    Ok(format!("Truncated collection {}", manager.collection_name()))
}

pub async fn index(manager: &CollectionManager) -> Result<String> {
    if !manager.has_collection().await {
        anyhow::bail!(
            "Collection {} does not exist. Run 'milvus-manager create' first.",
            manager.collection_name()
        );
    }
    manager.create_index().await.context("Failed to create index")?;

    match manager.get_index().await? {
        Some(index) => {
            let index_type = index
                .index_type
                .map(|t| t.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            Ok(format!(
                "Index {} on field {} ({index_type})",
                index.index_name, index.field_name
            ))
        }
        None => Ok(format!("No index on {}", manager.collection_name())),
    }
}

pub async fn delete(manager: &CollectionManager, expression: &str) -> Result<String> {
    let deleted = manager
        .delete_data(expression)
        .await
        .with_context(|| format!("Failed to delete entities matching '{expression}'"))?;
    Ok(format!(
        "Deleted {deleted} entities from {}",
        manager.collection_name()
    ))
}

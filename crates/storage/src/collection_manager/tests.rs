//! Tests for the collection manager

use super::*;
use crate::mock::MockDatabase;
use async_trait::async_trait;
use milvus_manager_core::{DataType, FieldSchema, IndexType, MetricType};
use pretty_assertions::assert_eq;
use serde_json::json;

const COLLECTION: &str = "docs";

fn auto_id_schema() -> CollectionSchema {
    CollectionSchema {
        fields: vec![
            FieldSchema::primary("id", DataType::Int64, true),
            FieldSchema::varchar("source", 256),
            FieldSchema::float_vector("embedding", 3),
        ],
        auto_id: true,
        enable_dynamic_field: false,
    }
}

fn manual_pk_schema() -> CollectionSchema {
    CollectionSchema {
        fields: vec![
            FieldSchema::primary("id", DataType::Int64, false),
            FieldSchema::float_vector("embedding", 3),
        ],
        auto_id: false,
        enable_dynamic_field: false,
    }
}

fn config() -> ManagerConfig {
    ManagerConfig::for_collection(COLLECTION)
}

fn row(value: serde_json::Value) -> Row {
    value.as_object().cloned().unwrap()
}

async fn manager_over(db: &Arc<MockDatabase>, config: ManagerConfig) -> CollectionManager {
    CollectionManager::new(config, db.clone() as Arc<dyn VectorDatabase>)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_new_attaches_existing_collection() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    let manager = manager_over(&db, config()).await;

    assert!(manager.has_collection().await);
    assert_eq!(manager.pk_field().await, Some("id".to_string()));
    assert_eq!(manager.vector_field().await, Some("embedding".to_string()));
    assert_eq!(manager.auto_id().await, Some(true));

    let fields = manager.fields().await;
    let names: Vec<_> = fields.names().collect();
    assert_eq!(names, vec!["id", "source", "embedding"]);
    assert_eq!(fields.get("embedding"), Some(DataType::FloatVector));

    let indexes = db.indexes(COLLECTION);
    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0].index_type, Some(IndexType::Hnsw));
    assert_eq!(db.loaded_replicas(COLLECTION), Some(1));

    let search = manager.search_params().await.unwrap();
    assert_eq!(search.params.get("ef"), Some(&json!(10)));
    assert_eq!(search.metric_type, MetricType::L2);
}

#[tokio::test]
async fn test_new_without_remote_collection_stays_detached() {
    let db = Arc::new(MockDatabase::new());
    let manager = manager_over(&db, config()).await;

    assert!(!manager.has_collection().await);
    assert!(manager.fields().await.is_empty());
    assert_eq!(db.create_collection_calls(), 0);
}

#[tokio::test]
async fn test_new_rejects_invalid_config() {
    let db = Arc::new(MockDatabase::new());
    let mut config = config();
    config.shards = 0;
    let result = CollectionManager::new(config, db as Arc<dyn VectorDatabase>).await;
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn test_drop_old_removes_existing_collection() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    let mut config = config();
    config.drop_old = true;
    let manager = manager_over(&db, config).await;

    assert!(!db.contains(COLLECTION));
    assert_eq!(db.drop_calls(), 1);
    assert!(!manager.has_collection().await);
}

#[tokio::test]
async fn test_configured_field_names_are_replaced() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    let mut config = config();
    config.pk_field = Some("uid".to_string());
    config.vector_field = Some("vec".to_string());
    let manager = manager_over(&db, config).await;

    assert_eq!(manager.pk_field().await, Some("id".to_string()));
    assert_eq!(manager.vector_field().await, Some("embedding".to_string()));
}

#[tokio::test]
async fn test_auto_id_comes_from_primary_field_only() {
    let mut schema = manual_pk_schema();
    let mut flagged = FieldSchema::new("counter", DataType::Int64);
    flagged.auto_id = true;
    schema.fields.push(flagged);
    schema.auto_id = true;

    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, schema));
    let manager = manager_over(&db, config()).await;

    assert_eq!(manager.auto_id().await, Some(false));
}

#[tokio::test]
async fn test_schema_without_vector_field_is_rejected() {
    let schema = CollectionSchema {
        fields: vec![FieldSchema::primary("id", DataType::Int64, true)],
        auto_id: true,
        enable_dynamic_field: false,
    };
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, schema));
    let result = CollectionManager::new(config(), db as Arc<dyn VectorDatabase>).await;
    assert!(matches!(result, Err(Error::SchemaMismatch(_))));
}

#[tokio::test]
async fn test_delete_collection_recreates_when_not_dropping() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    let manager = manager_over(&db, config()).await;
    manager
        .insert_data(
            &[vec![0.1, 0.2, 0.3]],
            Some(&[row(json!({"source": "a"}))]),
            &WriteOptions::from_config(manager.config()),
        )
        .await
        .unwrap();
    assert_eq!(db.row_count(COLLECTION), 1);

    manager.delete_collection(false).await.unwrap();

    assert!(manager.has_collection().await);
    assert!(db.contains(COLLECTION));
    assert_eq!(db.row_count(COLLECTION), 0);
    assert_eq!(
        db.describe_collection(COLLECTION).await.unwrap(),
        auto_id_schema()
    );
    assert_eq!(db.indexes(COLLECTION).len(), 1);
    assert_eq!(db.loaded_replicas(COLLECTION), Some(1));
    assert_eq!(manager.fields().await.len(), 3);
}

#[tokio::test]
async fn test_delete_collection_drop_leaves_no_handle() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    let manager = manager_over(&db, config()).await;

    manager.delete_collection(true).await.unwrap();

    assert!(!manager.has_collection().await);
    assert!(!db.contains(COLLECTION));
    assert!(manager.fields().await.is_empty());
    assert_eq!(manager.auto_id().await, None);
}

#[tokio::test]
async fn test_delete_collection_recreates_from_configured_dimension() {
    let db = Arc::new(MockDatabase::new());
    let mut config = config();
    config.dimension = Some(8);
    let manager = manager_over(&db, config).await;

    manager.delete_collection(false).await.unwrap();

    assert!(manager.has_collection().await);
    let schema = db.describe_collection(COLLECTION).await.unwrap();
    assert_eq!(schema.vector_field().unwrap().dim, Some(8));
    assert_eq!(manager.pk_field().await, Some(DEFAULT_PK_FIELD.to_string()));
    assert_eq!(db.drop_calls(), 0);
}

#[tokio::test]
async fn test_create_index_is_noop_when_index_exists() {
    let existing = IndexDescription {
        field_name: "embedding".to_string(),
        index_name: "embedding".to_string(),
        index_type: Some(IndexType::IvfFlat),
        metric_type: Some(MetricType::IP),
    };
    let db = Arc::new(
        MockDatabase::new()
            .with_collection(COLLECTION, auto_id_schema())
            .with_index(COLLECTION, existing.clone()),
    );
    let manager = manager_over(&db, config()).await;
    manager.create_index().await.unwrap();

    assert_eq!(db.create_index_calls(), 0);
    assert_eq!(manager.get_index().await.unwrap(), Some(existing));

    let search = manager.search_params().await.unwrap();
    assert_eq!(search.params.get("nprobe"), Some(&json!(10)));
    assert_eq!(search.metric_type, MetricType::IP);
}

#[tokio::test]
async fn test_create_index_falls_back_to_autoindex_once() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    db.fail_index_type(IndexType::Hnsw);

    let mut config = config();
    config.index_params = Some(IndexParams::new(IndexType::Hnsw, MetricType::Cosine));
    let manager = manager_over(&db, config).await;

    assert_eq!(db.create_index_calls(), 2);
    assert_eq!(
        manager.index_params().await,
        Some(IndexParams::auto_index(MetricType::Cosine))
    );
    let index = manager.get_index().await.unwrap().unwrap();
    assert_eq!(index.index_type, Some(IndexType::AutoIndex));
    assert!(manager.search_params().await.unwrap().params.is_empty());
}

#[tokio::test]
async fn test_create_index_surfaces_error_after_single_fallback() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    db.fail_index_type(IndexType::Hnsw);
    db.fail_index_type(IndexType::AutoIndex);

    let result = CollectionManager::new(config(), db.clone() as Arc<dyn VectorDatabase>).await;

    assert!(matches!(result, Err(Error::Database { .. })));
    assert_eq!(db.create_index_calls(), 2);
    assert!(db.indexes(COLLECTION).is_empty());
}

/// Mock whose index creation fails below the database layer
struct UnreachableIndexer {
    inner: MockDatabase,
}

#[async_trait]
impl VectorDatabase for UnreachableIndexer {
    async fn has_collection(&self, collection: &str) -> Result<bool> {
        self.inner.has_collection(collection).await
    }
    async fn create_collection(&self, request: &CreateCollection) -> Result<()> {
        self.inner.create_collection(request).await
    }
    async fn describe_collection(&self, collection: &str) -> Result<CollectionSchema> {
        self.inner.describe_collection(collection).await
    }
    async fn drop_collection(&self, collection: &str) -> Result<()> {
        self.inner.drop_collection(collection).await
    }
    async fn describe_indexes(&self, collection: &str) -> Result<Vec<IndexDescription>> {
        self.inner.describe_indexes(collection).await
    }
    async fn create_index(&self, _: &str, _: &str, _: &IndexParams) -> Result<()> {
        Err(Error::transport("connection reset by peer"))
    }
    async fn has_partition(&self, collection: &str, partition: &str) -> Result<bool> {
        self.inner.has_partition(collection, partition).await
    }
    async fn create_partition(&self, collection: &str, partition: &str) -> Result<()> {
        self.inner.create_partition(collection, partition).await
    }
    async fn load_collection(&self, collection: &str, replicas: u32) -> Result<()> {
        self.inner.load_collection(collection, replicas).await
    }
    async fn insert(
        &self,
        collection: &str,
        partition: Option<&str>,
        rows: Vec<Row>,
    ) -> Result<Vec<PrimaryKey>> {
        self.inner.insert(collection, partition, rows).await
    }
    async fn upsert(
        &self,
        collection: &str,
        partition: Option<&str>,
        rows: Vec<Row>,
    ) -> Result<Vec<PrimaryKey>> {
        self.inner.upsert(collection, partition, rows).await
    }
    async fn delete(&self, collection: &str, partition: Option<&str>, filter: &str) -> Result<u64> {
        self.inner.delete(collection, partition, filter).await
    }
}

#[tokio::test]
async fn test_transport_failure_does_not_fall_back() {
    let db = Arc::new(UnreachableIndexer {
        inner: MockDatabase::new().with_collection(COLLECTION, auto_id_schema()),
    });
    let result = CollectionManager::new(config(), db as Arc<dyn VectorDatabase>).await;
    assert!(matches!(result, Err(Error::Transport(_))));
}

#[tokio::test]
async fn test_configured_search_params_are_kept() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    let mut config = config();
    let custom = SearchParams {
        metric_type: MetricType::L2,
        params: json!({"ef": 128}).as_object().cloned().unwrap(),
    };
    config.search_params = Some(custom.clone());
    let manager = manager_over(&db, config).await;

    assert_eq!(manager.search_params().await, Some(custom));
}

#[tokio::test]
async fn test_init_requires_dimension_or_sample() {
    let db = Arc::new(MockDatabase::new());
    let manager = manager_over(&db, config()).await;

    let err = manager.init().await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(!manager.has_collection().await);
}

#[tokio::test]
async fn test_init_creates_collection_and_partitions() {
    let db = Arc::new(MockDatabase::new());
    let mut config = config();
    config.dimension = Some(4);
    config.replica_count = 2;
    config.partitions = vec!["hot".to_string(), "cold".to_string()];
    config.vector_field = Some("dense".to_string());
    let manager = manager_over(&db, config).await;

    manager.init().await.unwrap();

    assert!(manager.has_collection().await);
    assert_eq!(
        db.partitions(COLLECTION),
        vec!["_default".to_string(), "hot".to_string(), "cold".to_string()]
    );
    assert_eq!(db.loaded_replicas(COLLECTION), Some(2));
    assert_eq!(manager.vector_field().await, Some("dense".to_string()));
    assert_eq!(manager.auto_id().await, Some(true));

    // A second init attaches to what is there
    manager.init().await.unwrap();
    assert_eq!(db.create_collection_calls(), 1);
    assert_eq!(db.create_index_calls(), 1);
}

#[tokio::test]
async fn test_insert_creates_collection_from_sample() {
    let db = Arc::new(MockDatabase::new());
    let manager = manager_over(&db, config()).await;

    let embeddings = vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]];
    let metadata = vec![
        row(json!({"source": "a.txt", "page": 1})),
        row(json!({"source": "b.txt", "page": 2})),
    ];
    let ids = manager
        .insert_data(
            &embeddings,
            Some(&metadata),
            &WriteOptions::from_config(manager.config()),
        )
        .await
        .unwrap();

    assert_eq!(ids, vec![PrimaryKey::Int(1), PrimaryKey::Int(2)]);
    let schema = db.describe_collection(COLLECTION).await.unwrap();
    assert_eq!(schema.vector_field().unwrap().dim, Some(3));
    assert_eq!(schema.field("page").unwrap().data_type, DataType::Int64);
    assert_eq!(db.loaded_replicas(COLLECTION), Some(1));

    let stored = db.rows(COLLECTION);
    assert_eq!(stored[1].get("source"), Some(&json!("b.txt")));
    assert_eq!(stored[0].get(DEFAULT_PK_FIELD), Some(&json!(1)));
}

#[tokio::test]
async fn test_insert_in_batches() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, manual_pk_schema()));
    let manager = manager_over(&db, config()).await;

    let embeddings: Vec<Vec<f32>> = (0..5).map(|i| vec![i as f32; 3]).collect();
    let metadata: Vec<Row> = (0..5).map(|i| row(json!({"id": i * 10}))).collect();
    let options = WriteOptions::from_config(manager.config()).with_batch_size(2);

    let ids = manager
        .insert_data(&embeddings, Some(&metadata), &options)
        .await
        .unwrap();

    let expected: Vec<_> = (0..5).map(|i| PrimaryKey::Int(i * 10)).collect();
    assert_eq!(ids, expected);
    assert_eq!(db.row_count(COLLECTION), 5);
}

#[tokio::test]
async fn test_insert_into_partition() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    let mut config = config();
    config.partitions = vec!["recent".to_string()];
    let manager = manager_over(&db, config).await;
    manager.init().await.unwrap();

    let options = WriteOptions::from_config(manager.config()).with_partition("recent");
    manager
        .insert_data(&[vec![1.0, 2.0, 3.0]], Some(&[row(json!({"source": "x"}))]), &options)
        .await
        .unwrap();

    assert_eq!(db.partition_rows(COLLECTION, "recent").len(), 1);
    assert!(db.partition_rows(COLLECTION, "_default").is_empty());
}

#[tokio::test]
async fn test_insert_validates_input() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    let manager = manager_over(&db, config()).await;
    let options = WriteOptions::from_config(manager.config());

    let err = manager
        .insert_data(&[vec![0.1, 0.2, 0.3]], Some(&[]), &options)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = manager
        .insert_data(&[vec![0.1, 0.2]], Some(&[row(json!({"source": "a"}))]), &options)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch(_)));

    let err = manager
        .insert_data(
            &[vec![0.1, 0.2, 0.3]],
            Some(&[row(json!({"source": "a", "embedding": [1]}))]),
            &options,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    assert!(manager.insert_data(&[], None, &options).await.unwrap().is_empty());
    assert_eq!(db.row_count(COLLECTION), 0);
}

#[tokio::test]
async fn test_insert_drops_unknown_keys_and_generated_ids() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    let manager = manager_over(&db, config()).await;

    manager
        .insert_data(
            &[vec![0.1, 0.2, 0.3]],
            Some(&[row(json!({"id": 99, "source": "a", "unknown": true}))]),
            &WriteOptions::from_config(manager.config()),
        )
        .await
        .unwrap();

    let stored = &db.rows(COLLECTION)[0];
    assert_eq!(stored.get("id"), Some(&json!(1)));
    assert!(stored.get("unknown").is_none());
}

#[tokio::test]
async fn test_insert_requires_pk_without_auto_id() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, manual_pk_schema()));
    let manager = manager_over(&db, config()).await;

    let err = manager
        .insert_data(&[vec![0.1, 0.2, 0.3]], None, &WriteOptions::from_config(manager.config()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_upsert_replaces_by_primary_key() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, manual_pk_schema()));
    let manager = manager_over(&db, config()).await;
    let options = WriteOptions::from_config(manager.config());

    manager
        .insert_data(&[vec![0.0; 3]], Some(&[row(json!({"id": 7}))]), &options)
        .await
        .unwrap();
    let ids = manager
        .upsert_data(&[vec![1.0; 3]], &[row(json!({"id": 7}))], &options)
        .await
        .unwrap();

    assert_eq!(ids, vec![PrimaryKey::Int(7)]);
    let stored = db.rows(COLLECTION);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].get("embedding"), Some(&json!([1.0, 1.0, 1.0])));
}

#[tokio::test]
async fn test_upsert_not_supported_with_auto_id() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    let manager = manager_over(&db, config()).await;

    let err = manager
        .upsert_data(
            &[vec![0.1, 0.2, 0.3]],
            &[row(json!({"id": 1, "source": "a"}))],
            &WriteOptions::from_config(manager.config()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotSupported(_)));
}

#[tokio::test]
async fn test_upsert_requires_collection() {
    let db = Arc::new(MockDatabase::new());
    let manager = manager_over(&db, config()).await;

    let err = manager
        .upsert_data(
            &[vec![0.1]],
            &[row(json!({"id": 1}))],
            &WriteOptions::from_config(manager.config()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::CollectionNotFound(_)));
}

#[tokio::test]
async fn test_delete_data() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, manual_pk_schema()));
    let manager = manager_over(&db, config()).await;
    let options = WriteOptions::from_config(manager.config());

    let embeddings = vec![vec![0.0; 3]; 3];
    let metadata = vec![row(json!({"id": 1})), row(json!({"id": 2})), row(json!({"id": 3}))];
    manager
        .insert_data(&embeddings, Some(&metadata), &options)
        .await
        .unwrap();

    assert!(matches!(
        manager.delete_data("  ").await,
        Err(Error::InvalidInput(_))
    ));
    assert_eq!(manager.delete_data("id in [1, 3]").await.unwrap(), 2);
    assert_eq!(db.row_count(COLLECTION), 1);
}

#[tokio::test]
async fn test_delete_data_requires_collection() {
    let db = Arc::new(MockDatabase::new());
    let manager = manager_over(&db, config()).await;
    assert!(matches!(
        manager.delete_data("pk in [1]").await,
        Err(Error::CollectionNotFound(_))
    ));
}

#[tokio::test]
async fn test_alias_is_unique_per_manager() {
    let db = Arc::new(MockDatabase::new());
    let first = manager_over(&db, config()).await;
    let second = manager_over(&db, config()).await;

    assert!(first.alias().starts_with("docs-"));
    assert_ne!(first.alias(), second.alias());
    assert_eq!(first.info().await.alias, first.alias());
}

#[tokio::test]
async fn test_with_timeout_elapses() {
    let result: Result<()> = with_timeout(Some(10), std::future::pending()).await;
    assert!(matches!(result, Err(Error::Timeout(10))));

    let result = with_timeout(None, async { Ok(5) }).await;
    assert_eq!(result.unwrap(), 5);
}

#[tokio::test]
async fn test_extract_fields_and_search_params_on_demand() {
    let db = Arc::new(MockDatabase::new());
    let manager = manager_over(&db, config()).await;

    // Nothing attached, nothing to do
    manager.extract_fields().await.unwrap();
    manager.create_search_params().await.unwrap();
    assert!(manager.fields().await.is_empty());
    assert_eq!(manager.search_params().await, None);
}

#[tokio::test]
async fn test_recreated_collection_derives_fresh_search_params() {
    let ivf = IndexDescription {
        field_name: "embedding".to_string(),
        index_name: "embedding".to_string(),
        index_type: Some(IndexType::IvfFlat),
        metric_type: Some(MetricType::L2),
    };
    let db = Arc::new(
        MockDatabase::new()
            .with_collection(COLLECTION, auto_id_schema())
            .with_index(COLLECTION, ivf),
    );
    let manager = manager_over(&db, config()).await;
    assert_eq!(
        manager.search_params().await,
        Some(SearchParams::default_for(IndexType::IvfFlat))
    );

    manager.delete_collection(false).await.unwrap();

    let index = manager.get_index().await.unwrap().unwrap();
    assert_eq!(index.index_type, Some(IndexType::Hnsw));
    assert_eq!(
        manager.search_params().await,
        Some(SearchParams::default_for(IndexType::Hnsw))
    );
}

#[tokio::test]
async fn test_drop_resets_derived_index_and_search_params() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    db.fail_index_type(IndexType::Hnsw);
    let manager = manager_over(&db, config()).await;
    assert_eq!(
        manager.index_params().await,
        Some(IndexParams::auto_index(MetricType::L2))
    );

    manager.delete_collection(true).await.unwrap();
    assert_eq!(manager.index_params().await, None);
    assert_eq!(manager.search_params().await, None);
}

#[tokio::test]
async fn test_truncate_after_external_drop_keeps_schema() {
    let db = Arc::new(MockDatabase::new().with_collection(COLLECTION, auto_id_schema()));
    let manager = manager_over(&db, config()).await;

    db.drop_collection(COLLECTION).await.unwrap();
    manager.delete_collection(false).await.unwrap();

    assert!(manager.has_collection().await);
    assert_eq!(
        db.describe_collection(COLLECTION).await.unwrap(),
        auto_id_schema()
    );
    assert_eq!(manager.fields().await.len(), 3);
    // Only the external drop reached the database
    assert_eq!(db.drop_calls(), 1);
}

#[tokio::test]
async fn test_first_insert_ignores_primary_key_in_metadata() {
    let db = Arc::new(MockDatabase::new());
    let manager = manager_over(&db, config()).await;

    let ids = manager
        .insert_data(
            &[vec![0.1, 0.2, 0.3]],
            Some(&[row(json!({"pk": 99, "source": "a.txt"}))]),
            &WriteOptions::from_config(manager.config()),
        )
        .await
        .unwrap();

    assert_eq!(ids, vec![PrimaryKey::Int(1)]);
    let schema = db.describe_collection(COLLECTION).await.unwrap();
    assert_eq!(schema.fields.len(), 3);
    assert_eq!(db.rows(COLLECTION)[0].get(DEFAULT_PK_FIELD), Some(&json!(1)));
}

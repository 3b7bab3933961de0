//! Lifecycle management for a single collection
//!
//! [`CollectionManager`] owns the local view of one remote collection: the
//! handle, the field registry discovered from its schema and the index and
//! search parameters in use. All of that state sits behind one async mutex;
//! public operations lock it once and work through `*_locked` helpers so
//! nested steps never re-acquire it.

use crate::client::{CreateCollection, PrimaryKey, Row, VectorDatabase};
use crate::factory::create_database_client;
use indicatif::{ProgressBar, ProgressStyle};
use milvus_manager_core::{
    CollectionSchema, Error, FieldRegistry, IndexDescription, IndexParams, IndexType,
    ManagerConfig, Result, SearchParams,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Field names used when a collection is created without preferences
pub const DEFAULT_PK_FIELD: &str = "pk";
pub const DEFAULT_VECTOR_FIELD: &str = "vector";

/// Options for a single insert or upsert call
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Rows per request
    pub batch_size: usize,
    /// Per-request timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Draw a progress bar on stderr
    pub progress_bar: bool,
    /// Target partition, the default partition when `None`
    pub partition: Option<String>,
}

impl WriteOptions {
    /// Options taking batch size and timeout from the manager configuration
    pub fn from_config(config: &ManagerConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            timeout_ms: config.timeout_ms,
            progress_bar: false,
            partition: None,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_progress_bar(mut self, enabled: bool) -> Self {
        self.progress_bar = enabled;
        self
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }
}

/// Snapshot of the manager's view of its collection
#[derive(Debug, Clone, Serialize)]
pub struct CollectionInfo {
    pub collection_name: String,
    pub alias: String,
    pub attached: bool,
    pub pk_field: Option<String>,
    pub vector_field: Option<String>,
    pub auto_id: Option<bool>,
    pub fields: FieldRegistry,
    pub index_params: Option<IndexParams>,
    pub search_params: Option<SearchParams>,
}

/// Exclusive reference to the remote collection
#[derive(Debug)]
struct CollectionHandle {
    name: String,
    schema: CollectionSchema,
}

#[derive(Debug, Default)]
struct CollectionState {
    collection: Option<CollectionHandle>,
    /// Schema of the last dropped collection, reused when recreating it
    last_schema: Option<CollectionSchema>,
    pk_field: Option<String>,
    vector_field: Option<String>,
    auto_id: Option<bool>,
    fields: FieldRegistry,
    index_params: Option<IndexParams>,
    search_params: Option<SearchParams>,
}

/// Sample data a new collection's schema can be derived from
struct Sample<'a> {
    embeddings: &'a [Vec<f32>],
    metadata: Option<&'a [Row]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteKind {
    Insert,
    Upsert,
}

impl WriteKind {
    fn verb(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Upsert => "upsert",
        }
    }
}

/// Manages the lifecycle of one collection in the vector database
pub struct CollectionManager {
    config: ManagerConfig,
    alias: String,
    client: Arc<dyn VectorDatabase>,
    state: Mutex<CollectionState>,
}

impl CollectionManager {
    /// Create a manager over the given database client
    ///
    /// Drops the existing collection first when `drop_old` is set, then
    /// attaches to the collection if it exists remotely.
    pub async fn new(config: ManagerConfig, client: Arc<dyn VectorDatabase>) -> Result<Self> {
        config.validate()?;

        let state = CollectionState {
            pk_field: config.pk_field.clone(),
            vector_field: config.vector_field.clone(),
            index_params: config.index_params.clone(),
            search_params: config.search_params.clone(),
            ..Default::default()
        };

        let manager = Self {
            alias: generate_alias(&config.collection_name),
            config,
            client,
            state: Mutex::new(state),
        };

        if manager.config.drop_old {
            manager.delete_collection(true).await?;
        }

        if manager
            .client
            .has_collection(&manager.config.collection_name)
            .await?
        {
            manager.init_existing().await?;
        }

        Ok(manager)
    }

    /// Create a manager talking to the REST endpoint named in the configuration
    pub async fn from_config(config: ManagerConfig) -> Result<Self> {
        let client = create_database_client(&config)?;
        Self::new(config, client).await
    }

    /// Session identifier of this manager, recorded on every span
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn collection_name(&self) -> &str {
        &self.config.collection_name
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Whether a collection handle is currently held
    pub async fn has_collection(&self) -> bool {
        self.state.lock().await.collection.is_some()
    }

    pub async fn pk_field(&self) -> Option<String> {
        self.state.lock().await.pk_field.clone()
    }

    pub async fn vector_field(&self) -> Option<String> {
        self.state.lock().await.vector_field.clone()
    }

    pub async fn auto_id(&self) -> Option<bool> {
        self.state.lock().await.auto_id
    }

    pub async fn fields(&self) -> FieldRegistry {
        self.state.lock().await.fields.clone()
    }

    pub async fn index_params(&self) -> Option<IndexParams> {
        self.state.lock().await.index_params.clone()
    }

    pub async fn search_params(&self) -> Option<SearchParams> {
        self.state.lock().await.search_params.clone()
    }

    pub async fn info(&self) -> CollectionInfo {
        let state = self.state.lock().await;
        CollectionInfo {
            collection_name: self.config.collection_name.clone(),
            alias: self.alias.clone(),
            attached: state.collection.is_some(),
            pk_field: state.pk_field.clone(),
            vector_field: state.vector_field.clone(),
            auto_id: state.auto_id,
            fields: state.fields.clone(),
            index_params: state.index_params.clone(),
            search_params: state.search_params.clone(),
        }
    }

    /// Drop the remote collection and, unless `drop_collection`, recreate it empty
    ///
    /// The recreated collection reuses the dropped collection's schema.
    #[instrument(skip(self), fields(collection = %self.config.collection_name, alias = %self.alias))]
    pub async fn delete_collection(&self, drop_collection: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        let name = self.config.collection_name.as_str();

        let exists = self.client.has_collection(name).await?;
        let held = state.collection.take().map(|handle| handle.schema);
        if exists {
            let schema = match held {
                Some(schema) => schema,
                None => self.client.describe_collection(name).await?,
            };
            self.client.drop_collection(name).await?;
            state.last_schema = Some(schema);
            info!("Dropped collection {name}");
        } else if let Some(schema) = held {
            debug!("Collection {name} was already gone remotely");
            state.last_schema = Some(schema);
        }
        state.fields.clear();
        state.auto_id = None;
        // Parameters derived for the old index do not carry over
        state.index_params = self.config.index_params.clone();
        state.search_params = self.config.search_params.clone();

        if !drop_collection {
            self.init_locked(&mut state, None).await?;
        }
        Ok(())
    }

    /// Attach to or create the collection, then index and load it
    #[instrument(skip(self), fields(collection = %self.config.collection_name, alias = %self.alias))]
    pub async fn init(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.init_locked(&mut state, None).await
    }

    /// Attach to the existing remote collection, then index and load it
    #[instrument(skip(self), fields(collection = %self.config.collection_name, alias = %self.alias))]
    pub async fn init_existing(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.attach_locked(&mut state).await?;
        self.prepare_locked(&mut state).await
    }

    /// Build an index on the vector field unless one exists
    ///
    /// A database-reported failure with the configured (or default HNSW)
    /// parameters is retried exactly once with an AUTOINDEX index; a second
    /// failure is returned. The retry keeps the metric of the failed attempt
    /// rather than resetting it to L2.
    #[instrument(skip(self), fields(collection = %self.config.collection_name, alias = %self.alias))]
    pub async fn create_index(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.create_index_locked(&mut state).await
    }

    /// Rebuild the field registry from the attached collection's schema
    ///
    /// Configured pk and vector field names are replaced by the ones the
    /// schema declares.
    #[instrument(skip(self), fields(collection = %self.config.collection_name, alias = %self.alias))]
    pub async fn extract_fields(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.extract_fields_locked(&mut state)
    }

    /// Derive search parameters from the vector index unless configured
    pub async fn create_search_params(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        self.create_search_params_locked(&mut state).await
    }

    /// The index built on the vector field, if any
    pub async fn get_index(&self) -> Result<Option<IndexDescription>> {
        let state = self.state.lock().await;
        self.get_index_locked(&state).await
    }

    /// Insert embeddings with optional per-row metadata, returning the new ids
    ///
    /// Creates the collection from the first row when none exists.
    #[instrument(
        skip(self, embeddings, metadata, options),
        fields(collection = %self.config.collection_name, alias = %self.alias, rows = embeddings.len())
    )]
    pub async fn insert_data(
        &self,
        embeddings: &[Vec<f32>],
        metadata: Option<&[Row]>,
        options: &WriteOptions,
    ) -> Result<Vec<PrimaryKey>> {
        if let Some(metadata) = metadata {
            if metadata.len() != embeddings.len() {
                return Err(Error::invalid_input(format!(
                    "{} embeddings but {} metadata rows",
                    embeddings.len(),
                    metadata.len()
                )));
            }
        }
        if embeddings.is_empty() {
            return Ok(Vec::new());
        }

        let mut state = self.state.lock().await;
        if state.collection.is_none() {
            let sample = Sample {
                embeddings,
                metadata,
            };
            self.init_locked(&mut state, Some(sample)).await?;
        }

        let rows = build_rows(&state, embeddings, metadata, WriteKind::Insert)?;
        let name = attached_name(&state)?;
        self.write_batches(&name, rows, options, WriteKind::Insert)
            .await
    }

    /// Insert or replace rows by primary key
    ///
    /// Every metadata row must carry the primary key. Collections with
    /// auto-generated ids cannot be upserted into.
    #[instrument(
        skip(self, embeddings, metadata, options),
        fields(collection = %self.config.collection_name, alias = %self.alias, rows = embeddings.len())
    )]
    pub async fn upsert_data(
        &self,
        embeddings: &[Vec<f32>],
        metadata: &[Row],
        options: &WriteOptions,
    ) -> Result<Vec<PrimaryKey>> {
        if metadata.len() != embeddings.len() {
            return Err(Error::invalid_input(format!(
                "{} embeddings but {} metadata rows",
                embeddings.len(),
                metadata.len()
            )));
        }
        if embeddings.is_empty() {
            return Ok(Vec::new());
        }

        let state = self.state.lock().await;
        let name = attached_name(&state)?;
        if state.auto_id == Some(true) {
            return Err(Error::not_supported(format!(
                "upsert into collection {name} whose primary key is auto-generated"
            )));
        }

        let rows = build_rows(&state, embeddings, Some(metadata), WriteKind::Upsert)?;
        self.write_batches(&name, rows, options, WriteKind::Upsert)
            .await
    }

    /// Delete every entity matching a boolean filter expression
    #[instrument(skip(self), fields(collection = %self.config.collection_name, alias = %self.alias))]
    pub async fn delete_data(&self, expression: &str) -> Result<u64> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(Error::invalid_input("delete expression must not be empty"));
        }

        let state = self.state.lock().await;
        let name = attached_name(&state)?;
        let deleted = with_timeout(
            self.config.timeout_ms,
            self.client.delete(&name, None, expression),
        )
        .await?;
        info!("Deleted {deleted} entities from {name}");
        Ok(deleted)
    }

    async fn init_locked(
        &self,
        state: &mut CollectionState,
        sample: Option<Sample<'_>>,
    ) -> Result<()> {
        if state.collection.is_none() {
            let name = self.config.collection_name.as_str();
            if !self.client.has_collection(name).await? {
                let schema = self.schema_for_new_collection(state, sample)?;
                self.client
                    .create_collection(&CreateCollection {
                        collection_name: name.to_string(),
                        schema,
                        shards: self.config.shards,
                        consistency_level: self.config.consistency_level,
                    })
                    .await?;
                info!(
                    "Created collection {name} with {} shards ({} consistency)",
                    self.config.shards, self.config.consistency_level
                );
            }
            self.attach_locked(state).await?;
        }

        self.create_partitions_locked(state).await?;
        self.prepare_locked(state).await
    }

    /// Fields, index, search parameters and load, in that order
    async fn prepare_locked(&self, state: &mut CollectionState) -> Result<()> {
        self.extract_fields_locked(state)?;
        self.create_index_locked(state).await?;
        self.create_search_params_locked(state).await?;
        self.load_locked(state).await
    }

    async fn attach_locked(&self, state: &mut CollectionState) -> Result<()> {
        let name = self.config.collection_name.clone();
        let schema = self.client.describe_collection(&name).await?;
        debug!("Attached to collection {name} with {} fields", schema.fields.len());
        state.collection = Some(CollectionHandle { name, schema });
        Ok(())
    }

    fn schema_for_new_collection(
        &self,
        state: &CollectionState,
        sample: Option<Sample<'_>>,
    ) -> Result<CollectionSchema> {
        if let Some(schema) = &state.last_schema {
            return Ok(schema.clone());
        }

        let pk = state.pk_field.as_deref().unwrap_or(DEFAULT_PK_FIELD);
        let vector = state.vector_field.as_deref().unwrap_or(DEFAULT_VECTOR_FIELD);

        if let Some(sample) = sample {
            let dim = sample.embeddings.first().map(Vec::len).unwrap_or(0);
            let metadata = sample.metadata.and_then(|rows| rows.first());
            return CollectionSchema::from_sample(pk, vector, dim, metadata);
        }

        match self.config.dimension {
            Some(dim) => CollectionSchema::from_sample(pk, vector, dim, None),
            None => Err(Error::invalid_input(format!(
                "cannot create collection {} without sample data or a configured dimension",
                self.config.collection_name
            ))),
        }
    }

    async fn create_partitions_locked(&self, state: &CollectionState) -> Result<()> {
        let Some(handle) = &state.collection else {
            return Ok(());
        };
        for partition in &self.config.partitions {
            if !self.client.has_partition(&handle.name, partition).await? {
                self.client.create_partition(&handle.name, partition).await?;
                debug!("Created partition {partition} in {}", handle.name);
            }
        }
        Ok(())
    }

    /// Rebuild the field registry from the attached schema
    fn extract_fields_locked(&self, state: &mut CollectionState) -> Result<()> {
        let Some(handle) = &state.collection else {
            return Ok(());
        };
        let schema = handle.schema.clone();

        state.fields.clear();
        for field in &schema.fields {
            if field.is_primary {
                if let Some(configured) = state.pk_field.as_deref().filter(|p| *p != field.name) {
                    debug!(
                        "Replacing pk_field '{configured}' with '{}' from collection",
                        field.name
                    );
                }
                state.pk_field = Some(field.name.clone());
                state.auto_id = Some(field.auto_id);
            }
            if field.data_type.is_vector() {
                if let Some(configured) =
                    state.vector_field.as_deref().filter(|v| *v != field.name)
                {
                    debug!(
                        "Replacing vector_field '{configured}' with '{}' from collection",
                        field.name
                    );
                }
                state.vector_field = Some(field.name.clone());
            }
            state.fields.insert(field.name.clone(), field.data_type);
        }

        if schema.primary_field().is_none() {
            return Err(Error::schema_mismatch(format!(
                "collection {} has no primary key field",
                handle_name(state)
            )));
        }
        if schema.vector_field().is_none() {
            return Err(Error::schema_mismatch(format!(
                "collection {} has no vector field",
                handle_name(state)
            )));
        }
        Ok(())
    }

    async fn get_index_locked(&self, state: &CollectionState) -> Result<Option<IndexDescription>> {
        let (Some(handle), Some(vector_field)) = (&state.collection, &state.vector_field) else {
            return Ok(None);
        };
        let indexes = self.client.describe_indexes(&handle.name).await?;
        Ok(indexes
            .into_iter()
            .find(|index| &index.field_name == vector_field))
    }

    async fn create_index_locked(&self, state: &mut CollectionState) -> Result<()> {
        let Some(handle) = &state.collection else {
            return Ok(());
        };
        let name = handle.name.clone();

        if self.get_index_locked(state).await?.is_some() {
            debug!("Collection {name} already has an index on its vector field");
            return Ok(());
        }

        let field = state
            .vector_field
            .clone()
            .ok_or_else(|| Error::schema_mismatch(format!("collection {name} has no vector field")))?;
        let params = state
            .index_params
            .get_or_insert_with(IndexParams::default_hnsw)
            .clone();

        let result = match self.client.create_index(&name, &field, &params).await {
            Err(e) if e.is_database() => {
                // Most likely a managed deployment that only accepts AUTOINDEX
                warn!(
                    "Index type {} rejected on {name} ({e}), falling back to AUTOINDEX",
                    params.index_type
                );
                let fallback = IndexParams::auto_index(params.metric_type);
                state.index_params = Some(fallback.clone());
                self.client.create_index(&name, &field, &fallback).await
            }
            other => other,
        };

        match result {
            Ok(()) => {
                debug!("Successfully created an index on collection: {name}");
                Ok(())
            }
            Err(e) => {
                if e.is_database() {
                    error!("Failed to create an index on collection: {name}");
                }
                Err(e)
            }
        }
    }

    async fn create_search_params_locked(&self, state: &mut CollectionState) -> Result<()> {
        if state.search_params.is_some() {
            return Ok(());
        }
        let Some(index) = self.get_index_locked(state).await? else {
            return Ok(());
        };

        let index_type = index
            .index_type
            .or_else(|| state.index_params.as_ref().map(|p| p.index_type))
            .unwrap_or(IndexType::AutoIndex);
        let mut params = SearchParams::default_for(index_type);
        if let Some(metric) = index.metric_type {
            params.metric_type = metric;
        }
        debug!("Using {index_type} search params {:?}", params.params);
        state.search_params = Some(params);
        Ok(())
    }

    async fn load_locked(&self, state: &CollectionState) -> Result<()> {
        let Some(handle) = &state.collection else {
            return Ok(());
        };
        self.client
            .load_collection(&handle.name, self.config.replica_count)
            .await?;
        info!(
            "Loaded collection {} with {} replicas",
            handle.name, self.config.replica_count
        );
        Ok(())
    }

    async fn write_batches(
        &self,
        collection: &str,
        rows: Vec<Row>,
        options: &WriteOptions,
        kind: WriteKind,
    ) -> Result<Vec<PrimaryKey>> {
        let batch_size = options.batch_size.max(1);
        let total = rows.len();
        let progress = options.progress_bar.then(|| progress_bar(total, kind));
        let partition = options.partition.as_deref();

        let mut ids = Vec::with_capacity(total);
        let mut rows = rows.into_iter().peekable();
        while rows.peek().is_some() {
            let batch: Vec<Row> = rows.by_ref().take(batch_size).collect();
            let count = batch.len();

            let written = match kind {
                WriteKind::Insert => {
                    with_timeout(
                        options.timeout_ms,
                        self.client.insert(collection, partition, batch),
                    )
                    .await
                }
                WriteKind::Upsert => {
                    with_timeout(
                        options.timeout_ms,
                        self.client.upsert(collection, partition, batch),
                    )
                    .await
                }
            };

            match written {
                Ok(batch_ids) => ids.extend(batch_ids),
                Err(e) => {
                    if let Some(pb) = &progress {
                        pb.abandon();
                    }
                    error!(
                        "Failed to {} batch into {collection} after {} of {total} rows: {e}",
                        kind.verb(),
                        ids.len()
                    );
                    return Err(e);
                }
            }
            if let Some(pb) = &progress {
                pb.inc(count as u64);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        debug!("{} {} rows into {collection}", kind.verb(), ids.len());
        Ok(ids)
    }
}

/// Unique session identifier for one manager instance
fn generate_alias(collection_name: &str) -> String {
    format!("{collection_name}-{}", Uuid::new_v4().simple())
}

fn attached_name(state: &CollectionState) -> Result<String> {
    state
        .collection
        .as_ref()
        .map(|handle| handle.name.clone())
        .ok_or_else(|| Error::collection_not_found("no collection is attached"))
}

fn handle_name(state: &CollectionState) -> &str {
    state
        .collection
        .as_ref()
        .map(|handle| handle.name.as_str())
        .unwrap_or_default()
}

/// Turn embeddings and metadata into rows matching the attached schema
fn build_rows(
    state: &CollectionState,
    embeddings: &[Vec<f32>],
    metadata: Option<&[Row]>,
    kind: WriteKind,
) -> Result<Vec<Row>> {
    let handle = state
        .collection
        .as_ref()
        .ok_or_else(|| Error::collection_not_found("no collection is attached"))?;
    let vector_field = state
        .vector_field
        .as_deref()
        .ok_or_else(|| Error::schema_mismatch("collection has no vector field"))?;
    let pk_field = state
        .pk_field
        .as_deref()
        .ok_or_else(|| Error::schema_mismatch("collection has no primary key field"))?;
    let auto_id = state.auto_id.unwrap_or(false);
    let dim = handle.schema.field(vector_field).and_then(|f| f.dim);
    let dynamic = handle.schema.enable_dynamic_field;

    embeddings
        .iter()
        .enumerate()
        .map(|(i, embedding)| {
            if let Some(dim) = dim {
                if embedding.len() != dim {
                    return Err(Error::schema_mismatch(format!(
                        "row {i}: embedding has {} dimensions, collection expects {dim}",
                        embedding.len()
                    )));
                }
            }

            let mut row = Row::new();
            if let Some(meta) = metadata.and_then(|m| m.get(i)) {
                for (key, value) in meta {
                    if key == vector_field {
                        return Err(Error::invalid_input(format!(
                            "row {i}: metadata must not set the vector field '{key}'"
                        )));
                    }
                    if key == pk_field && auto_id {
                        debug!("Ignoring '{key}' in row {i}, ids are auto-generated");
                        continue;
                    }
                    if state.fields.contains(key) || dynamic {
                        row.insert(key.clone(), value.clone());
                    } else {
                        debug!("Dropping metadata key '{key}' not in the collection schema");
                    }
                }
            }

            if !auto_id && !row.contains_key(pk_field) {
                return Err(Error::invalid_input(format!(
                    "row {i}: primary key '{pk_field}' is required to {}",
                    kind.verb()
                )));
            }

            row.insert(vector_field.to_string(), serde_json::Value::from(embedding.clone()));
            Ok(row)
        })
        .collect()
}

async fn with_timeout<T, F>(timeout_ms: Option<u64>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout_ms {
        Some(ms) => tokio::time::timeout(Duration::from_millis(ms), fut)
            .await
            .map_err(|_| Error::Timeout(ms))?,
        None => fut.await,
    }
}

fn progress_bar(total: usize, kind: WriteKind) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} ({eta})") {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(kind.verb());
    pb
}

#[cfg(test)]
mod tests;

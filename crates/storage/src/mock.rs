//! In-memory database for tests and offline runs

use crate::client::{CreateCollection, PrimaryKey, Row, VectorDatabase};
use async_trait::async_trait;
use milvus_manager_core::{
    CollectionSchema, Error, IndexDescription, IndexParams, IndexType, Result,
};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

const DEFAULT_PARTITION: &str = "_default";

// Error codes mirroring the ones the real server reports
const CODE_COLLECTION_NOT_FOUND: i64 = 100;
const CODE_INDEX_NOT_FOUND: i64 = 700;
const CODE_INVALID_PARAMETER: i64 = 1100;
const CODE_UNEXPECTED: i64 = 65535;

/// In-memory collection
#[derive(Debug, Clone)]
struct MockCollection {
    schema: CollectionSchema,
    indexes: Vec<IndexDescription>,
    partitions: Vec<String>,
    loaded_replicas: Option<u32>,
    rows: Vec<(String, Row)>,
    next_id: i64,
}

impl MockCollection {
    fn new(schema: CollectionSchema) -> Self {
        Self {
            schema,
            indexes: Vec::new(),
            partitions: vec![DEFAULT_PARTITION.to_string()],
            loaded_replicas: None,
            rows: Vec::new(),
            next_id: 1,
        }
    }

    fn pk_name(&self) -> Result<String> {
        self.schema
            .primary_field()
            .map(|f| f.name.clone())
            .ok_or_else(|| Error::database(CODE_UNEXPECTED, "collection has no primary key"))
    }

    fn check_partition(&self, partition: Option<&str>) -> Result<String> {
        let partition = partition.unwrap_or(DEFAULT_PARTITION);
        if self.partitions.iter().any(|p| p == partition) {
            Ok(partition.to_string())
        } else {
            Err(Error::database(
                CODE_INVALID_PARAMETER,
                format!("partition not found[partition={partition}]"),
            ))
        }
    }

    /// Validates a row against the schema the way the server would
    fn check_row(&self, row: &Row, expect_pk: bool) -> Result<()> {
        for field in &self.schema.fields {
            if field.is_primary {
                match (row.contains_key(&field.name), expect_pk) {
                    (true, false) => {
                        return Err(Error::database(
                            CODE_INVALID_PARAMETER,
                            format!("field {} is auto generated and must not be set", field.name),
                        ))
                    }
                    (false, true) => {
                        return Err(Error::database(
                            CODE_INVALID_PARAMETER,
                            format!("missing primary key field {}", field.name),
                        ))
                    }
                    _ => {}
                }
                continue;
            }

            let Some(value) = row.get(&field.name) else {
                return Err(Error::database(
                    CODE_INVALID_PARAMETER,
                    format!("missing field {}", field.name),
                ));
            };

            if let (true, Some(dim)) = (field.data_type.is_vector(), field.dim) {
                let actual = value.as_array().map(Vec::len).unwrap_or(0);
                if actual != dim {
                    return Err(Error::database(
                        CODE_INVALID_PARAMETER,
                        format!("the dim ({actual}) of field {} must be {dim}", field.name),
                    ));
                }
            }
        }

        if !self.schema.enable_dynamic_field {
            if let Some(unknown) = row.keys().find(|k| self.schema.field(k).is_none()) {
                return Err(Error::database(
                    CODE_INVALID_PARAMETER,
                    format!("field {unknown} does not exist in the schema"),
                ));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
struct MockState {
    collections: HashMap<String, MockCollection>,
    failing_index_types: HashSet<IndexType>,
    create_index_calls: usize,
    create_collection_calls: usize,
    drop_calls: usize,
}

/// In-memory implementation of [`VectorDatabase`]
///
/// Collections, indexes, partitions and rows are kept in process memory.
/// Index creation can be made to fail for chosen index types to exercise
/// fallback paths.
#[derive(Debug, Default)]
pub struct MockDatabase {
    state: Mutex<MockState>,
}

impl MockDatabase {
    /// Create an empty mock database
    pub fn new() -> Self {
        Self::default()
    }

    /// State guard; a panic in another holder leaves the maps usable
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an existing collection without going through the create path
    pub fn with_collection(self, name: &str, schema: CollectionSchema) -> Self {
        self.lock()
            .collections
            .insert(name.to_string(), MockCollection::new(schema));
        self
    }

    /// Register an index on an existing collection
    pub fn with_index(self, collection: &str, index: IndexDescription) -> Self {
        if let Some(c) = self.lock().collections.get_mut(collection) {
            c.indexes.push(index);
        }
        self
    }

    /// Make `create_index` reject the given index type with a database error
    pub fn fail_index_type(&self, index_type: IndexType) {
        self.lock()
            .failing_index_types
            .insert(index_type);
    }

    /// Number of `create_index` calls received
    pub fn create_index_calls(&self) -> usize {
        self.lock().create_index_calls
    }

    /// Number of `create_collection` calls received
    pub fn create_collection_calls(&self) -> usize {
        self.lock().create_collection_calls
    }

    /// Number of `drop_collection` calls received
    pub fn drop_calls(&self) -> usize {
        self.lock().drop_calls
    }

    /// Whether the collection currently exists
    pub fn contains(&self, collection: &str) -> bool {
        self.lock()
            .collections
            .contains_key(collection)
    }

    /// Number of stored rows, 0 for unknown collections
    pub fn row_count(&self, collection: &str) -> usize {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.rows.len())
            .unwrap_or(0)
    }

    /// Stored rows in insertion order
    pub fn rows(&self, collection: &str) -> Vec<Row> {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.rows.iter().map(|(_, row)| row.clone()).collect())
            .unwrap_or_default()
    }

    /// Stored rows of one partition
    pub fn partition_rows(&self, collection: &str, partition: &str) -> Vec<Row> {
        self.lock()
            .collections
            .get(collection)
            .map(|c| {
                c.rows
                    .iter()
                    .filter(|(p, _)| p == partition)
                    .map(|(_, row)| row.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Indexes built on the collection
    pub fn indexes(&self, collection: &str) -> Vec<IndexDescription> {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.indexes.clone())
            .unwrap_or_default()
    }

    /// Partitions of the collection, including the default one
    pub fn partitions(&self, collection: &str) -> Vec<String> {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.partitions.clone())
            .unwrap_or_default()
    }

    /// Replica count the collection was loaded with, `None` if not loaded
    pub fn loaded_replicas(&self, collection: &str) -> Option<u32> {
        self.lock()
            .collections
            .get(collection)
            .and_then(|c| c.loaded_replicas)
    }

    fn not_found(collection: &str) -> Error {
        Error::database(
            CODE_COLLECTION_NOT_FOUND,
            format!("can't find collection[collection={collection}]"),
        )
    }
}

/// Parses `pk in [a, b]` or `pk == a` into the field name and key values
fn parse_pk_filter(filter: &str) -> Option<(String, Vec<Value>)> {
    let filter = filter.trim();

    if let Some((field, values)) = filter.split_once(" in ") {
        let values = values.trim().strip_prefix('[')?.strip_suffix(']')?;
        let parsed = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(parse_literal)
            .collect::<Option<Vec<_>>>()?;
        return Some((field.trim().to_string(), parsed));
    }

    let (field, value) = filter.split_once("==")?;
    Some((field.trim().to_string(), vec![parse_literal(value.trim())?]))
}

fn parse_literal(literal: &str) -> Option<Value> {
    if let Ok(n) = literal.parse::<i64>() {
        return Some(Value::from(n));
    }
    ['"', '\'']
        .iter()
        .find_map(|q| literal.strip_prefix(*q)?.strip_suffix(*q))
        .map(Value::from)
}

#[async_trait]
impl VectorDatabase for MockDatabase {
    async fn has_collection(&self, collection: &str) -> Result<bool> {
        Ok(self.contains(collection))
    }

    async fn create_collection(&self, request: &CreateCollection) -> Result<()> {
        let mut state = self.lock();
        state.create_collection_calls += 1;

        if state.collections.contains_key(&request.collection_name) {
            return Err(Error::database(
                CODE_UNEXPECTED,
                format!("collection {} already exists", request.collection_name),
            ));
        }
        if request.schema.primary_field().is_none() {
            return Err(Error::database(
                CODE_INVALID_PARAMETER,
                "schema does not contain primary key field",
            ));
        }
        if request.schema.vector_field().is_none() {
            return Err(Error::database(
                CODE_INVALID_PARAMETER,
                "schema does not contain vector field",
            ));
        }

        state.collections.insert(
            request.collection_name.clone(),
            MockCollection::new(request.schema.clone()),
        );
        Ok(())
    }

    async fn describe_collection(&self, collection: &str) -> Result<CollectionSchema> {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.schema.clone())
            .ok_or_else(|| Self::not_found(collection))
    }

    async fn drop_collection(&self, collection: &str) -> Result<()> {
        let mut state = self.lock();
        state.drop_calls += 1;
        state
            .collections
            .remove(collection)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(collection))
    }

    async fn describe_indexes(&self, collection: &str) -> Result<Vec<IndexDescription>> {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.indexes.clone())
            .ok_or_else(|| Self::not_found(collection))
    }

    async fn create_index(
        &self,
        collection: &str,
        field: &str,
        params: &IndexParams,
    ) -> Result<()> {
        let mut state = self.lock();
        state.create_index_calls += 1;

        if state.failing_index_types.contains(&params.index_type) {
            return Err(Error::database(
                CODE_UNEXPECTED,
                format!("invalid index type: {}", params.index_type),
            ));
        }

        let c = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        if c.schema.field(field).is_none() {
            return Err(Error::database(
                CODE_INVALID_PARAMETER,
                format!("cannot create index on non-existed field: {field}"),
            ));
        }
        if c.indexes.iter().any(|i| i.field_name == field) {
            return Err(Error::database(
                CODE_UNEXPECTED,
                "at most one distinct index is allowed per field",
            ));
        }

        c.indexes.push(IndexDescription {
            field_name: field.to_string(),
            index_name: field.to_string(),
            index_type: Some(params.index_type),
            metric_type: Some(params.metric_type),
        });
        Ok(())
    }

    async fn has_partition(&self, collection: &str, partition: &str) -> Result<bool> {
        self.lock()
            .collections
            .get(collection)
            .map(|c| c.partitions.iter().any(|p| p == partition))
            .ok_or_else(|| Self::not_found(collection))
    }

    async fn create_partition(&self, collection: &str, partition: &str) -> Result<()> {
        let mut state = self.lock();
        let c = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        if !c.partitions.iter().any(|p| p == partition) {
            c.partitions.push(partition.to_string());
        }
        Ok(())
    }

    async fn load_collection(&self, collection: &str, replicas: u32) -> Result<()> {
        let mut state = self.lock();
        let c = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;

        let vector_field = c.schema.vector_field().map(|f| f.name.clone());
        let indexed = c
            .indexes
            .iter()
            .any(|i| Some(&i.field_name) == vector_field.as_ref());
        if !indexed {
            return Err(Error::database(
                CODE_INDEX_NOT_FOUND,
                format!("index not found[collection={collection}]"),
            ));
        }

        c.loaded_replicas = Some(replicas);
        Ok(())
    }

    async fn insert(
        &self,
        collection: &str,
        partition: Option<&str>,
        rows: Vec<Row>,
    ) -> Result<Vec<PrimaryKey>> {
        let mut state = self.lock();
        let c = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        let partition = c.check_partition(partition)?;
        let pk = c.pk_name()?;
        let auto_id = c.schema.primary_field().map(|f| f.auto_id).unwrap_or(false);

        for row in &rows {
            c.check_row(row, !auto_id)?;
        }

        let mut ids = Vec::with_capacity(rows.len());
        for mut row in rows {
            if auto_id {
                row.insert(pk.clone(), Value::from(c.next_id));
                c.next_id += 1;
            }
            let id = row.get(&pk).and_then(PrimaryKey::from_value).ok_or_else(|| {
                Error::database(CODE_INVALID_PARAMETER, format!("invalid primary key {pk}"))
            })?;
            ids.push(id);
            c.rows.push((partition.clone(), row));
        }
        Ok(ids)
    }

    async fn upsert(
        &self,
        collection: &str,
        partition: Option<&str>,
        rows: Vec<Row>,
    ) -> Result<Vec<PrimaryKey>> {
        let mut state = self.lock();
        let c = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        let partition = c.check_partition(partition)?;
        let pk = c.pk_name()?;

        if c.schema.primary_field().map(|f| f.auto_id).unwrap_or(false) {
            return Err(Error::database(
                CODE_INVALID_PARAMETER,
                "upsert can not assign primary field data when auto id enabled",
            ));
        }
        for row in &rows {
            c.check_row(row, true)?;
        }

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let key = row.get(&pk).cloned().unwrap_or(Value::Null);
            let id = PrimaryKey::from_value(&key).ok_or_else(|| {
                Error::database(CODE_INVALID_PARAMETER, format!("invalid primary key {pk}"))
            })?;
            c.rows.retain(|(_, existing)| existing.get(&pk) != Some(&key));
            c.rows.push((partition.clone(), row));
            ids.push(id);
        }
        Ok(ids)
    }

    async fn delete(
        &self,
        collection: &str,
        partition: Option<&str>,
        filter: &str,
    ) -> Result<u64> {
        let mut state = self.lock();
        let c = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection))?;
        let partition = partition.map(|_| c.check_partition(partition)).transpose()?;
        let pk = c.pk_name()?;

        let (_, keys) = parse_pk_filter(filter)
            .filter(|(field, _)| *field == pk)
            .ok_or_else(|| {
                Error::database(CODE_INVALID_PARAMETER, format!("invalid expression: {filter}"))
            })?;

        let before = c.rows.len();
        c.rows.retain(|(p, row)| {
            let in_scope = partition.as_ref().map(|target| target == p).unwrap_or(true);
            let matches = row.get(&pk).map(|v| keys.contains(v)).unwrap_or(false);
            !(in_scope && matches)
        });
        Ok((before - c.rows.len()) as u64)
    }
}

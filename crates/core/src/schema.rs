//! Collection schema model and the field registry built from it

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

/// Maximum length used for inferred string fields
pub const DEFAULT_VARCHAR_MAX_LENGTH: u32 = 65_535;

/// Field data types as named by the Milvus REST API
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum DataType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    Double,
    VarChar,
    #[serde(rename = "JSON")]
    #[strum(serialize = "JSON")]
    Json,
    Array,
    BinaryVector,
    FloatVector,
    Float16Vector,
    BFloat16Vector,
    SparseFloatVector,
}

impl DataType {
    /// Dense vector types an index can be built on
    pub fn is_vector(&self) -> bool {
        matches!(
            self,
            Self::FloatVector | Self::BinaryVector | Self::Float16Vector | Self::BFloat16Vector
        )
    }
}

/// A single field of a collection schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub auto_id: bool,
    /// Vector dimension, only meaningful for vector fields
    #[serde(default)]
    pub dim: Option<usize>,
    /// Only meaningful for VarChar fields
    #[serde(default)]
    pub max_length: Option<u32>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_primary: false,
            auto_id: false,
            dim: None,
            max_length: None,
        }
    }

    /// Primary key field, optionally generating its own ids
    pub fn primary(name: impl Into<String>, data_type: DataType, auto_id: bool) -> Self {
        Self {
            is_primary: true,
            auto_id,
            max_length: (data_type == DataType::VarChar).then_some(DEFAULT_VARCHAR_MAX_LENGTH),
            ..Self::new(name, data_type)
        }
    }

    pub fn float_vector(name: impl Into<String>, dim: usize) -> Self {
        Self {
            dim: Some(dim),
            ..Self::new(name, DataType::FloatVector)
        }
    }

    pub fn varchar(name: impl Into<String>, max_length: u32) -> Self {
        Self {
            max_length: Some(max_length),
            ..Self::new(name, DataType::VarChar)
        }
    }
}

/// Schema of a remote collection
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub fields: Vec<FieldSchema>,
    #[serde(default)]
    pub auto_id: bool,
    #[serde(default)]
    pub enable_dynamic_field: bool,
}

impl CollectionSchema {
    /// The field flagged as primary key
    pub fn primary_field(&self) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.is_primary)
    }

    /// The last vector field in declaration order
    pub fn vector_field(&self) -> Option<&FieldSchema> {
        self.fields.iter().rev().find(|f| f.data_type.is_vector())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Builds the schema for a new collection from sample data
    ///
    /// The primary key is an auto-generated `Int64`, the vector field holds
    /// `dim` floats, and every metadata key with an inferable type of the
    /// first sample row becomes a scalar field. A key naming the primary key
    /// is skipped since ids are generated; one naming the vector field is
    /// rejected.
    pub fn from_sample(
        pk_field: &str,
        vector_field: &str,
        dim: usize,
        metadata: Option<&Map<String, Value>>,
    ) -> Result<Self> {
        if dim == 0 {
            return Err(Error::invalid_input("vector dimension must be positive"));
        }
        if pk_field == vector_field {
            return Err(Error::invalid_input(format!(
                "primary key and vector field share the name '{pk_field}'"
            )));
        }

        let mut fields = vec![
            FieldSchema::primary(pk_field, DataType::Int64, true),
            FieldSchema::float_vector(vector_field, dim),
        ];

        if let Some(metadata) = metadata {
            for (key, value) in metadata {
                if key == vector_field {
                    return Err(Error::invalid_input(format!(
                        "metadata must not set the vector field '{key}'"
                    )));
                }
                if key == pk_field {
                    tracing::debug!("Ignoring '{key}' in sample, ids are auto-generated");
                    continue;
                }
                match infer_data_type(value) {
                    Some(DataType::VarChar) => {
                        fields.push(FieldSchema::varchar(key, DEFAULT_VARCHAR_MAX_LENGTH))
                    }
                    Some(data_type) => fields.push(FieldSchema::new(key, data_type)),
                    None => tracing::debug!("Skipping metadata key '{key}' with null sample value"),
                }
            }
        }

        Ok(Self {
            fields,
            auto_id: true,
            enable_dynamic_field: false,
        })
    }
}

/// Maps a JSON metadata value to the field type that stores it
pub fn infer_data_type(value: &Value) -> Option<DataType> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(DataType::Bool),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(DataType::Int64),
        Value::Number(_) => Some(DataType::Double),
        Value::String(_) => Some(DataType::VarChar),
        Value::Array(_) | Value::Object(_) => Some(DataType::Json),
    }
}

/// Insertion-ordered mapping of field name to field type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRegistry {
    fields: IndexMap<String, DataType>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data_type: DataType) {
        self.fields.insert(name.into(), data_type);
    }

    pub fn get(&self, name: &str) -> Option<DataType> {
        self.fields.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DataType)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_data_type_names_match_rest_api() {
        assert_eq!(DataType::Json.to_string(), "JSON");
        assert_eq!(DataType::from_str("FloatVector").unwrap(), DataType::FloatVector);
        let parsed: DataType = serde_json::from_value(json!("JSON")).unwrap();
        assert_eq!(parsed, DataType::Json);
    }

    #[test]
    fn test_vector_types() {
        assert!(DataType::FloatVector.is_vector());
        assert!(DataType::BinaryVector.is_vector());
        assert!(!DataType::SparseFloatVector.is_vector());
        assert!(!DataType::Int64.is_vector());
    }

    #[test]
    fn test_infer_data_type() {
        assert_eq!(infer_data_type(&json!(true)), Some(DataType::Bool));
        assert_eq!(infer_data_type(&json!(42)), Some(DataType::Int64));
        assert_eq!(infer_data_type(&json!(4.2)), Some(DataType::Double));
        assert_eq!(infer_data_type(&json!("text")), Some(DataType::VarChar));
        assert_eq!(infer_data_type(&json!({"a": 1})), Some(DataType::Json));
        assert_eq!(infer_data_type(&json!([1, 2])), Some(DataType::Json));
        assert_eq!(infer_data_type(&Value::Null), None);
    }

    #[test]
    fn test_schema_from_sample() {
        let metadata = json!({"source": "doc.txt", "page": 3, "missing": null});
        let schema = CollectionSchema::from_sample(
            "pk",
            "vector",
            4,
            metadata.as_object(),
        )
        .unwrap();

        let names: Vec<_> = schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["pk", "vector", "page", "source"]);
        assert!(schema.auto_id);
        assert_eq!(schema.primary_field().unwrap().name, "pk");
        assert_eq!(schema.vector_field().unwrap().dim, Some(4));
        assert_eq!(
            schema.field("source").unwrap().max_length,
            Some(DEFAULT_VARCHAR_MAX_LENGTH)
        );
    }

    #[test]
    fn test_schema_from_sample_skips_primary_key() {
        let metadata = json!({"pk": 42, "title": "a"});
        let schema = CollectionSchema::from_sample("pk", "vector", 4, metadata.as_object()).unwrap();

        assert_eq!(schema.fields.len(), 3);
        let pk = schema.primary_field().unwrap();
        assert_eq!(pk.name, "pk");
        assert!(pk.auto_id);
        assert_eq!(schema.field("title").unwrap().data_type, DataType::VarChar);
    }

    #[test]
    fn test_schema_from_sample_rejects_reserved_keys() {
        let metadata = json!({"vector": "oops"});
        let result = CollectionSchema::from_sample("pk", "vector", 4, metadata.as_object());
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = CollectionSchema::from_sample("pk", "vector", 0, None);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_registry_keeps_insertion_order() {
        let mut registry = FieldRegistry::new();
        registry.insert("zeta", DataType::Int64);
        registry.insert("alpha", DataType::FloatVector);
        registry.insert("mid", DataType::VarChar);

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.get("alpha"), Some(DataType::FloatVector));
        assert!(!registry.contains("other"));
    }
}

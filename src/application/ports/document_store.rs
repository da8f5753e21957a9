use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

/// A stored JSON object and its id within a collection
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Deserialize into an entity, exposing the document id as `id`
    pub fn into_entity<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let mut data = self.data;
        data.entry("id".to_string())
            .or_insert_with(|| Value::String(self.id));
        Ok(serde_json::from_value(Value::Object(data))?)
    }

    /// `{ id, ...data }` for pass-through responses
    pub fn into_value(self) -> Value {
        let mut data = self.data;
        data.insert("id".to_string(), Value::String(self.id));
        Value::Object(data)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

/// Serialize an entity to document data; the `id` key is never stored
pub fn to_document_data<T: Serialize>(entity: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(entity)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => Err(StoreError::Internal(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Field {
        field: String,
        op: FilterOp,
        value: Value,
    },
    /// Document id is one of the listed ids
    IdIn(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Filters over top-level fields, with optional ordering and limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Field {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    pub fn id_in(mut self, ids: Vec<String>) -> Self {
        self.filters.push(Filter::IdIn(ids));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// How `set` treats an existing document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Replace,
    Merge,
}

/// Port for document persistence, grouped by collection path
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or overwrite; `Merge` keeps fields absent from `data`
    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
        mode: WriteMode,
    ) -> Result<(), StoreError>;

    /// Shallow-merge `patch` into an existing document
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Insert under `id` only when it is free; returns whether the document was written
    async fn create(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<bool, StoreError>;

    /// Insert with a generated id and return it
    async fn add(&self, collection: &str, data: Map<String, Value>) -> Result<String, StoreError>;

    /// Returns whether a document was removed
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    async fn count(&self, collection: &str, query: &Query) -> Result<usize, StoreError>;

    /// Connectivity check for readiness probes
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Thing {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        id: String,
        name: String,
    }

    #[test]
    fn test_document_round_trip_moves_id() {
        let data = to_document_data(&Thing {
            id: "t1".to_string(),
            name: "lamp".to_string(),
        })
        .unwrap();
        assert!(data.get("id").is_none());

        let thing: Thing = Document::new("t1", data).into_entity().unwrap();
        assert_eq!(thing.id, "t1");
        assert_eq!(thing.name, "lamp");
    }

    #[test]
    fn test_into_value_includes_id() {
        let mut data = Map::new();
        data.insert("name".to_string(), json!("chair"));
        let value = Document::new("c1", data).into_value();
        assert_eq!(value, json!({"id": "c1", "name": "chair"}));
    }

    #[test]
    fn test_query_builder() {
        let query = Query::new()
            .where_eq("userId", "u1")
            .order_by("createdAt", Direction::Desc)
            .limit(10);

        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.order_by, Some(("createdAt".to_string(), Direction::Desc)));
        assert_eq!(query.limit, Some(10));
    }

    #[test]
    fn test_store_error_messages() {
        let err = StoreError::not_found("projects", "p1");
        assert_eq!(err.to_string(), "Document not found: projects/p1");
    }
}

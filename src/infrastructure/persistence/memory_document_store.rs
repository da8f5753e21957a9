use std::cmp::Ordering;
use std::collections::{btree_map, BTreeMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::application::ports::{
    Direction, Document, DocumentStore, Filter, FilterOp, Query, StoreError, WriteMode,
};

type Collection = BTreeMap<String, Map<String, Value>>;

/// Process-local document store for development and tests
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: DashMap<String, Collection>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents across every collection
    pub fn len(&self) -> usize {
        self.collections.iter().map(|c| c.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn matching(&self, collection: &str, query: &Query) -> Vec<Document> {
        let Some(docs) = self.collections.get(collection) else {
            return Vec::new();
        };

        let mut matched: Vec<Document> = docs
            .iter()
            .filter(|(id, data)| query.filters.iter().all(|f| filter_matches(f, id, data)))
            .map(|(id, data)| Document::new(id.clone(), data.clone()))
            .collect();
        drop(docs);

        if let Some((field, direction)) = &query.order_by {
            matched.sort_by(|a, b| {
                let ordering = compare_optional(a.field(field), b.field(field));
                match direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        matched
    }
}

fn filter_matches(filter: &Filter, id: &str, data: &Map<String, Value>) -> bool {
    match filter {
        Filter::IdIn(ids) => ids.iter().any(|candidate| candidate == id),
        Filter::Field { field, op, value } => {
            let Some(actual) = data.get(field) else {
                return false;
            };
            let Some(ordering) = compare_values(actual, value) else {
                return false;
            };
            match op {
                FilterOp::Eq => ordering == Ordering::Equal,
                FilterOp::Gt => ordering == Ordering::Greater,
                FilterOp::Gte => ordering != Ordering::Less,
                FilterOp::Lt => ordering == Ordering::Less,
                FilterOp::Lte => ordering != Ordering::Greater,
            }
        }
    }
}

fn compare_optional(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_values(a, b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Ordering between values of the same JSON type; timestamps compare as instants
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => match (parse_instant(a), parse_instant(b)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => Some(a.cmp(b)),
        },
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            (a == b).then_some(Ordering::Equal)
        }
        _ => None,
    }
}

fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
            .map(|data| Document::new(id, data)))
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        if mode == WriteMode::Merge {
            if let Some(existing) = docs.get_mut(id) {
                existing.extend(data);
                return Ok(());
            }
        }
        docs.insert(id.to_string(), data);
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let mut docs = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        let existing = docs
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        existing.extend(patch);
        Ok(())
    }

    async fn create(
        &self,
        collection: &str,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<bool, StoreError> {
        // The shard lock is held across the check and the insert
        let mut docs = self.collections.entry(collection.to_string()).or_default();
        match docs.entry(id.to_string()) {
            btree_map::Entry::Occupied(_) => Ok(false),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(data);
                Ok(true)
            }
        }
    }

    async fn add(&self, collection: &str, data: Map<String, Value>) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .collections
            .get_mut(collection)
            .is_some_and(|mut docs| docs.remove(id).is_some()))
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        Ok(self.matching(collection, query))
    }

    async fn count(&self, collection: &str, query: &Query) -> Result<usize, StoreError> {
        let unlimited = Query {
            limit: None,
            order_by: None,
            ..query.clone()
        };
        Ok(self.matching(collection, &unlimited).len())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

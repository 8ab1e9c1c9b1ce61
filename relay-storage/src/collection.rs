//! Collection handle: the document-store capability the stores are written against.
//!
//! Implemented by [`SqliteCollection`](crate::SqliteCollection) and
//! [`InMemoryCollection`](crate::InMemoryCollection).

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::object_id::ObjectId;

/// A stored document: always a JSON object.
pub type Document = Value;

/// Primary key of a document. Integer keys sort numerically and before text keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Int(i64),
    Text(String),
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<ObjectId> for Key {
    fn from(value: ObjectId) -> Self {
        Key::Text(value.to_hex())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(v) => write!(f, "{}", v),
            Key::Text(v) => f.write_str(v),
        }
    }
}

/// Scalar a filter condition compares a top-level field against.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl FilterValue {
    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (FilterValue::Bool(expected), Value::Bool(actual)) => expected == actual,
            (FilterValue::Int(expected), Value::Number(actual)) => {
                actual.as_i64() == Some(*expected)
            }
            (FilterValue::Text(expected), Value::String(actual)) => expected == actual,
            _ => false,
        }
    }
}

/// Conjunction of field-equality conditions. An empty filter matches every document;
/// a condition on a missing field never matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, FilterValue)>,
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds `field == value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, FilterValue)] {
        &self.conditions
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            document
                .get(field)
                .is_some_and(|actual| expected.matches(actual))
        })
    }
}

/// Skip/limit window applied after sorting by key ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub skip: u64,
    pub limit: Option<u64>,
}

impl FindOptions {
    pub fn page(skip: u64, limit: u64) -> Self {
        Self {
            skip,
            limit: Some(limit),
        }
    }
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// Named document collection. Failures of the backend are returned as-is.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Collection name (table name for SQLite).
    fn name(&self) -> &str;

    /// Point lookup by primary key.
    async fn find_one(&self, key: &Key) -> Result<Option<Document>>;

    /// Documents matching `filter`, sorted by key ascending, windowed by `options`.
    async fn find(&self, filter: &Filter, options: FindOptions) -> Result<Vec<Document>>;

    /// Number of documents matching `filter`.
    async fn count(&self, filter: &Filter) -> Result<u64>;

    /// Inserts a new document; fails with `AlreadyExists` when the key is taken.
    async fn insert(&self, key: &Key, document: &Document) -> Result<()>;

    /// Replaces the document under `key`, inserting it if absent.
    async fn upsert(&self, key: &Key, document: &Document) -> Result<UpsertOutcome>;

    /// Removes the document under `key`. Returns whether one existed.
    async fn delete(&self, key: &Key) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::all().matches(&json!({})));
        assert!(Filter::all().matches(&json!({"blocked": true})));
    }

    #[test]
    fn test_filter_compares_typed_values() {
        let doc = json!({"blocked": false, "with": 42, "short_id": "-----Eh"});
        assert!(Filter::all().eq("blocked", false).matches(&doc));
        assert!(!Filter::all().eq("blocked", true).matches(&doc));
        assert!(Filter::all().eq("with", 42i64).matches(&doc));
        assert!(!Filter::all().eq("with", "42").matches(&doc));
        assert!(Filter::all()
            .eq("short_id", "-----Eh")
            .eq("with", 42i64)
            .matches(&doc));
    }

    #[test]
    fn test_filter_on_missing_field_never_matches() {
        let doc = json!({"first_name": "Ann"});
        assert!(!Filter::all().eq("blocked", false).matches(&doc));
    }

    #[test]
    fn test_key_order_and_display() {
        assert!(Key::Int(9) < Key::Int(10));
        assert!(Key::Int(i64::MAX) < Key::Text(String::new()));
        assert_eq!(Key::from(-5i64).to_string(), "-5");
        let id = ObjectId::from_parts(1, 1);
        assert_eq!(Key::from(id).to_string(), id.to_hex());
    }
}

//! In-memory [`Collection`] for tests and development.
//!
//! Documents live in an ordered map behind `Arc<RwLock<>>`; clones share the same data.
//! Data is lost when the last clone is dropped.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::collection::{Collection, Document, Filter, FindOptions, Key, UpsertOutcome};
use crate::error::{Result, StorageError};

#[derive(Debug, Clone)]
pub struct InMemoryCollection {
    name: String,
    documents: Arc<RwLock<BTreeMap<Key, Document>>>,
}

impl InMemoryCollection {
    /// Creates a new empty collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Returns the number of documents.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Returns true if the collection holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl Collection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_one(&self, key: &Key) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        let result = documents.get(key).cloned();
        debug!(collection = %self.name, key = %key, found = result.is_some(), "find_one");
        Ok(result)
    }

    async fn find(&self, filter: &Filter, options: FindOptions) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        let result: Vec<Document> = documents
            .values()
            .filter(|doc| filter.matches(doc))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect();
        debug!(collection = %self.name, returned = result.len(), "find");
        Ok(result)
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        let documents = self.documents.read().await;
        let count = documents.values().filter(|doc| filter.matches(doc)).count();
        Ok(count as u64)
    }

    async fn insert(&self, key: &Key, document: &Document) -> Result<()> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(key) {
            return Err(StorageError::AlreadyExists(format!("{}/{}", self.name, key)));
        }
        documents.insert(key.clone(), document.clone());
        info!(collection = %self.name, key = %key, "Inserted document");
        Ok(())
    }

    async fn upsert(&self, key: &Key, document: &Document) -> Result<UpsertOutcome> {
        let mut documents = self.documents.write().await;
        let outcome = match documents.insert(key.clone(), document.clone()) {
            Some(_) => UpsertOutcome::Replaced,
            None => UpsertOutcome::Inserted,
        };
        info!(collection = %self.name, key = %key, outcome = ?outcome, "Upserted document");
        Ok(outcome)
    }

    async fn delete(&self, key: &Key) -> Result<bool> {
        let mut documents = self.documents.write().await;
        let deleted = documents.remove(key).is_some();
        info!(collection = %self.name, key = %key, deleted, "Deleted document");
        Ok(deleted)
    }
}

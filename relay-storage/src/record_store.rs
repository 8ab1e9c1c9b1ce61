//! Generic CRUD and pagination over one collection and one [`Model`].
//!
//! The store caches the collection's record count. `create` and inserting `update`s
//! bump it; `delete` leaves it untouched, so after deletions the cached count
//! overstates the real total. Use a filtered count when an exact number matters.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::collection::{Collection, Filter, FindOptions, UpsertOutcome};
use crate::error::{Result, StorageError};
use crate::models::{from_document, to_document, Model};

/// One page of records plus the number of pages the whole result set spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub total_pages: u64,
    pub records: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty(total_pages: u64) -> Self {
        Self {
            total_pages,
            records: Vec::new(),
        }
    }
}

/// Number of pages needed for `total` items: `ceil(total / page_size)`.
pub fn page_count(total: u64, page_size: u64) -> u64 {
    total / page_size + u64::from(total % page_size != 0)
}

pub(crate) fn ensure_page_size(page_size: u64) -> Result<()> {
    if page_size == 0 {
        return Err(StorageError::Precondition(
            "page size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub struct RecordStore<T: Model> {
    collection: Arc<dyn Collection>,
    count: AtomicU64,
    _model: PhantomData<fn() -> T>,
}

impl<T: Model> RecordStore<T> {
    /// Wraps `collection`, seeding the cached count from a full count.
    pub async fn open(collection: Arc<dyn Collection>) -> Result<Self> {
        let count = collection.count(&Filter::all()).await?;
        info!(collection = collection.name(), count, "Record store opened");
        Ok(Self {
            collection,
            count: AtomicU64::new(count),
            _model: PhantomData,
        })
    }

    pub fn collection(&self) -> &Arc<dyn Collection> {
        &self.collection
    }

    /// Cached record count.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub async fn get_by_id(&self, id: T::Id) -> Result<Option<T>> {
        let document = self.collection.find_one(&id.into()).await?;
        document.map(from_document).transpose()
    }

    /// Every record in key order. Meant for small collections.
    pub async fn get_all(&self) -> Result<Vec<T>> {
        self.find(&Filter::all(), FindOptions::default()).await
    }

    /// Inserts `record`. Key collisions are reported by the collection.
    pub async fn create(&self, record: &T) -> Result<()> {
        let document = to_document(record)?;
        self.collection.insert(&record.id().into(), &document).await?;
        let count = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        info!(collection = self.collection.name(), id = %record.id(), count, "Record created");
        Ok(())
    }

    /// Replaces the record with the same id, creating it if absent.
    pub async fn update(&self, record: &T) -> Result<()> {
        let document = to_document(record)?;
        let outcome = self
            .collection
            .upsert(&record.id().into(), &document)
            .await?;
        if outcome == UpsertOutcome::Inserted {
            self.count.fetch_add(1, Ordering::Relaxed);
        }
        info!(collection = self.collection.name(), id = %record.id(), outcome = ?outcome, "Record updated");
        Ok(())
    }

    /// Removes the record. The cached count is not decremented.
    pub async fn delete(&self, id: T::Id) -> Result<bool> {
        let deleted = self.collection.delete(&id.into()).await?;
        info!(collection = self.collection.name(), id = %id, deleted, "Record deleted");
        Ok(deleted)
    }

    /// Page `page_no` (1-based) of the records matching `filter`, in key order.
    /// Pages past the end come back empty with the correct `total_pages`.
    pub async fn get_page(&self, page_no: u64, page_size: u64, filter: &Filter) -> Result<Page<T>> {
        ensure_page_size(page_size)?;
        if page_no == 0 {
            return Err(StorageError::Precondition(
                "page numbers start at 1".to_string(),
            ));
        }
        let total_pages = self.count_pages(page_size, filter).await?;
        let records = self.fetch_page(page_no, page_size, filter).await?;
        Ok(Page {
            total_pages,
            records,
        })
    }

    /// Pages spanned by the records matching `filter`, counted in the collection.
    pub(crate) async fn count_pages(&self, page_size: u64, filter: &Filter) -> Result<u64> {
        let matching = self.collection.count(filter).await?;
        let total_pages = page_count(matching, page_size);
        debug!(collection = self.collection.name(), matching, total_pages, "Counted pages");
        Ok(total_pages)
    }

    pub(crate) async fn fetch_page(&self, page_no: u64, page_size: u64, filter: &Filter) -> Result<Vec<T>> {
        let skip = page_size.saturating_mul(page_no - 1);
        self.find(filter, FindOptions::page(skip, page_size)).await
    }

    pub(crate) async fn find(&self, filter: &Filter, options: FindOptions) -> Result<Vec<T>> {
        self.collection
            .find(filter, options)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }
}

//! User store: [`RecordStore`] over [`UserRecord`] with blocked/unblocked listings.

use std::ops::Deref;
use std::sync::Arc;

use crate::collection::{Collection, Filter};
use crate::error::Result;
use crate::models::UserRecord;
use crate::record_store::{ensure_page_size, page_count, Page, RecordStore};

const BLOCKED_FIELD: &str = "blocked";

pub struct UserStore {
    records: RecordStore<UserRecord>,
}

impl UserStore {
    pub async fn open(collection: Arc<dyn Collection>) -> Result<Self> {
        Ok(Self {
            records: RecordStore::open(collection).await?,
        })
    }

    /// Page of blocked users.
    pub async fn get_blocked_page(&self, page_no: u64, page_size: u64) -> Result<Page<UserRecord>> {
        self.records
            .get_page(page_no, page_size, &Filter::all().eq(BLOCKED_FIELD, true))
            .await
    }

    /// Page of users that are not blocked.
    pub async fn get_page(&self, page_no: u64, page_size: u64) -> Result<Page<UserRecord>> {
        self.records
            .get_page(page_no, page_size, &Filter::all().eq(BLOCKED_FIELD, false))
            .await
    }

    /// Pages needed to list every user, from the cached count.
    pub fn get_total_page_count(&self, page_size: u64) -> Result<u64> {
        ensure_page_size(page_size)?;
        Ok(page_count(self.records.count(), page_size))
    }
}

impl Deref for UserStore {
    type Target = RecordStore<UserRecord>;

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

//! Message store: [`RecordStore`] over [`MessageRecord`] with per-conversation history
//! and short-id lookup.

use std::ops::Deref;
use std::sync::Arc;

use relay_core::Message;
use tracing::{debug, info};

use crate::collection::{Collection, Filter, FindOptions};
use crate::error::Result;
use crate::models::MessageRecord;
use crate::record_store::{ensure_page_size, Page, RecordStore};
use crate::short_id;

const WITH_FIELD: &str = "with";
const SHORT_ID_FIELD: &str = "short_id";

pub struct MessageStore {
    records: RecordStore<MessageRecord>,
    operator_id: i64,
}

impl MessageStore {
    /// `operator_id` is the account whose replies are filed under the replied-to sender.
    pub async fn open(collection: Arc<dyn Collection>, operator_id: i64) -> Result<Self> {
        Ok(Self {
            records: RecordStore::open(collection).await?,
            operator_id,
        })
    }

    pub fn operator_id(&self) -> i64 {
        self.operator_id
    }

    /// Builds the record for an incoming message and stores it.
    pub async fn record(&self, message: &Message) -> Result<MessageRecord> {
        let record = MessageRecord::from_message(message, self.operator_id);
        self.records.create(&record).await?;
        info!(
            message_id = message.id,
            short_id = %record.short_id,
            with_user = record.with_user,
            "Message recorded"
        );
        Ok(record)
    }

    /// Page of the conversation with `counterpart_id`, oldest first. Page 0 means the
    /// last page.
    pub async fn get_page_with(
        &self,
        counterpart_id: i64,
        page_no: u64,
        page_size: u64,
    ) -> Result<Page<MessageRecord>> {
        ensure_page_size(page_size)?;
        let filter = Filter::all().eq(WITH_FIELD, counterpart_id);
        let total_pages = self.records.count_pages(page_size, &filter).await?;

        let page_no = if page_no == 0 { total_pages } else { page_no };
        if page_no == 0 {
            return Ok(Page::empty(total_pages));
        }

        let records = self.records.fetch_page(page_no, page_size, &filter).await?;
        Ok(Page {
            total_pages,
            records,
        })
    }

    /// Looks a message up by its short id. Malformed ids are treated as unknown.
    pub async fn get_by_short_id(&self, short: &str) -> Result<Option<MessageRecord>> {
        if let Err(e) = short_id::decode(short) {
            debug!(short_id = short, error = %e, "Rejected malformed short id");
            return Ok(None);
        }

        let filter = Filter::all().eq(SHORT_ID_FIELD, short);
        let mut found = self.records.find(&filter, FindOptions::page(0, 1)).await?;
        Ok(found.pop())
    }
}

impl Deref for MessageStore {
    type Target = RecordStore<MessageRecord>;

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

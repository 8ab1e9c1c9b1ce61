//! Shared operational state: reply templates, operator presence and the expiring
//! "currently replying to" pointer.
//!
//! Backed by the single document of a reserved collection. Only the templates are
//! persisted; presence, reply target, conversation state and the last message are
//! process-local and start from their defaults on every launch.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use relay_core::RelayConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::collection::{Collection, Filter, FindOptions};
use crate::error::Result;
use crate::models::{from_document, to_document, Model};
use crate::object_id::ObjectId;

pub const BLOCK_TEMPLATE: &str = "block";
pub const UNAVAILABLE_TEMPLATE: &str = "unavailable";
pub const START_TEMPLATE: &str = "start";

const DEFAULT_CONVERSATION_STATE: &str = "none";
const MAX_TIMEOUT_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedStateSettings {
    /// How long a reply target stays valid after it was set.
    pub reply_timeout: Duration,
    /// Inactivity after which the operator counts as unavailable.
    pub availability_window: Duration,
}

impl SharedStateSettings {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            reply_timeout: seconds(config.reply_timeout_secs),
            availability_window: seconds(config.availability_window_secs),
        }
    }
}

fn seconds(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_TIMEOUT_SECS) as i64)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SharedDocument {
    id: ObjectId,
    #[serde(default)]
    templates: BTreeMap<String, String>,
}

impl Model for SharedDocument {
    type Id = ObjectId;

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[derive(Debug, Clone, Copy)]
struct ReplyTarget {
    user_id: i64,
    set_at: DateTime<Utc>,
}

pub struct SharedState {
    collection: Arc<dyn Collection>,
    document: SharedDocument,
    settings: SharedStateSettings,
    last_seen: Option<DateTime<Utc>>,
    reply_target: Option<ReplyTarget>,
    conversation_state: String,
    last_message: Option<ObjectId>,
}

impl SharedState {
    /// Loads the state document, inserting an empty one if the collection has none.
    pub async fn open(collection: Arc<dyn Collection>, settings: SharedStateSettings) -> Result<Self> {
        let existing = collection
            .find(&Filter::all(), FindOptions::page(0, 1))
            .await?
            .pop();

        let document = match existing {
            Some(document) => from_document::<SharedDocument>(document)?,
            None => {
                let document = SharedDocument {
                    id: ObjectId::new(),
                    templates: BTreeMap::new(),
                };
                collection
                    .insert(&document.id.into(), &to_document(&document)?)
                    .await?;
                info!(collection = collection.name(), id = %document.id, "Created shared state document");
                document
            }
        };

        Ok(Self {
            collection,
            document,
            settings,
            last_seen: None,
            reply_target: None,
            conversation_state: DEFAULT_CONVERSATION_STATE.to_string(),
            last_message: None,
        })
    }

    pub fn settings(&self) -> &SharedStateSettings {
        &self.settings
    }

    pub fn availability(&self) -> Availability {
        self.availability_at(Utc::now())
    }

    /// Available iff the operator was seen within the availability window before `now`.
    pub fn availability_at(&self, now: DateTime<Utc>) -> Availability {
        match self.last_seen {
            Some(seen) if now - seen <= self.settings.availability_window => {
                Availability::Available
            }
            _ => Availability::Unavailable,
        }
    }

    pub fn update_last_seen(&mut self) {
        self.update_last_seen_at(Utc::now());
    }

    pub fn update_last_seen_at(&mut self, now: DateTime<Utc>) {
        self.last_seen = Some(now);
    }

    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    pub fn reply_target(&self) -> Option<i64> {
        self.reply_target_at(Utc::now())
    }

    /// The user being replied to, unless the pointer is older than the reply timeout.
    /// A stale pointer is masked, not cleared.
    pub fn reply_target_at(&self, now: DateTime<Utc>) -> Option<i64> {
        self.reply_target
            .filter(|target| now - target.set_at <= self.settings.reply_timeout)
            .map(|target| target.user_id)
    }

    pub fn set_reply_target(&mut self, user_id: Option<i64>) {
        self.set_reply_target_at(user_id, Utc::now());
    }

    pub fn set_reply_target_at(&mut self, user_id: Option<i64>, now: DateTime<Utc>) {
        self.reply_target = user_id.map(|user_id| ReplyTarget {
            user_id,
            set_at: now,
        });
    }

    pub fn templates(&self) -> &BTreeMap<String, String> {
        &self.document.templates
    }

    pub fn template(&self, name: &str) -> Option<&str> {
        self.document.templates.get(name).map(String::as_str)
    }

    /// Sets a template in memory; call [`save`](Self::save) to persist it.
    pub fn set_template(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.document.templates.insert(name.into(), text.into());
    }

    pub fn remove_template(&mut self, name: &str) -> Option<String> {
        self.document.templates.remove(name)
    }

    /// Reply sent to blocked users; empty when unset.
    pub fn block_template(&self) -> &str {
        self.template(BLOCK_TEMPLATE).unwrap_or_default()
    }

    /// Reply sent while the operator is unavailable; empty when unset.
    pub fn unavailable_template(&self) -> &str {
        self.template(UNAVAILABLE_TEMPLATE).unwrap_or_default()
    }

    pub fn start_template(&self) -> Option<&str> {
        self.template(START_TEMPLATE)
    }

    pub fn conversation_state(&self) -> &str {
        &self.conversation_state
    }

    pub fn set_conversation_state(&mut self, state: impl Into<String>) {
        self.conversation_state = state.into();
    }

    pub fn last_message(&self) -> Option<ObjectId> {
        self.last_message
    }

    pub fn set_last_message(&mut self, message_id: Option<ObjectId>) {
        self.last_message = message_id;
    }

    /// Writes the templates back to the state document.
    pub async fn save(&self) -> Result<()> {
        let document = to_document(&self.document)?;
        self.collection
            .upsert(&self.document.id.into(), &document)
            .await?;
        info!(
            collection = self.collection.name(),
            templates = self.document.templates.len(),
            "Saved shared state"
        );
        Ok(())
    }
}

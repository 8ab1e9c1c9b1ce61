//! The storage bundle: every store the relay needs, opened once at startup and passed
//! to the dispatch layer.

use std::sync::Arc;

use relay_core::RelayConfig;
use tracing::info;

use crate::collection::Collection;
use crate::error::Result;
use crate::message_store::MessageStore;
use crate::shared_state::{SharedState, SharedStateSettings};
use crate::sqlite_collection::SqliteCollection;
use crate::sqlite_pool::SqlitePoolManager;
use crate::user_store::UserStore;

pub const USERS_COLLECTION: &str = "users";
pub const MESSAGES_COLLECTION: &str = "messages";
pub const SHARED_STATE_COLLECTION: &str = "common";

pub struct Storage {
    pub users: UserStore,
    pub messages: MessageStore,
    pub shared: SharedState,
}

impl Storage {
    /// Opens the SQLite database named by the config and its three collections.
    pub async fn open(config: &RelayConfig) -> Result<Self> {
        let pool_manager = SqlitePoolManager::new(&config.database_url).await?;
        let pool = pool_manager.pool().clone();

        let users = SqliteCollection::open(pool.clone(), USERS_COLLECTION).await?;
        let messages = SqliteCollection::open(pool.clone(), MESSAGES_COLLECTION).await?;
        let shared = SqliteCollection::open(pool, SHARED_STATE_COLLECTION).await?;

        Self::from_collections(
            Arc::new(users),
            Arc::new(messages),
            Arc::new(shared),
            config.operator_id,
            SharedStateSettings::from_config(config),
        )
        .await
    }

    /// Wires the stores over arbitrary collection handles.
    pub async fn from_collections(
        users: Arc<dyn Collection>,
        messages: Arc<dyn Collection>,
        shared: Arc<dyn Collection>,
        operator_id: i64,
        settings: SharedStateSettings,
    ) -> Result<Self> {
        let storage = Self {
            users: UserStore::open(users).await?,
            messages: MessageStore::open(messages, operator_id).await?,
            shared: SharedState::open(shared, settings).await?,
        };
        info!(
            users = storage.users.count(),
            messages = storage.messages.count(),
            "Storage ready"
        );
        Ok(storage)
    }
}

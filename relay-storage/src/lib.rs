//! Storage crate: persistence for the message-relay bot.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`object_id`] – Time-ordered 12-byte record ids
//! - [`short_id`] – Short, sortable message handles
//! - [`collection`] – Collection trait, keys and filters
//! - [`models`] – UserRecord, MessageRecord and the Model trait
//! - [`record_store`] – Generic CRUD and pagination
//! - [`user_store`], [`message_store`] – Domain stores
//! - [`shared_state`] – Templates, presence and reply target
//! - [`sqlite_collection`], [`memory_collection`], [`sqlite_pool`] – Backends
//! - [`storage`] – Storage bundle opened at startup

pub mod collection;
pub mod error;
pub mod memory_collection;
pub mod message_store;
pub mod models;
pub mod object_id;
pub mod record_store;
pub mod shared_state;
pub mod short_id;
pub mod sqlite_collection;
pub mod sqlite_pool;
pub mod storage;
pub mod user_store;


pub use collection::{Collection, Document, Filter, FilterValue, FindOptions, Key, UpsertOutcome};
pub use error::{Result, StorageError};
pub use memory_collection::InMemoryCollection;
pub use message_store::MessageStore;
pub use models::{MessageRecord, Model, UserRecord, NON_TEXT_PLACEHOLDER};
pub use object_id::{ObjectId, ParseObjectIdError};
pub use record_store::{page_count, Page, RecordStore};
pub use shared_state::{Availability, SharedState, SharedStateSettings};
pub use short_id::{ShortId, ShortIdError};
pub use sqlite_collection::SqliteCollection;
pub use sqlite_pool::SqlitePoolManager;
pub use storage::Storage;
pub use user_store::UserStore;

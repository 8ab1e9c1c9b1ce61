//! Record shapes persisted by the stores, and the [`Model`] capability they implement.

mod message_record;
mod user_record;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::collection::{Document, Key};
use crate::error::{Result, StorageError};

pub use message_record::{MessageRecord, NON_TEXT_PLACEHOLDER};
pub use user_record::UserRecord;

/// A record that can be stored in a collection: serializes to a JSON object and
/// exposes the key it is stored under.
pub trait Model: Serialize + DeserializeOwned + Send + Sync {
    type Id: Copy + Into<Key> + fmt::Display + Send + Sync;

    fn id(&self) -> Self::Id;
}

pub(crate) fn to_document<T: Model>(record: &T) -> Result<Document> {
    let document = serde_json::to_value(record)?;
    if !document.is_object() {
        return Err(StorageError::Config(format!(
            "{} does not serialize to a document",
            std::any::type_name::<T>()
        )));
    }
    Ok(document)
}

pub(crate) fn from_document<T: Model>(document: Document) -> Result<T> {
    Ok(serde_json::from_value(document)?)
}

//! Core types: the user and message shapes the persistence layer consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User identity as reported by the platform (id, names, username).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

/// The message a reply points at; only the parts the relay needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyTo {
    pub message_id: i64,
    /// Sender of the replied-to message.
    pub from_user_id: i64,
}

/// A single incoming message. `text` is `None` for stickers, photos, documents and
/// every other non-text payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Platform-assigned message id.
    pub id: i64,
    pub user: User,
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reply_to: Option<ReplyTo>,
}

impl User {
    pub fn new(id: i64, first_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: None,
            username: None,
        }
    }
}

impl Message {
    /// Creates a text message from `user` stamped with the current time.
    pub fn text(id: i64, user: User, text: impl Into<String>) -> Self {
        Self {
            id,
            user,
            text: Some(text.into()),
            created_at: Utc::now(),
            reply_to: None,
        }
    }

    /// Creates a message without text content (media, stickers, ...).
    pub fn non_text(id: i64, user: User) -> Self {
        Self {
            id,
            user,
            text: None,
            created_at: Utc::now(),
            reply_to: None,
        }
    }

    /// Marks this message as a reply to `message_id` sent by `from_user_id`.
    pub fn replying_to(mut self, message_id: i64, from_user_id: i64) -> Self {
        self.reply_to = Some(ReplyTo {
            message_id,
            from_user_id,
        });
        self
    }
}

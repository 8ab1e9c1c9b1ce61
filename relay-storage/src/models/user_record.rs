//! User record model: one document per platform user, keyed by the platform id.

use relay_core::User;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};
use crate::models::Model;

const NOT_SET: &str = "_Not_set_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    #[serde(default)]
    pub blocked: bool,
}

impl UserRecord {
    /// Creates an unblocked record from a first contact.
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            blocked: false,
        }
    }

    /// Refreshes names and username from the platform. `blocked` is left alone.
    pub fn update_profile(&mut self, user: &User) -> Result<()> {
        if user.id != self.id {
            return Err(StorageError::Precondition(format!(
                "profile update for user {} applied to record {}",
                user.id, self.id
            )));
        }
        self.first_name = user.first_name.clone();
        self.last_name = user.last_name.clone();
        self.username = user.username.clone();
        Ok(())
    }

    /// One-line listing entry: `/u<id> @username first_name BLOCKED`.
    pub fn short_line(&self) -> String {
        let mut parts = vec![format!("/u{}", self.id)];
        if let Some(username) = &self.username {
            parts.push(format!("@{}", username));
        }
        parts.push(self.first_name.clone());
        if self.blocked {
            parts.push("BLOCKED".to_string());
        }
        parts.join(" ")
    }

    /// Multi-line profile card shown to the operator.
    pub fn full_card(&self) -> String {
        let mut card = format!(
            "Id: {}\nUsername: {}\nFirst name: {}\nLast name: {}",
            self.id,
            self.username
                .as_ref()
                .map(|u| format!("@{}", u))
                .unwrap_or_else(|| NOT_SET.to_string()),
            self.first_name,
            self.last_name.as_deref().unwrap_or(NOT_SET),
        );
        if self.blocked {
            card.push_str("\nBLOCKED");
        }
        card
    }
}

impl Model for UserRecord {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }
}

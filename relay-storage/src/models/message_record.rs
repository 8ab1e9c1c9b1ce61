//! Message record model: an immutable copy of one relayed message.

use relay_core::Message;
use serde::{Deserialize, Serialize};

use crate::models::Model;
use crate::object_id::ObjectId;
use crate::short_id::{self, ShortId};

/// Text stored for non-text content; followed by the message's short id so the
/// operator can refer to it with `/m<short_id>`.
pub const NON_TEXT_PLACEHOLDER: &str = "Non text message: /m";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: ObjectId,
    pub platform_message_id: i64,
    pub short_id: ShortId,
    pub from_user: i64,
    /// The other party of the conversation this message belongs to.
    #[serde(rename = "with")]
    pub with_user: i64,
    pub text: String,
}

impl MessageRecord {
    /// Builds a record with a freshly generated id.
    pub fn from_message(message: &Message, operator_id: i64) -> Self {
        Self::with_id(ObjectId::new(), message, operator_id)
    }

    /// Builds a record under a given id.
    ///
    /// When the operator replies to a message, the record joins the conversation of
    /// the replied-to sender; every other message belongs to its own sender.
    pub fn with_id(id: ObjectId, message: &Message, operator_id: i64) -> Self {
        let short_id = short_id::encode(&id);
        let with_user = match &message.reply_to {
            Some(reply) if message.user.id == operator_id => reply.from_user_id,
            _ => message.user.id,
        };
        let text = match &message.text {
            Some(text) => text.clone(),
            None => format!("{}{}", NON_TEXT_PLACEHOLDER, short_id),
        };

        Self {
            id,
            platform_message_id: message.id,
            short_id,
            from_user: message.user.id,
            with_user,
            text,
        }
    }
}

impl Model for MessageRecord {
    type Id = ObjectId;

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::User;

    const OPERATOR: i64 = 1;

    #[test]
    fn test_user_message_belongs_to_sender() {
        let message = Message::text(10, User::new(5, "Eve"), "hi");
        let record = MessageRecord::from_message(&message, OPERATOR);

        assert_eq!(record.platform_message_id, 10);
        assert_eq!(record.from_user, 5);
        assert_eq!(record.with_user, 5);
        assert_eq!(record.text, "hi");
        assert_eq!(record.short_id, short_id::encode(&record.id));
    }

    #[test]
    fn test_user_reply_still_belongs_to_sender() {
        let message = Message::text(11, User::new(5, "Eve"), "re").replying_to(3, OPERATOR);
        let record = MessageRecord::from_message(&message, OPERATOR);
        assert_eq!(record.with_user, 5);
    }

    #[test]
    fn test_operator_reply_joins_original_conversation() {
        let message =
            Message::text(12, User::new(OPERATOR, "Op"), "answer").replying_to(10, 5);
        let record = MessageRecord::from_message(&message, OPERATOR);

        assert_eq!(record.from_user, OPERATOR);
        assert_eq!(record.with_user, 5);
    }

    #[test]
    fn test_operator_message_without_reply_is_own_thread() {
        let message = Message::text(13, User::new(OPERATOR, "Op"), "note");
        let record = MessageRecord::from_message(&message, OPERATOR);
        assert_eq!(record.with_user, OPERATOR);
    }

    #[test]
    fn test_non_text_gets_placeholder_with_short_id() {
        let id = ObjectId::from_parts(1, 5);
        let message = Message::non_text(14, User::new(5, "Eve"));
        let record = MessageRecord::with_id(id, &message, OPERATOR);

        assert_eq!(record.text, "Non text message: /m-----Eh");
    }

    #[test]
    fn test_serializes_with_field() {
        let message = Message::text(15, User::new(5, "Eve"), "hi");
        let record = MessageRecord::from_message(&message, OPERATOR);
        let doc = serde_json::to_value(&record).unwrap();

        assert_eq!(doc["with"], 5);
        assert_eq!(doc["short_id"], record.short_id.as_str());
        assert_eq!(doc["id"], record.id.to_hex());
    }
}

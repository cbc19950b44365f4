//! Chat message models and display rules

use serde::{Deserialize, Serialize};

/// Body prefix the backend puts on generated replies.
pub const GENERATED_PREFIX: &str = "Response:";

/// Shown in place of a message that has no body.
pub const MISSING_BODY_PLACEHOLDER: &str = "Error: Content isn't available";

/// A single chat message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<i64>,
    #[serde(default)]
    pub last_modified_date: Option<String>,
}

/// Store/reply request body
#[derive(Debug, Clone, Serialize)]
pub struct NewMessage {
    pub body: String,
    pub conversation_id: i64,
}

/// Who a message appears to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Generated,
}

impl ChatMessage {
    /// A body-less record, used to stand in for a failed call.
    pub fn missing(conversation_id: i64) -> Self {
        Self {
            conversation_id: Some(conversation_id),
            ..Self::default()
        }
    }

    /// Display kind and text for this message.
    pub fn display(&self) -> (MessageKind, &str) {
        match self.body.as_deref() {
            None | Some("") => (MessageKind::User, MISSING_BODY_PLACEHOLDER),
            Some(body) => match body.strip_prefix(GENERATED_PREFIX) {
                Some(rest) => (MessageKind::Generated, rest.trim_start()),
                None => (MessageKind::User, body),
            },
        }
    }
}

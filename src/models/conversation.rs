//! Conversation models

use serde::{Deserialize, Serialize};

use super::ChatMessage;

/// A named thread of chat messages owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub last_modified_date: Option<String>,
}

/// Create/rename request body
#[derive(Debug, Clone, Serialize)]
pub struct NewConversation {
    pub title: String,
    pub user_id: i64,
}

/// Everything the chat view needs after a full reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationContext {
    /// Most recently used conversation; `None` when the user has none yet.
    pub latest: Option<Conversation>,
    pub messages: Vec<ChatMessage>,
    pub conversations: Vec<Conversation>,
}

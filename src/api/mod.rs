//! API client module for the DocGenie backend

mod chat;
pub mod client;
mod conversation;
mod user;

pub use chat::{
    create_message_data, list_messages_data, read_messages, request_response_data, send_message,
};
pub use client::{ApiError, DocGenieClient};
pub use conversation::{
    create_conversation, create_conversation_data, delete_conversation, delete_conversation_data,
    list_conversations, load_context_data, rename_conversation, show_latest,
};
pub use user::{get_user_data, login, login_data, show_user};

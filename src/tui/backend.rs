//! Async backend: bridges the TUI event loop with HTTP calls.
//!
//! The TUI sends `BackendCommand` values over an mpsc channel. A background
//! tokio task runs each command in its own task and sends `BackendResponse`
//! values back. Calls that belong to one command run sequentially, so their
//! responses arrive in order.

use tokio::sync::mpsc;

use crate::api::{self, ApiError, DocGenieClient};
use crate::models::{ChatMessage, Conversation, ConversationContext, Credentials, User};

/// Commands sent from the TUI event loop to the async backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Login(Credentials),
    /// Latest conversation, its messages, then the conversation list.
    LoadContext { user_id: i64 },
    CreateConversation { user_id: i64, title: String },
    DeleteConversation { conversation_id: i64 },
    LoadMessages { conversation_id: i64 },
    /// Store the message, then request the generated reply.
    SendMessage { conversation_id: i64, body: String },
    FetchUser { user_id: i64 },
}

/// Responses from the async backend to the TUI.
#[derive(Debug)]
pub enum BackendResponse {
    LoggedIn(Result<User, ApiError>),
    Context(Result<ConversationContext, ApiError>),
    ConversationCreated(Result<Conversation, ApiError>),
    ConversationDeleted {
        conversation_id: i64,
        result: Result<(), ApiError>,
    },
    Messages {
        conversation_id: i64,
        result: Result<Vec<ChatMessage>, ApiError>,
    },
    MessageStored {
        conversation_id: i64,
        result: Result<ChatMessage, ApiError>,
    },
    ReplyReceived {
        conversation_id: i64,
        result: Result<ChatMessage, ApiError>,
    },
    User {
        user_id: i64,
        result: Result<User, ApiError>,
    },
}

/// Handle for interacting with the backend from the TUI side.
pub struct Backend {
    cmd_tx: mpsc::UnboundedSender<BackendCommand>,
    resp_rx: mpsc::UnboundedReceiver<BackendResponse>,
}

impl Backend {
    /// Start the backend. Spawns a tokio task that processes commands.
    pub fn start(client: DocGenieClient) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, resp_rx) = mpsc::unbounded_channel();

        tokio::spawn(backend_loop(client, cmd_rx, resp_tx));

        Self { cmd_tx, resp_rx }
    }

    /// Send a command to the backend (non-blocking).
    pub fn send(&self, cmd: BackendCommand) {
        tracing::debug!("Backend command: {:?}", redact(&cmd));
        if self.cmd_tx.send(cmd).is_err() {
            tracing::error!("Backend channel closed -- command dropped");
        }
    }

    /// Receive a response from the backend.
    ///
    /// Returns `None` only when the backend channel is permanently closed.
    /// Designed to be used inside `tokio::select!`.
    pub async fn recv(&mut self) -> Option<BackendResponse> {
        self.resp_rx.recv().await
    }
}

/// Keep passwords out of the debug log.
fn redact(cmd: &BackendCommand) -> BackendCommand {
    match cmd {
        BackendCommand::Login(creds) => BackendCommand::Login(Credentials {
            email: creds.email.clone(),
            password: "***".to_string(),
        }),
        other => other.clone(),
    }
}

/// Background loop that processes commands.
async fn backend_loop(
    client: DocGenieClient,
    mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>,
    resp_tx: mpsc::UnboundedSender<BackendResponse>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let client = client.clone();
        let resp_tx = resp_tx.clone();

        // Spawn each command as a separate task so we don't block the loop.
        tokio::spawn(async move {
            execute(&client, cmd, &resp_tx).await;
        });
    }
}

/// Run one command, sending one response per HTTP result.
async fn execute(
    client: &DocGenieClient,
    cmd: BackendCommand,
    resp_tx: &mpsc::UnboundedSender<BackendResponse>,
) {
    match cmd {
        BackendCommand::Login(credentials) => {
            let result = api::login_data(client, &credentials).await;
            let _ = resp_tx.send(BackendResponse::LoggedIn(result));
        }
        BackendCommand::LoadContext { user_id } => {
            let result = api::load_context_data(client, user_id).await;
            let _ = resp_tx.send(BackendResponse::Context(result));
        }
        BackendCommand::CreateConversation { user_id, title } => {
            let result = api::create_conversation_data(client, user_id, &title).await;
            let _ = resp_tx.send(BackendResponse::ConversationCreated(result));
        }
        BackendCommand::DeleteConversation { conversation_id } => {
            let result = api::delete_conversation_data(client, conversation_id).await;
            let _ = resp_tx.send(BackendResponse::ConversationDeleted {
                conversation_id,
                result,
            });
        }
        BackendCommand::LoadMessages { conversation_id } => {
            let result = api::list_messages_data(client, conversation_id).await;
            let _ = resp_tx.send(BackendResponse::Messages {
                conversation_id,
                result,
            });
        }
        BackendCommand::SendMessage {
            conversation_id,
            body,
        } => {
            let result = api::create_message_data(client, conversation_id, &body).await;
            let _ = resp_tx.send(BackendResponse::MessageStored {
                conversation_id,
                result,
            });
            let result = api::request_response_data(client, conversation_id, &body).await;
            let _ = resp_tx.send(BackendResponse::ReplyReceived {
                conversation_id,
                result,
            });
        }
        BackendCommand::FetchUser { user_id } => {
            let result = api::get_user_data(client, user_id).await;
            let _ = resp_tx.send(BackendResponse::User { user_id, result });
        }
    }
}

//! Chat message endpoints

use anyhow::{Context, Result};

use super::client::{ApiError, DocGenieClient};
use crate::models::{ChatMessage, MessageKind, NewMessage};

/// GET /conversation/{id}/chat/all
pub async fn list_messages_data(
    client: &DocGenieClient,
    conversation_id: i64,
) -> Result<Vec<ChatMessage>, ApiError> {
    client
        .get(&format!("/conversation/{}/chat/all", conversation_id))
        .await
}

/// POST /conversation/{id}/chat/create: store the user's message.
pub async fn create_message_data(
    client: &DocGenieClient,
    conversation_id: i64,
    body: &str,
) -> Result<ChatMessage, ApiError> {
    let msg = NewMessage {
        body: body.to_string(),
        conversation_id,
    };
    client
        .post(&format!("/conversation/{}/chat/create", conversation_id), &msg)
        .await
}

/// POST /conversation/{id}/chat/response: ask the backend for a generated reply.
pub async fn request_response_data(
    client: &DocGenieClient,
    conversation_id: i64,
    body: &str,
) -> Result<ChatMessage, ApiError> {
    let msg = NewMessage {
        body: body.to_string(),
        conversation_id,
    };
    client
        .post(&format!("/conversation/{}/chat/response", conversation_id), &msg)
        .await
}

/// Results of the two calls behind one send.
pub struct SendResult {
    pub stored: Result<ChatMessage, ApiError>,
    pub reply: Result<ChatMessage, ApiError>,
}

/// Store a message, then request the reply. The reply is requested even if
/// storing failed.
pub async fn send_message_data(client: &DocGenieClient, conversation_id: i64, body: &str) -> SendResult {
    let stored = create_message_data(client, conversation_id, body).await;
    if let Err(ref e) = stored {
        tracing::warn!("Storing message failed: {}", e);
    }
    let reply = request_response_data(client, conversation_id, body).await;
    SendResult { stored, reply }
}

fn format_message(msg: &ChatMessage) -> String {
    match msg.display() {
        (MessageKind::Generated, text) => format!("DocGenie: {}", text),
        (MessageKind::User, text) => format!("You: {}", text),
    }
}

/// Print all messages in a conversation.
pub async fn read_messages(client: &DocGenieClient, conversation_id: i64) -> Result<()> {
    let msgs = list_messages_data(client, conversation_id)
        .await
        .with_context(|| format!("Failed to read conversation {}", conversation_id))?;

    if msgs.is_empty() {
        println!("(no messages)");
        return Ok(());
    }

    for msg in &msgs {
        println!("{}", format_message(msg));
    }

    Ok(())
}

/// Send a message and print the generated reply.
pub async fn send_message(client: &DocGenieClient, conversation_id: i64, message: &str) -> Result<()> {
    if message.trim().is_empty() {
        anyhow::bail!("Message is empty");
    }
    let result = send_message_data(client, conversation_id, message).await;
    result.stored.context("Failed to store message")?;
    let reply = result.reply.context("Failed to get a response")?;
    println!("{}", format_message(&reply));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_send_issues_store_then_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/conversation/4/chat/create"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1, "body": "hello there", "conversation_id": 4
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/conversation/4/chat/response"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 2, "body": "Response:General Kenobi", "conversation_id": 4
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DocGenieClient::new(&server.uri()).unwrap();
        let result = send_message_data(&client, 4, "hello there").await;
        assert_ok!(result.stored);
        let reply = assert_ok!(result.reply);
        assert_eq!(reply.display(), (MessageKind::Generated, "General Kenobi"));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url.path(), "/conversation/4/chat/create");
        assert_eq!(requests[1].url.path(), "/conversation/4/chat/response");
        for req in &requests {
            let body: Value = serde_json::from_slice(&req.body).unwrap();
            assert_eq!(body, json!({"body": "hello there", "conversation_id": 4}));
        }
    }

    #[tokio::test]
    async fn test_reply_requested_after_store_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/conversation/4/chat/create"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/conversation/4/chat/response"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 2, "body": "Response:ok", "conversation_id": 4
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DocGenieClient::new(&server.uri()).unwrap();
        let result = send_message_data(&client, 4, "hi").await;
        assert_err!(result.stored);
        assert_ok!(result.reply);
    }

    #[test]
    fn test_format_message() {
        let bot = ChatMessage {
            body: Some("Response: 3 rows".to_string()),
            ..ChatMessage::default()
        };
        assert_eq!(format_message(&bot), "DocGenie: 3 rows");
        assert_eq!(
            format_message(&ChatMessage::default()),
            "You: Error: Content isn't available"
        );
    }
}

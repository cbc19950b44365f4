//! Conversation endpoints and the full chat-context reload

use anyhow::{Context, Result};
use serde_json::json;

use super::chat::list_messages_data;
use super::client::{ApiError, DocGenieClient};
use crate::models::{Conversation, ConversationContext, NewConversation};

/// POST /conversation/latest?user_id=. `None` when the user has no conversations.
pub async fn latest_conversation_data(
    client: &DocGenieClient,
    user_id: i64,
) -> Result<Option<Conversation>, ApiError> {
    client
        .post_query("/conversation/latest", &[("user_id", user_id.to_string())])
        .await
}

/// POST /conversation/all?user_id=
pub async fn list_conversations_data(
    client: &DocGenieClient,
    user_id: i64,
) -> Result<Vec<Conversation>, ApiError> {
    client
        .post_query("/conversation/all", &[("user_id", user_id.to_string())])
        .await
}

/// GET /conversation/{id}
pub async fn get_conversation_data(
    client: &DocGenieClient,
    conversation_id: i64,
) -> Result<Conversation, ApiError> {
    client
        .get(&format!("/conversation/{}", conversation_id))
        .await
}

/// POST /conversation/create
pub async fn create_conversation_data(
    client: &DocGenieClient,
    user_id: i64,
    title: &str,
) -> Result<Conversation, ApiError> {
    let body = NewConversation {
        title: title.to_string(),
        user_id,
    };
    client.post("/conversation/create", &body).await
}

/// PUT /conversation/{id}
pub async fn rename_conversation_data(
    client: &DocGenieClient,
    conversation_id: i64,
    user_id: i64,
    title: &str,
) -> Result<Conversation, ApiError> {
    let body = NewConversation {
        title: title.to_string(),
        user_id,
    };
    client
        .put(&format!("/conversation/{}", conversation_id), &body)
        .await
}

/// DELETE /conversation/{id}
pub async fn delete_conversation_data(
    client: &DocGenieClient,
    conversation_id: i64,
) -> Result<(), ApiError> {
    client
        .delete(
            &format!("/conversation/{}", conversation_id),
            &json!({ "id": conversation_id }),
        )
        .await
}

/// Resolve the latest conversation, then its messages, then the full list.
///
/// The three calls run strictly in sequence. Messages are skipped when the
/// user has no conversation yet.
pub async fn load_context_data(
    client: &DocGenieClient,
    user_id: i64,
) -> Result<ConversationContext, ApiError> {
    let latest = latest_conversation_data(client, user_id).await?;

    let messages = match latest {
        Some(ref conv) => list_messages_data(client, conv.id).await?,
        None => {
            tracing::debug!("User {} has no conversations yet", user_id);
            Vec::new()
        }
    };

    let conversations = list_conversations_data(client, user_id).await?;

    Ok(ConversationContext {
        latest,
        messages,
        conversations,
    })
}

// ---------------------------------------------------------------------------
// CLI output
// ---------------------------------------------------------------------------

fn print_conversation(conv: &Conversation) {
    println!("{}", conv.title);
    println!("  ID: {}", conv.id);
    if let Some(ref modified) = conv.last_modified_date {
        println!("  Last: {}", modified);
    }
}

/// List a user's conversations (prints to stdout).
pub async fn list_conversations(client: &DocGenieClient, user_id: i64) -> Result<()> {
    let conversations = list_conversations_data(client, user_id)
        .await
        .context("Failed to list conversations")?;

    println!("\nConversations:");
    println!("{:-<60}", "");

    if conversations.is_empty() {
        println!("  (no conversations found)");
        return Ok(());
    }

    for conv in &conversations {
        print_conversation(conv);
        println!();
    }

    Ok(())
}

/// Show the user's most recent conversation.
pub async fn show_latest(client: &DocGenieClient, user_id: i64) -> Result<()> {
    match latest_conversation_data(client, user_id)
        .await
        .context("Failed to fetch latest conversation")?
    {
        Some(conv) => print_conversation(&conv),
        None => println!("(no conversations)"),
    }
    Ok(())
}

/// Create a conversation and print its id.
pub async fn create_conversation(client: &DocGenieClient, user_id: i64, title: &str) -> Result<()> {
    if title.trim().is_empty() {
        anyhow::bail!("Conversation title is empty");
    }
    let conv = create_conversation_data(client, user_id, title)
        .await
        .context("Failed to create conversation")?;
    println!("Created conversation {} ({})", conv.title, conv.id);
    Ok(())
}

/// Rename a conversation, keeping its owner.
pub async fn rename_conversation(client: &DocGenieClient, conversation_id: i64, title: &str) -> Result<()> {
    if title.trim().is_empty() {
        anyhow::bail!("Conversation title is empty");
    }
    let current = get_conversation_data(client, conversation_id)
        .await
        .with_context(|| format!("Conversation {} not found", conversation_id))?;
    let user_id = current
        .user_id
        .context("Conversation has no owner")?;
    let conv = rename_conversation_data(client, conversation_id, user_id, title)
        .await
        .context("Failed to rename conversation")?;
    println!("Renamed conversation {} to {}", conv.id, conv.title);
    Ok(())
}

/// Delete a conversation.
pub async fn delete_conversation(client: &DocGenieClient, conversation_id: i64) -> Result<()> {
    delete_conversation_data(client, conversation_id)
        .await
        .with_context(|| format!("Failed to delete conversation {}", conversation_id))?;
    println!("Conversation deleted.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_context(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/conversation/latest"))
            .and(query_param("user_id", "123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 1, "title": "Latest"})),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/conversation/1/chat/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 10, "body": "User message", "conversation_id": 1},
                {"id": 11, "body": "Response: Bot response", "conversation_id": 1}
            ])))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/conversation/all"))
            .and(query_param("user_id", "123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "title": "Conversation 1", "user_id": 123},
                {"id": 2, "title": "Conversation 2", "user_id": 123}
            ])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_load_context_runs_three_calls_in_order() {
        let server = MockServer::start().await;
        mount_context(&server).await;

        let client = DocGenieClient::new(&server.uri()).unwrap();
        let ctx = assert_ok!(load_context_data(&client, 123).await);

        assert_eq!(ctx.latest.map(|c| c.id), Some(1));
        assert_eq!(ctx.messages.len(), 2);
        assert_eq!(ctx.conversations.len(), 2);

        let requests = server.received_requests().await.unwrap();
        let paths: Vec<&str> = requests.iter().map(|r| r.url.path()).collect();
        assert_eq!(
            paths,
            vec!["/conversation/latest", "/conversation/1/chat/all", "/conversation/all"]
        );
    }

    #[tokio::test]
    async fn test_load_context_without_conversations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/conversation/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::Value::Null))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/conversation/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let client = DocGenieClient::new(&server.uri()).unwrap();
        let ctx = assert_ok!(load_context_data(&client, 4).await);
        assert_eq!(ctx, ConversationContext::default());
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_conversation_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/conversation/create"))
            .and(body_json(json!({"title": "Taxes", "user_id": 123})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 9, "title": "Taxes", "user_id": 123
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DocGenieClient::new(&server.uri()).unwrap();
        let conv = assert_ok!(create_conversation_data(&client, 123, "Taxes").await);
        assert_eq!(conv.id, 9);
    }

    #[tokio::test]
    async fn test_delete_sends_id_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/conversation/7"))
            .and(body_json(json!({"id": 7})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"message": "Conversation deleted"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = DocGenieClient::new(&server.uri()).unwrap();
        assert_ok!(delete_conversation_data(&client, 7).await);
    }

    #[tokio::test]
    async fn test_rename_puts_title() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/conversation/3"))
            .and(body_json(json!({"title": "Renamed", "user_id": 5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 3, "title": "Renamed", "user_id": 5
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DocGenieClient::new(&server.uri()).unwrap();
        let conv = assert_ok!(rename_conversation_data(&client, 3, 5, "Renamed").await);
        assert_eq!(conv.title, "Renamed");
    }
}

//! User endpoints: login and profile lookup

use anyhow::{Context, Result};

use super::client::{ApiError, DocGenieClient};
use crate::config::Config;
use crate::models::{Credentials, User};

/// POST /user/login
pub async fn login_data(client: &DocGenieClient, credentials: &Credentials) -> Result<User, ApiError> {
    client.post("/user/login", credentials).await
}

/// GET /user/{id}, including permissions.
pub async fn get_user_data(client: &DocGenieClient, user_id: i64) -> Result<User, ApiError> {
    client.get(&format!("/user/{}", user_id)).await
}

/// Log in and remember the returned user id (prints to stdout).
pub async fn login(client: &DocGenieClient, config: &mut Config, email: &str, password: &str) -> Result<()> {
    let credentials = Credentials::validate(email, password)?;
    let user = login_data(client, &credentials)
        .await
        .context("Login failed")?;

    config
        .remember_user(user.id)
        .context("Failed to save login")?;

    println!("Login successful!");
    println!("  User: {} <{}>", user.username, user.email);
    println!("  ID:   {}", user.id);
    Ok(())
}

/// Fetch a user profile and print it as a field/value table.
pub async fn show_user(client: &DocGenieClient, user_id: i64) -> Result<()> {
    let user = get_user_data(client, user_id)
        .await
        .with_context(|| format!("Failed to fetch user {}", user_id))?;

    print!("{}", format_user_table(&user));
    Ok(())
}

/// Field/value table matching the admin view rows.
pub fn format_user_table(user: &User) -> String {
    let mut out = String::new();
    out.push_str(&format!("\n{:<13}{}\n", "Field", "Value"));
    out.push_str(&format!("{:-<60}\n", ""));
    out.push_str(&format!("{:<13}{}\n", "ID", user.id));
    out.push_str(&format!("{:<13}{}\n", "Username", user.username));
    out.push_str(&format!("{:<13}{}\n", "Email", user.email));
    out.push_str(&format!("{:<13}{}\n", "Admin", user.is_admin));
    if user.permissions.is_empty() {
        out.push_str(&format!("{:<13}(none)\n", "Permissions"));
    }
    for (i, perm) in user.permissions.iter().enumerate() {
        let label = if i == 0 { "Permissions" } else { "" };
        out.push_str(&format!("{:<13}- {}\n", label, perm.permission_name));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Permission;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_login_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/login"))
            .and(body_json(json!({"email": "ada@x.io", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 123, "username": "ada", "email": "ada@x.io", "password": "hash"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DocGenieClient::new(&server.uri()).unwrap();
        let creds = Credentials::validate("ada@x.io", "pw").unwrap();
        let user = assert_ok!(login_data(&client, &creds).await);
        assert_eq!(user.id, 123);
    }

    #[tokio::test]
    async fn test_login_accepts_null_admin_flag() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7, "username": "ada", "email": "ada@x.io", "password": "hash",
                "is_admin": null
            })))
            .mount(&server)
            .await;

        let client = DocGenieClient::new(&server.uri()).unwrap();
        let creds = Credentials::validate("ada@x.io", "pw").unwrap();
        let user = assert_ok!(login_data(&client, &creds).await);
        assert_eq!(user.id, 7);
        assert!(!user.is_admin);
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/login"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "User not found"})))
            .mount(&server)
            .await;

        let client = DocGenieClient::new(&server.uri()).unwrap();
        let creds = Credentials::validate("ada@x.io", "wrong").unwrap();
        let err = assert_err!(login_data(&client, &creds).await);
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_get_user_with_permissions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 123,
                "username": "ada",
                "email": "ada@x.io",
                "is_admin": true,
                "permissions": [
                    {"id": 1, "permission_name": "read_docs"},
                    {"id": 2, "permission_name": "query_sql"}
                ]
            })))
            .mount(&server)
            .await;

        let client = DocGenieClient::new(&server.uri()).unwrap();
        let user = assert_ok!(get_user_data(&client, 123).await);
        assert!(user.is_admin);
        let names: Vec<&str> = user
            .permissions
            .iter()
            .map(|p| p.permission_name.as_str())
            .collect();
        assert_eq!(names, vec!["read_docs", "query_sql"]);
    }

    #[test]
    fn test_format_user_table() {
        let user = User {
            id: 5,
            username: "bob".to_string(),
            email: "bob@x.io".to_string(),
            is_admin: false,
            permissions: vec![
                Permission {
                    id: 1,
                    permission_name: "a".to_string(),
                },
                Permission {
                    id: 2,
                    permission_name: "b".to_string(),
                },
            ],
        };
        let table = format_user_table(&user);
        assert!(table.contains("Admin        false"));
        assert!(table.contains("Permissions  - a"));
        assert_eq!(table.matches("- ").count(), 2);
    }
}

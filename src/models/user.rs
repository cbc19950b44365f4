//! User-related models

use serde::{Deserialize, Deserializer, Serialize};

/// A named permission granted to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: i64,
    pub permission_name: String,
}

/// User profile as returned by `/user/login` and `/user/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Nullable column on the server; `null` reads as false.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_admin: bool,
    /// Only populated by `/user/{id}`; login responses omit it.
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: Vec<Permission>,
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Login request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Reason a login form was rejected before contacting the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsError {
    #[error("Email is missing")]
    MissingEmail,
    #[error("Password is missing")]
    MissingPassword,
}

impl Credentials {
    /// Check the form locally. The email is checked after trimming, the
    /// password as typed.
    pub fn validate(email: &str, password: &str) -> Result<Self, CredentialsError> {
        if email.trim().is_empty() {
            return Err(CredentialsError::MissingEmail);
        }
        if password.is_empty() {
            return Err(CredentialsError::MissingPassword);
        }
        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

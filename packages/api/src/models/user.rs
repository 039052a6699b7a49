//! # User records
//!
//! [`UserRecord`] is the identity the client keeps for the current session. It
//! is what the backend returns from `POST /auth/login/` and what the session
//! layer serialises into the `user_data` storage entry, so it must deserialise
//! both shapes: the backend's (no `is_guest`) and the persisted one.
//!
//! Guest sessions use a sentinel record built by [`UserRecord::guest`].

use serde::{Deserialize, Serialize};

/// Display name of the synthetic guest user.
pub const GUEST_USERNAME: &str = "Guest User";

/// Backend user identifier. The auth service issues integers, but nothing in
/// the client depends on that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{n}"),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

/// User information held by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(alias = "name")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_guest: bool,
}

impl UserRecord {
    /// The sentinel record for guest mode.
    pub fn guest() -> Self {
        Self {
            id: None,
            username: GUEST_USERNAME.to_string(),
            email: None,
            is_guest: true,
        }
    }

    /// Name shown in the page header.
    pub fn display_name(&self) -> &str {
        if self.username.is_empty() {
            GUEST_USERNAME
        } else {
            &self.username
        }
    }
}

/// Body of `POST /auth/login/`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful response of `POST /auth/login/`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub user: UserRecord,
    pub token: String,
}

/// Body of `POST /auth/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

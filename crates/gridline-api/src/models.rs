// Wire envelopes shared by every CRUD endpoint.
//
// Records themselves stay as raw `serde_json::Value` here; per-entity
// codecs in `gridline-core` turn them into domain types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status value that marks a write as accepted.
pub const STATUS_SUCCESS: &str = "success";

/// Reply of a `getAll`-style list endpoint: `{ "result": [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEnvelope {
    #[serde(default)]
    pub result: Option<Vec<Value>>,
}

/// Reply of an add / update / delete endpoint.
///
/// `{ "status": "success", "messages": ["..."], "message": "...", "result": ... }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WriteReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<String>>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
}

impl WriteReply {
    /// Whether the peer reported the write as accepted.
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }

    /// The server-supplied message, if any.
    ///
    /// The first non-empty entry of `messages` wins over `message`.
    pub fn server_message(&self) -> Option<String> {
        self.messages
            .as_ref()
            .and_then(|m| m.iter().find(|s| !s.trim().is_empty()).cloned())
            .or_else(|| self.message.clone().filter(|s| !s.trim().is_empty()))
    }
}

/// Login request body sent to the auth endpoint.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(rename = "companyID")]
    pub company_id: &'a str,
    pub language: &'a str,
}

/// Login reply. Servers disagree on the casing of the token key.
#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, rename = "Token")]
    pub token_upper: Option<String>,
}

impl LoginResponse {
    pub fn into_token(self) -> Option<String> {
        self.token
            .or(self.token_upper)
            .filter(|t| !t.trim().is_empty())
    }
}

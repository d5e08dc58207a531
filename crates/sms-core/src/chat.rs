use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Errors returned by a [`ChatRelay`].
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The backend could not be reached or the transfer failed.
    #[error("network error: {0}")]
    Network(String),
    /// The backend answered with a non-success status.
    #[error("relay returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The backend answered with something that is not a chat reply.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Identifier grouping every message handled by one running bridge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ConversationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload posted to the chat backend for each inbound SMS.
///
/// Empty string fields are left off the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub conversation: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub agent: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tone: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ChatMessage {
    /// Build a fresh message with a new id, no tone and the current UTC time.
    pub fn new(
        conversation: &ConversationId,
        user: impl Into<String>,
        agent: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation: conversation.as_str().to_string(),
            user: user.into(),
            agent: agent.into(),
            content: content.into(),
            tone: String::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Reply produced by the chat backend. Only `content` is relayed back over SMS.
///
/// Missing and `null` fields both decode as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tone: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[async_trait]
pub trait ChatRelay: Send + Sync {
    /// Forward one message to the chat backend and wait for its reply.
    async fn send(&self, msg: &ChatMessage) -> Result<ChatReply, RelayError>;
}

//! # SMS Core
//!
//! Core traits and types for the SMS chat bridge.
//!
//! This crate provides the building blocks the bridge is assembled from:
//! - [`SmsClient`] trait for sending SMS replies through a provider
//! - [`InboundWebhook`] trait for parsing provider webhooks
//! - [`ChatRelay`] trait for talking to the chat backend
//! - [`Directory`], the persisted phone-number-to-name mapping
//!
//! ## Example
//!
//! ```rust,ignore
//! use sms_core::{Directory, SendRequest, SmsClient};
//!
//! let directory = Directory::load("numbers.json")?;
//! if let Some(name) = directory.lookup("+15551230001") {
//!     client.send(SendRequest {
//!         to: "+15551230001",
//!         from: "+15550000000",
//!         text: &format!("Hello {name}"),
//!     }).await?;
//! }
//! ```

mod chat;
mod directory;

pub use chat::{ChatMessage, ChatRelay, ChatReply, ConversationId, RelayError};
pub use directory::{Directory, DirectoryError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during SMS operations
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// HTTP communication error
    #[error("http error: {0}")]
    Http(String),
    /// Authentication/authorization error
    #[error("authentication error: {0}")]
    Auth(String),
    /// Invalid request parameters or webhook payload
    #[error("invalid request: {0}")]
    Invalid(String),
    /// SMS provider returned an error
    #[error("provider error: {0}")]
    Provider(String),
}

/// Reasons a single inbound webhook is abandoned.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("parsing failed: {0}")]
    ParseError(String),
    /// Sender is not in the directory. Dropped silently, never reported to the sender.
    #[error("unknown number: {0}")]
    UnknownSender(String),
    #[error("chat relay failed: {0}")]
    Relay(#[from] RelayError),
    #[error("SMS send failed: {0}")]
    SmsError(#[from] SmsError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest<'a> {
    pub to: &'a str,
    pub from: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendResponse {
    pub id: String,
    /// Name of the provider that produced the response, e.g. "twilio".
    pub provider: &'static str,
    /// Raw provider payload for debugging / audit.
    pub raw: serde_json::Value,
}

/// Normalized inbound SMS.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: Option<String>,
    pub from: String,
    pub to: String,
    pub text: String,
    pub provider: &'static str,
    pub raw: serde_json::Value,
}

#[async_trait]
pub trait SmsClient: Send + Sync {
    /// Send a single text SMS.
    async fn send(&self, req: SendRequest<'_>) -> Result<SendResponse, SmsError>;
}

/// Utility to create a pseudo id if a provider doesn't return one.
pub fn fallback_id() -> String {
    Uuid::new_v4().to_string()
}

/// Lightweight header representation to avoid tying the core to any HTTP framework.
pub type Headers = Vec<(String, String)>;

/// Provider-specific inbound webhook parsing.
pub trait InboundWebhook: Send + Sync {
    /// Stable provider key, e.g. "twilio".
    fn provider(&self) -> &'static str;
    /// Parse the incoming HTTP payload (headers + raw body) into a normalized `InboundMessage`.
    fn parse_inbound(&self, headers: &Headers, body: &[u8]) -> Result<InboundMessage, SmsError>;
}

//! # Chat Relay
//!
//! [`HttpChatRelay`] forwards one [`ChatMessage`] per inbound SMS to the chat
//! backend as a JSON `POST` and decodes the [`ChatReply`] it answers with.
//! There is no retry and, unless configured, no timeout.

use std::time::Duration;

use async_trait::async_trait;
use sms_core::{ChatMessage, ChatRelay, ChatReply, RelayError};
use tracing::debug;

/// Endpoint the chat backend listens on when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/chat/send";

#[derive(Clone, Debug)]
pub struct HttpChatRelay {
    endpoint: String,
    http: reqwest::Client,
}

impl HttpChatRelay {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Bound every relay call by `timeout`.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Network(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpChatRelay {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

#[async_trait]
impl ChatRelay for HttpChatRelay {
    async fn send(&self, msg: &ChatMessage) -> Result<ChatReply, RelayError> {
        debug!(endpoint = %self.endpoint, id = %msg.id, "Relaying message to chat backend");

        let res = self
            .http
            .post(&self.endpoint)
            .json(msg)
            .send()
            .await
            .map_err(|e| RelayError::Network(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| RelayError::Network(e.to_string()))?;
        debug!(%status, bytes = body.len(), "Chat backend responded");

        if !status.is_success() {
            return Err(RelayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| RelayError::Decode(e.to_string()))
    }
}

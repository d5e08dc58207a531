//! # Twilio SMS Provider
//!
//! Sends replies through the Twilio Messages REST API and parses Twilio's
//! `application/x-www-form-urlencoded` inbound SMS webhooks.
//!
//! ```rust,ignore
//! use sms_core::{SendRequest, SmsClient};
//! use sms_twilio::TwilioClient;
//!
//! let client = TwilioClient::new("ACxxxxxxxx", "auth_token");
//! let response = client.send(SendRequest {
//!     to: "+15551230001",
//!     from: "+15550000000",
//!     text: "Hi Alice",
//! }).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sms_core::{
    Headers, InboundMessage, InboundWebhook, SendRequest, SendResponse, SmsClient, SmsError,
};
use tracing::{debug, warn};

const PROVIDER: &str = "twilio";

/// Twilio REST client.
#[derive(Clone, Debug)]
pub struct TwilioClient {
    /// Twilio Account SID (Basic auth username).
    pub account_sid: String,
    /// Twilio Auth Token (Basic auth password).
    pub auth_token: String,
    /// API base URL; override for testing/mocking.
    pub base_url: String,
    http: reqwest::Client,
}

impl TwilioClient {
    pub fn new<S: Into<String>>(account_sid: S, auth_token: S) -> Self {
        Self::with_base_url(account_sid, auth_token, "https://api.twilio.com".to_string())
    }

    pub fn with_base_url<S: Into<String>>(account_sid: S, auth_token: S, base_url: String) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            base_url,
            http: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url.trim_end_matches('/'),
            self.account_sid
        )
    }
}

#[derive(Debug, Serialize)]
struct TwilioSendRequest<'a> {
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "Body")]
    body: &'a str,
}

#[async_trait]
impl SmsClient for TwilioClient {
    async fn send(&self, req: SendRequest<'_>) -> Result<SendResponse, SmsError> {
        let payload = TwilioSendRequest {
            to: req.to,
            from: req.from,
            body: req.text,
        };
        debug!(to = req.to, "Sending SMS via Twilio");

        let res = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&payload)
            .send()
            .await
            .map_err(|e| SmsError::Http(e.to_string()))?;

        let status = res.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SmsError::Auth(format!(
                "Twilio rejected credentials for account {}",
                self.account_sid
            )));
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SmsError::Provider(format!("HTTP {}: {}", status, body)));
        }

        let raw_text = res
            .text()
            .await
            .map_err(|e| SmsError::Http(e.to_string()))?;
        let raw_json: serde_json::Value = serde_json::from_str(&raw_text)
            .unwrap_or_else(|_| serde_json::json!({ "raw": raw_text }));

        let id = match raw_json.get("sid").and_then(|v| v.as_str()) {
            Some(sid) => sid.to_string(),
            None => {
                warn!("Twilio response carried no message sid");
                sms_core::fallback_id()
            }
        };

        Ok(SendResponse {
            id,
            provider: PROVIDER,
            raw: raw_json,
        })
    }
}

/// Form fields Twilio posts for an inbound SMS.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TwilioInbound {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "To", default)]
    pub to: String,
    #[serde(rename = "Body", default)]
    pub body: String,
    #[serde(rename = "MessageSid")]
    pub message_sid: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl From<TwilioInbound> for InboundMessage {
    fn from(t: TwilioInbound) -> Self {
        let raw = serde_json::to_value(&t).unwrap_or_default();
        InboundMessage {
            id: t.message_sid,
            from: t.from,
            to: t.to,
            text: t.body,
            provider: PROVIDER,
            raw,
        }
    }
}

impl InboundWebhook for TwilioClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    fn parse_inbound(&self, _headers: &Headers, body: &[u8]) -> Result<InboundMessage, SmsError> {
        let inbound: TwilioInbound = serde_urlencoded::from_bytes(body)
            .map_err(|e| SmsError::Invalid(format!("form decode: {}", e)))?;
        Ok(inbound.into())
    }
}

use std::sync::Arc;

use sms_core::{
    ChatMessage, ChatRelay, ConversationId, Directory, Headers, InboundWebhook, SendRequest,
    SendResponse, SmsClient, WebhookError,
};
use tracing::{error, info, warn};

/// Fixed values every reply is produced with.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Provider-assigned number replies are sent from.
    pub from_number: String,
    /// Agent name the chat backend answers as.
    pub agent: String,
    /// Conversation shared by every inbound message of this process.
    pub conversation: ConversationId,
}

/// What happened to one inbound webhook.
///
/// Informational only: the HTTP caller never sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Replied { to: String, message_id: String },
    Malformed(String),
    UnknownSender(String),
    RelayFailed(String),
    SendFailed(String),
}

/// Framework-agnostic webhook processor that handles the core bridge logic
#[derive(Clone)]
pub struct WebhookProcessor {
    inbound: Arc<dyn InboundWebhook>,
    sms: Arc<dyn SmsClient>,
    relay: Arc<dyn ChatRelay>,
    directory: Arc<Directory>,
    settings: Arc<BridgeSettings>,
}

impl WebhookProcessor {
    pub fn new(
        inbound: Arc<dyn InboundWebhook>,
        sms: Arc<dyn SmsClient>,
        relay: Arc<dyn ChatRelay>,
        directory: Directory,
        settings: BridgeSettings,
    ) -> Self {
        Self {
            inbound,
            sms,
            relay,
            directory: Arc::new(directory),
            settings: Arc::new(settings),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// Run one inbound webhook through parse, lookup, relay and reply.
    ///
    /// Every failure is logged and ends processing of this request only.
    pub async fn process_webhook(&self, headers: Headers, body: &[u8]) -> WebhookOutcome {
        match self.process_webhook_internal(&headers, body).await {
            Ok((to, sent)) => {
                info!(
                    provider = sent.provider,
                    message_id = %sent.id,
                    "Sent reply to {}", to
                );
                WebhookOutcome::Replied {
                    to,
                    message_id: sent.id,
                }
            }
            Err(e) => self.error_to_outcome(e),
        }
    }

    async fn process_webhook_internal(
        &self,
        headers: &Headers,
        body: &[u8],
    ) -> Result<(String, SendResponse), WebhookError> {
        let inbound = self
            .inbound
            .parse_inbound(headers, body)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let name = self
            .directory
            .lookup(&inbound.from)
            .ok_or_else(|| WebhookError::UnknownSender(inbound.from.clone()))?;

        info!(
            provider = self.inbound.provider(),
            "Received message from {} | {}: {}", inbound.from, name, inbound.text
        );

        let msg = ChatMessage::new(
            &self.settings.conversation,
            name,
            self.settings.agent.as_str(),
            inbound.text.as_str(),
        );
        let reply = self.relay.send(&msg).await?;

        let sent = self
            .sms
            .send(SendRequest {
                to: &inbound.from,
                from: &self.settings.from_number,
                text: &reply.content,
            })
            .await?;

        Ok((inbound.from, sent))
    }

    fn error_to_outcome(&self, error: WebhookError) -> WebhookOutcome {
        match error {
            WebhookError::ParseError(msg) => {
                warn!("Error parsing message data: {}", msg);
                WebhookOutcome::Malformed(msg)
            }
            WebhookError::UnknownSender(from) => {
                info!("Unknown number {}", from);
                WebhookOutcome::UnknownSender(from)
            }
            WebhookError::Relay(e) => {
                error!(error = %e, "Error sending message to chat backend");
                WebhookOutcome::RelayFailed(e.to_string())
            }
            WebhookError::SmsError(e) => {
                error!(error = %e, "Error creating SMS response");
                WebhookOutcome::SendFailed(e.to_string())
            }
        }
    }
}

/// Helper trait for framework adapters to convert headers
pub trait HeaderConverter {
    type HeaderType;

    fn to_generic_headers(headers: &Self::HeaderType) -> Headers;
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sms_core::{ChatReply, InboundMessage, RelayError, SmsError};
    use std::sync::Mutex;

    /// Accepts bodies shaped like `from|text`.
    struct PipeInbound;

    impl InboundWebhook for PipeInbound {
        fn provider(&self) -> &'static str {
            "pipe"
        }

        fn parse_inbound(&self, _headers: &Headers, body: &[u8]) -> Result<InboundMessage, SmsError> {
            let body = std::str::from_utf8(body).map_err(|e| SmsError::Invalid(e.to_string()))?;
            let (from, text) = body
                .split_once('|')
                .ok_or_else(|| SmsError::Invalid("missing separator".into()))?;
            Ok(InboundMessage {
                id: None,
                from: from.to_string(),
                to: "+15550000000".to_string(),
                text: text.to_string(),
                provider: "pipe",
                raw: serde_json::Value::Null,
            })
        }
    }

    #[derive(Default)]
    struct RecordingSms {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl SmsClient for RecordingSms {
        async fn send(&self, req: SendRequest<'_>) -> Result<SendResponse, SmsError> {
            self.sent.lock().unwrap().push((
                req.to.to_string(),
                req.from.to_string(),
                req.text.to_string(),
            ));
            if self.fail {
                return Err(SmsError::Provider("HTTP 400: invalid number".into()));
            }
            Ok(SendResponse {
                id: "SM1".into(),
                provider: "recording",
                raw: serde_json::Value::Null,
            })
        }
    }

    #[derive(Default)]
    struct ScriptedRelay {
        seen: Mutex<Vec<ChatMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatRelay for ScriptedRelay {
        async fn send(&self, msg: &ChatMessage) -> Result<ChatReply, RelayError> {
            self.seen.lock().unwrap().push(msg.clone());
            if self.fail {
                return Err(RelayError::Network("connection refused".into()));
            }
            Ok(ChatReply {
                content: format!("Hi {}", msg.user),
                ..ChatReply::default()
            })
        }
    }

    fn processor(sms: Arc<RecordingSms>, relay: Arc<ScriptedRelay>) -> WebhookProcessor {
        let directory: Directory = [("+15551230001", "Alice")].into_iter().collect();
        WebhookProcessor::new(
            Arc::new(PipeInbound),
            sms,
            relay,
            directory,
            BridgeSettings {
                from_number: "+15550000000".into(),
                agent: "Rose".into(),
                conversation: ConversationId::from("conv-1".to_string()),
            },
        )
    }

    #[tokio::test]
    async fn known_sender_gets_reply() {
        let sms = Arc::new(RecordingSms::default());
        let relay = Arc::new(ScriptedRelay::default());
        let processor = processor(sms.clone(), relay.clone());

        let outcome = processor
            .process_webhook(vec![], b"+15551230001|Hello")
            .await;
        assert_eq!(
            outcome,
            WebhookOutcome::Replied {
                to: "+15551230001".into(),
                message_id: "SM1".into()
            }
        );

        let seen = relay.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].user, "Alice");
        assert_eq!(seen[0].agent, "Rose");
        assert_eq!(seen[0].content, "Hello");
        assert_eq!(seen[0].conversation, "conv-1");

        let sent = sms.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![(
                "+15551230001".to_string(),
                "+15550000000".to_string(),
                "Hi Alice".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn unknown_sender_makes_no_calls() {
        let sms = Arc::new(RecordingSms::default());
        let relay = Arc::new(ScriptedRelay::default());
        let processor = processor(sms.clone(), relay.clone());

        let outcome = processor.process_webhook(vec![], b"+19998887777|Hey").await;
        assert_eq!(outcome, WebhookOutcome::UnknownSender("+19998887777".into()));
        assert!(relay.seen.lock().unwrap().is_empty());
        assert!(sms.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_makes_no_calls() {
        let sms = Arc::new(RecordingSms::default());
        let relay = Arc::new(ScriptedRelay::default());
        let processor = processor(sms.clone(), relay.clone());

        let outcome = processor.process_webhook(vec![], b"garbage").await;
        assert!(matches!(outcome, WebhookOutcome::Malformed(_)));
        assert!(relay.seen.lock().unwrap().is_empty());
        assert!(sms.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn relay_failure_skips_reply() {
        let sms = Arc::new(RecordingSms::default());
        let relay = Arc::new(ScriptedRelay {
            fail: true,
            ..ScriptedRelay::default()
        });
        let processor = processor(sms.clone(), relay.clone());

        let outcome = processor
            .process_webhook(vec![], b"+15551230001|Hello")
            .await;
        assert!(matches!(outcome, WebhookOutcome::RelayFailed(ref m) if m.contains("refused")));
        assert_eq!(relay.seen.lock().unwrap().len(), 1);
        assert!(sms.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn send_failure_is_reported_once() {
        let sms = Arc::new(RecordingSms {
            fail: true,
            ..RecordingSms::default()
        });
        let relay = Arc::new(ScriptedRelay::default());
        let processor = processor(sms.clone(), relay.clone());

        let outcome = processor
            .process_webhook(vec![], b"+15551230001|Hello")
            .await;
        assert!(matches!(outcome, WebhookOutcome::SendFailed(_)));
        assert_eq!(sms.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn conversation_is_shared_across_senders_and_requests() {
        let sms = Arc::new(RecordingSms::default());
        let relay = Arc::new(ScriptedRelay::default());
        let directory: Directory = [("+15551230001", "Alice"), ("+15551230002", "Bob")]
            .into_iter()
            .collect();
        let processor = WebhookProcessor::new(
            Arc::new(PipeInbound),
            sms,
            relay.clone(),
            directory,
            BridgeSettings {
                from_number: "+15550000000".into(),
                agent: "Rose".into(),
                conversation: ConversationId::generate(),
            },
        );

        processor.process_webhook(vec![], b"+15551230001|one").await;
        processor.process_webhook(vec![], b"+15551230002|two").await;

        let seen = relay.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].conversation, seen[1].conversation);
        assert_eq!(seen[0].conversation, processor.settings().conversation.as_str());
        assert_ne!(seen[0].id, seen[1].id);
    }
}

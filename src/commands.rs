//! The three bridge commands: `serve`, `add` and `remove`.
//!
//! Each one loads the directory file first; any failure is returned to the
//! caller, which treats it as fatal.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sms_core::{ConversationId, Directory};
use sms_relay::HttpChatRelay;
use sms_twilio::TwilioClient;
use sms_web_axum::AppState;
use sms_web_generic::{BridgeSettings, WebhookProcessor};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::BridgeError;

/// Insert or overwrite `phone -> name` and save the file.
pub fn add(file: &Path, name: &str, phone: &str) -> Result<Directory, BridgeError> {
    if name.is_empty() || phone.is_empty() {
        return Err(BridgeError::InvalidArgument(
            "name and phone number must be provided in that order".into(),
        ));
    }

    let mut directory = Directory::load(file)?;
    match directory.insert(phone, name) {
        Some(previous) => info!("Replaced {} with {} for {}", previous, name, phone),
        None => info!("Added {} at {}", name, phone),
    }
    directory.save(file)?;
    Ok(directory)
}

/// Remove every entry named `name` and save the file.
///
/// Entries are matched by name, not by phone number. An unknown name still
/// rewrites the file.
pub fn remove(file: &Path, name: &str) -> Result<Vec<String>, BridgeError> {
    if name.is_empty() {
        return Err(BridgeError::InvalidArgument("name must be provided".into()));
    }

    let mut directory = Directory::load(file)?;
    let removed = directory.remove_name(name);
    if removed.is_empty() {
        warn!("No entry named {} in {}", name, file.display());
    } else {
        info!("Removed {} ({})", name, removed.join(", "));
    }
    directory.save(file)?;
    Ok(removed)
}

/// Wire Twilio, the chat relay and the directory into a processor.
///
/// A fresh conversation id is generated on every call.
pub fn build_processor(
    config: &AppConfig,
    directory: Directory,
) -> Result<WebhookProcessor, BridgeError> {
    let creds = config.twilio.credentials()?;
    let twilio = Arc::new(TwilioClient::with_base_url(
        creds.account_sid,
        creds.auth_token,
        config.twilio.base_url.clone(),
    ));

    let relay = match config.relay.timeout_seconds {
        Some(secs) => {
            HttpChatRelay::with_timeout(config.relay.endpoint.clone(), Duration::from_secs(secs))?
        }
        None => HttpChatRelay::new(config.relay.endpoint.clone()),
    };

    let settings = BridgeSettings {
        from_number: creds.phone_number,
        agent: config.relay.agent.clone(),
        conversation: ConversationId::generate(),
    };
    info!(conversation = %settings.conversation, relay = %relay.endpoint(), "Bridge configured");

    Ok(WebhookProcessor::new(
        twilio.clone(),
        twilio,
        Arc::new(relay),
        directory,
        settings,
    ))
}

/// Load the directory and serve `POST /sms` until interrupted.
pub async fn serve(config: &AppConfig, file: &Path, port: Option<u16>) -> Result<(), BridgeError> {
    let directory = Directory::load(file)?;
    info!(entries = directory.len(), "Loaded directory from {}", file.display());

    let processor = build_processor(config, directory)?;
    let app = sms_web_axum::router(AppState { processor });

    let addr = format!("{}:{}", config.server.host, port.unwrap_or(config.server.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Starting server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

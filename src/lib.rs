//! # SMS Bridge
//!
//! Relays text messages between Twilio and a chat backend.
//!
//! An inbound SMS posted to `/sms` is matched against a small phone-number
//! directory, forwarded to the chat backend as JSON, and the backend's reply
//! is texted back to the sender. Messages from numbers missing from the
//! directory are dropped.
//!
//! ## Quick Start
//!
//! ```text
//! $ echo '{}' > numbers.json
//! $ sms-bridge add --file numbers.json Alice +15551230001
//! $ TWILIO_ACCOUNT_SID=AC... TWILIO_AUTH_TOKEN=... TWILIO_PHONE_NUMBER=+15550000000 \
//!     sms-bridge serve --file numbers.json 6000
//! ```
//!
//! ## Configuration
//!
//! Settings are layered from `config/default`, `config/{RUN_MODE}`,
//! `config/local` and `SMSBRIDGE_*` environment variables:
//!
//! ```rust,ignore
//! use sms_bridge::AppConfig;
//!
//! let config = AppConfig::load()?;
//! println!("Relaying to {} as {}", config.relay.endpoint, config.relay.agent);
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod telemetry;

pub use crate::config::*;
pub use error::BridgeError;

/// Common imports for SMS Bridge usage
pub mod prelude {
    pub use crate::config::{AppConfig, LoggingConfig, RelayConfig, ServerConfig, TwilioConfig};
    pub use crate::error::BridgeError;
    pub use sms_core::*;
    pub use sms_web_generic::{BridgeSettings, WebhookOutcome, WebhookProcessor};
}

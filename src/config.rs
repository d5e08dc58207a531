use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::BridgeError;

/// Application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// HTTP listener configuration
    pub server: ServerConfig,
    /// Twilio account and sending number
    pub twilio: TwilioConfig,
    /// Chat backend configuration
    pub relay: RelayConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Server host (default: 0.0.0.0)
    pub host: String,
    /// Port used when `serve` gets none on the command line (default: 6000)
    pub port: u16,
}

/// Twilio provider configuration
///
/// The three credentials also come from `TWILIO_ACCOUNT_SID`,
/// `TWILIO_AUTH_TOKEN` and `TWILIO_PHONE_NUMBER`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TwilioConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    /// Provider-assigned number replies are sent from
    pub phone_number: Option<String>,
    /// REST API base URL (default: https://api.twilio.com)
    pub base_url: String,
}

/// Chat backend configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RelayConfig {
    /// Chat endpoint (default: http://localhost:8080/chat/send)
    pub endpoint: String,
    /// Agent the backend answers as (default: Rose)
    pub agent: String,
    /// Per-call timeout in seconds; unset waits forever
    pub timeout_seconds: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level, overridden by RUST_LOG (default: info)
    pub level: String,
    /// Log format: pretty or json (default: pretty)
    pub format: String,
}

/// Settings `serve` cannot start without.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub phone_number: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 6000,
        }
    }
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            phone_number: None,
            base_url: "https://api.twilio.com".to_string(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: sms_relay::DEFAULT_ENDPOINT.to_string(),
            agent: "Rose".to_string(),
            timeout_seconds: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl TwilioConfig {
    pub fn credentials(&self) -> Result<TwilioCredentials, BridgeError> {
        fn present(value: &Option<String>) -> Option<String> {
            value.as_ref().filter(|v| !v.is_empty()).cloned()
        }

        let (Some(account_sid), Some(auth_token)) =
            (present(&self.account_sid), present(&self.auth_token))
        else {
            return Err(BridgeError::MissingSetting(
                "TWILIO_ACCOUNT_SID and TWILIO_AUTH_TOKEN",
            ));
        };
        let phone_number = present(&self.phone_number)
            .ok_or(BridgeError::MissingSetting("TWILIO_PHONE_NUMBER"))?;

        Ok(TwilioCredentials {
            account_sid,
            auth_token,
            phone_number,
        })
    }
}

impl AppConfig {
    /// Load configuration from `config/` files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::load_from(Path::new("config"), &run_mode)
    }

    /// Load configuration with files looked up in `dir`
    pub fn load_from(dir: &Path, run_mode: &str) -> Result<Self, ConfigError> {
        let file = |name: &str| File::with_name(&dir.join(name).to_string_lossy()).required(false);

        let s = Config::builder()
            // Start with default configuration
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(file("default"))
            .add_source(file(run_mode))
            // Add local configuration file (gitignored)
            .add_source(file("local"))
            // Add environment variables (SMSBRIDGE_SERVER__PORT=7000)
            .add_source(
                Environment::with_prefix("SMSBRIDGE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            // Provider credentials keep their conventional names
            .set_override_option("twilio.account_sid", env::var("TWILIO_ACCOUNT_SID").ok())?
            .set_override_option("twilio.auth_token", env::var("TWILIO_AUTH_TOKEN").ok())?
            .set_override_option("twilio.phone_number", env::var("TWILIO_PHONE_NUMBER").ok())?
            .build()?;

        s.try_deserialize()
    }
}

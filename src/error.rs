use sms_core::{DirectoryError, RelayError};

/// Errors that stop a bridge command. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("{0} must be set")]
    MissingSetting(&'static str),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("chat relay setup failed: {0}")]
    Relay(#[from] RelayError),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

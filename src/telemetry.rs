use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::BridgeError;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), BridgeError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| BridgeError::Logging(e.to_string()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = match config.format.as_str() {
        "json" => builder.json().try_init(),
        "pretty" => builder.try_init(),
        other => {
            return Err(BridgeError::Logging(format!(
                "unknown log format {other:?}, expected pretty or json"
            )));
        }
    };
    result.map_err(|e| BridgeError::Logging(e.to_string()))
}

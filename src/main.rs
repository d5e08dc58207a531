use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sms_bridge::{AppConfig, BridgeError, commands, telemetry};
use tracing::error;

/// Twilio HTTP bridge for a chat backend.
#[derive(Parser, Debug)]
#[command(name = "sms-bridge")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the Twilio bridge server
    Serve {
        /// File path to the numbers file
        #[arg(long)]
        file: PathBuf,

        /// Port to listen on (default from config, 6000)
        port: Option<u16>,
    },

    /// Add a person + phone number to the bridge
    Add {
        /// File path to the numbers file
        #[arg(long)]
        file: PathBuf,

        /// Display name
        name: String,

        /// Phone number, as the provider formats it (e.g. +15551230001)
        phone: String,
    },

    /// Remove a person from the bridge
    Remove {
        /// File path to the numbers file
        #[arg(long)]
        file: PathBuf,

        /// Display name to remove
        name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Arguments first, so --help and usage errors never depend on config or logging.
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", BridgeError::from(e));
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = telemetry::init_tracing(&config.logging) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: &AppConfig) -> Result<(), BridgeError> {
    match cli.command {
        Command::Serve { file, port } => commands::serve(config, &file, port).await,
        Command::Add { file, name, phone } => {
            commands::add(&file, &name, &phone)?;
            Ok(())
        }
        Command::Remove { file, name } => {
            commands::remove(&file, &name)?;
            Ok(())
        }
    }
}

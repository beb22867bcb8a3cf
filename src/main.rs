use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hrm_reasoning::{
    config::{Config, LogFormat},
    llm::{CompletionClient, TextCompletion},
    server::{AppState, RpcServer},
};

#[derive(Parser)]
#[command(name = "hrm-reasoning", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve JSON-RPC requests on stdin/stdout (default)
    Serve,
    /// Probe the completion service and exit 0 if it answers
    CheckLlm,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::CheckLlm => check_llm(&config).await,
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        strategy = %config.engine.strategy,
        "HRM reasoning server starting..."
    );

    let state = match AppState::from_config(config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!(error = %e, "Failed to initialize reasoning engine");
            return Err(e.into());
        }
    };

    let server = RpcServer::new(state);
    info!("Server ready, waiting for requests on stdin...");

    if let Err(e) = server.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn check_llm(config: &Config) -> anyhow::Result<()> {
    let client = CompletionClient::new(&config.llm)?;
    if client.is_available().await {
        info!(base_url = %client.base_url(), model = %client.model(), "Completion service available");
        Ok(())
    } else {
        error!(base_url = %client.base_url(), "Completion service unavailable");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging. Output goes to stderr; stdout carries JSON-RPC.
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

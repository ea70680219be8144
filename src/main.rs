//! Main entry point for the bmrs-data-downloader CLI

use bmrs_data_downloader::cli::{Cli, Commands};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    // Check if JSON output is requested via environment variable
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bmrs_data_downloader=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    // A .env file is honoured but not required.
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Retrieve(ref cmd) => cmd.execute().await,
        Commands::Fetch(ref cmd) => cmd.execute().await,
        Commands::Analyze(ref cmd) => cmd.execute().await,
        Commands::Validate(ref cmd) => cmd.execute(),
    };

    if let Err(e) = result {
        error!("Command failed: {e}");
        std::process::exit(1);
    }
}

//! CLI command implementations

use clap::{Parser, Subcommand};

pub mod analyze;
pub mod error;
pub mod fetch;
pub mod retrieve;
pub mod validate;

pub use analyze::AnalyzeCommand;
pub use error::CliError;
pub use fetch::FetchCommand;
pub use retrieve::RetrieveCommand;
pub use validate::ValidateCommand;

/// BMRS settlement-report downloader
#[derive(Parser, Debug)]
#[command(name = "bmrs-data-downloader", version, about)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve a report across a period range and write the records
    Retrieve(RetrieveCommand),
    /// Fetch one period's raw response body and save it to a file
    Fetch(FetchCommand),
    /// Retrieve, convert and summarise the standard report pair
    Analyze(AnalyzeCommand),
    /// Validate inputs and configuration without touching the network
    Validate(ValidateCommand),
}

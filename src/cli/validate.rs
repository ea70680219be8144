//! Validation subcommand

use clap::Parser;

use crate::config::{ApiConfig, ReportColumns, RetrievalConfig};
use crate::is_valid_report_name;

use super::CliError;

/// Validate command for checking inputs and configuration offline
#[derive(Parser, Debug)]
pub struct ValidateCommand {
    /// What to validate
    #[command(subcommand)]
    pub target: ValidateTarget,
}

/// Target type for validation
#[derive(clap::Subcommand, Debug)]
pub enum ValidateTarget {
    /// Validate a report name
    ReportName {
        /// Report name to validate (e.g. B1770)
        name: String,
    },
    /// Validate a settlement date
    Date {
        /// Settlement date to validate (YYYY-MM-DD)
        date: String,
    },
    /// Check that all required environment configuration is present
    Config,
}

impl ValidateCommand {
    /// Execute the validation command
    pub fn execute(&self) -> Result<(), CliError> {
        match &self.target {
            ValidateTarget::ReportName { name } => self.validate_report_name(name),
            ValidateTarget::Date { date } => self.validate_date(date),
            ValidateTarget::Config => self.validate_config(),
        }
    }

    fn validate_report_name(&self, name: &str) -> Result<(), CliError> {
        if is_valid_report_name(name) {
            println!("Valid report name: {name}");
            Ok(())
        } else {
            eprintln!("Invalid report name: {name} (expected 'B' followed by digits)");
            Err(CliError::InvalidArgument(format!(
                "invalid report name: {name}"
            )))
        }
    }

    fn validate_date(&self, date: &str) -> Result<(), CliError> {
        match chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(parsed) if parsed.format("%Y-%m-%d").to_string() == date => {
                println!("Valid settlement date: {date}");
                Ok(())
            }
            _ => {
                eprintln!("Invalid settlement date: {date} (expected YYYY-MM-DD)");
                Err(CliError::InvalidArgument(format!(
                    "invalid settlement date: {date}"
                )))
            }
        }
    }

    fn validate_config(&self) -> Result<(), CliError> {
        let api = ApiConfig::from_env()?;
        let retrieval = RetrievalConfig::from_env()?;
        let columns = ReportColumns::from_env()?;

        println!("API configuration:");
        println!("  Host: {}", api.host);
        println!("  Version: {}", api.version);
        println!("  URL suffix template: {}", api.url_end_str);
        println!("  API key: present");
        println!("Retrieval configuration:");
        println!("  Timeout: {:?}", retrieval.timeout);
        println!("  Max tries: {}", retrieval.max_tries);
        println!("  Max concurrent tasks: {}", retrieval.max_concurrent_tasks);
        println!("  Rate limit sleep: {:?}", retrieval.rate_limit_sleep);
        println!("Report columns:");
        println!("  B1770: {}", columns.b1770_column);
        println!("  B1780: {}", columns.b1780_column);
        Ok(())
    }
}

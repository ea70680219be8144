//! Analyze command implementation
//!
//! The end-to-end pipeline for the standard report pair: retrieve a full
//! day, convert to a 30-minute series, and print the daily summary.

use chrono::{Duration, Utc};
use clap::Parser;
use tracing::warn;

use crate::analysis::{summarise, value_column};
use crate::config::{ApiConfig, ReportColumns, RetrievalConfig};
use crate::fetcher::http::HttpPeriodFetcher;
use crate::retriever::DataRetriever;
use crate::series::ReportSeries;

use super::CliError;

/// Days behind today used when no settlement date is given; the reporting
/// API publishes settlement data with a lag
const DEFAULT_DATE_LAG_DAYS: i64 = 4;

/// Retrieve, convert and summarise the standard report pair
#[derive(Parser, Debug)]
pub struct AnalyzeCommand {
    /// Reports to analyse
    #[arg(long, value_delimiter = ',', default_values_t = ["B1770".to_string(), "B1780".to_string()])]
    pub reports: Vec<String>,

    /// Settlement date (YYYY-MM-DD); defaults to four days ago
    #[arg(long)]
    pub date: Option<String>,
}

impl AnalyzeCommand {
    /// Execute the analyze command
    pub async fn execute(&self) -> Result<(), CliError> {
        let api = ApiConfig::from_env()?;
        let retrieval = RetrievalConfig::from_env()?;
        let columns = ReportColumns::from_env()?;

        let date = self.date.clone().unwrap_or_else(|| {
            (Utc::now() - Duration::days(DEFAULT_DATE_LAG_DAYS))
                .format("%Y-%m-%d")
                .to_string()
        });

        let max_concurrent = retrieval.max_concurrent_tasks;
        let retriever =
            DataRetriever::new(HttpPeriodFetcher::new(api, retrieval), max_concurrent);

        for report in &self.reports {
            let column = value_column(&columns, report).ok_or_else(|| {
                CliError::InvalidArgument(format!("no value column configured for {report}"))
            })?;

            let records = retriever.retrieve_report(report.clone(), date.clone()).await?;
            if records.is_empty() {
                warn!(report = %report, date = %date, "no records retrieved, skipping analysis");
                continue;
            }

            let series = ReportSeries::from_records(column, &records)?;
            let summary = summarise(report, &series)?;
            println!("{summary}");
        }

        Ok(())
    }
}

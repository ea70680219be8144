//! Fetch command implementation (single-shot retrieval)

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::config::{ApiConfig, RetrievalConfig};
use crate::fetcher::http::HttpPeriodFetcher;
use crate::fetcher::PeriodRequest;
use crate::{ServiceFormat, MAX_PERIOD, MIN_PERIOD};

use super::CliError;

/// Fetch one period's raw response body and save it to a file
#[derive(Parser, Debug)]
pub struct FetchCommand {
    /// Report to fetch (e.g. B1770)
    pub report: String,

    /// Settlement date (YYYY-MM-DD)
    pub date: String,

    /// Settlement period to fetch
    #[arg(long, default_value_t = MIN_PERIOD)]
    pub period: u32,

    /// Response format requested from the API
    #[arg(long, default_value = "csv")]
    pub format: String,

    /// Output path; defaults to {report}_{date}.{format}
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl FetchCommand {
    /// Execute the fetch command
    pub async fn execute(&self) -> Result<(), CliError> {
        if !(MIN_PERIOD..=MAX_PERIOD).contains(&self.period) {
            return Err(CliError::InvalidArgument(format!(
                "period {} out of range {MIN_PERIOD}-{MAX_PERIOD}",
                self.period
            )));
        }

        let api = ApiConfig::from_env()?;
        let retrieval = RetrievalConfig::from_env()?;

        let format: ServiceFormat = self.format.parse()?;
        let request = PeriodRequest {
            report_name: self.report.clone(),
            settlement_date: self.date.clone(),
            period: self.period,
            service_format: format,
        };

        let fetcher = HttpPeriodFetcher::new(api, retrieval);
        let body = fetcher.fetch_period_raw(&request).await.ok_or_else(|| {
            CliError::RetrievalFailed(format!(
                "no data retrieved for {} period {} on {}",
                self.report, self.period, self.date
            ))
        })?;

        let path = self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!("{}_{}.{format}", self.report, self.date))
        });
        std::fs::write(&path, &body)?;

        info!(bytes = body.len(), path = %path.display(), "file saved");
        println!("file saved to {}", path.display());
        Ok(())
    }
}

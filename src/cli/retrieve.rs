//! Retrieve command implementation

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use crate::config::{ApiConfig, RetrievalConfig};
use crate::fetcher::http::HttpPeriodFetcher;
use crate::retriever::DataRetriever;
use crate::{Record, RetrievalRequest, ServiceFormat, MAX_PERIOD, MIN_PERIOD};

use super::CliError;

/// Retrieve a report across a period range
#[derive(Parser, Debug)]
pub struct RetrieveCommand {
    /// Report to retrieve (e.g. B1770)
    pub report: String,

    /// Settlement date (YYYY-MM-DD)
    pub date: String,

    /// First settlement period of the range
    #[arg(long, default_value_t = MIN_PERIOD)]
    pub start: u32,

    /// Last settlement period of the range
    #[arg(long, default_value_t = MAX_PERIOD)]
    pub end: u32,

    /// Response format requested from the API
    #[arg(long, default_value = "xml")]
    pub format: String,

    /// Write records as CSV to this path instead of JSON lines on stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl RetrieveCommand {
    /// Execute the retrieve command
    pub async fn execute(&self) -> Result<(), CliError> {
        let api = ApiConfig::from_env()?;
        let retrieval = RetrievalConfig::from_env()?;

        let format: ServiceFormat = self.format.parse()?;
        let request = RetrievalRequest::new(
            self.report.clone(),
            self.date.clone(),
            self.start,
            self.end,
            format,
        )?;

        let max_concurrent = retrieval.max_concurrent_tasks;
        let fetcher = HttpPeriodFetcher::new(api, retrieval);
        let retriever = DataRetriever::new(fetcher, max_concurrent);

        let records = retriever.retrieve_all(&request).await;

        match &self.output {
            Some(path) => {
                write_csv(path, &records)?;
                println!("wrote {} records to {}", records.len(), path.display());
            }
            None => {
                let stdout = std::io::stdout();
                write_json_lines(stdout.lock(), &records)?;
            }
        }

        info!(records = records.len(), "retrieve command finished");
        Ok(())
    }
}

/// Write records as CSV with a header row spanning the union of all fields;
/// fields absent from a record are left empty
fn write_csv(path: &Path, records: &[Record]) -> Result<(), CliError> {
    let mut columns: BTreeSet<&str> = BTreeSet::new();
    for record in records {
        columns.extend(record.keys().map(String::as_str));
    }

    let mut writer = csv::Writer::from_path(path)?;
    if columns.is_empty() {
        writer.flush()?;
        return Ok(());
    }

    writer.write_record(&columns)?;
    for record in records {
        writer.write_record(
            columns
                .iter()
                .map(|column| record.get(*column).map(String::as_str).unwrap_or("")),
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Write records as JSON lines, one record per line
fn write_json_lines<W: Write>(mut out: W, records: &[Record]) -> Result<(), CliError> {
    for record in records {
        let line = serde_json::to_string(record)
            .map_err(|e| CliError::RetrievalFailed(format!("failed to encode record: {e}")))?;
        writeln!(out, "{line}")?;
    }
    Ok(())
}

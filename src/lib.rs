//! # BMRS Data Downloader Library
//!
//! A library for retrieving per-settlement-period market reports from the
//! BMRS reporting API and assembling them into one flat record set for
//! downstream analysis.
//!
//! ## Features
//!
//! - **Concurrent Retrieval**: One fetch task per settlement period, bounded
//!   by a configurable concurrency ceiling
//! - **Retry Handling**: Fixed-delay retries for transient failures with a
//!   distinct backoff for rate-limit responses
//! - **Shape-Tolerant Parsing**: Handles the API's single-item vs
//!   list-of-items response ambiguity via a sum type
//! - **Time-Series Conversion**: Turns retrieved records into a 30-minute
//!   indexed series with gap filling
//! - **Imbalance Analysis**: Daily cost and volume statistics for the
//!   standard report pair
//!
//! ## Quick Start
//!
//! ```no_run
//! use bmrs_data_downloader::config::{ApiConfig, RetrievalConfig};
//! use bmrs_data_downloader::fetcher::http::HttpPeriodFetcher;
//! use bmrs_data_downloader::retriever::DataRetriever;
//! use bmrs_data_downloader::{RetrievalRequest, ServiceFormat};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = ApiConfig::from_env()?;
//! let retrieval = RetrievalConfig::from_env()?;
//!
//! let request = RetrievalRequest::new(
//!     "B1770".to_string(),
//!     "2023-10-01".to_string(),
//!     1,
//!     50,
//!     ServiceFormat::Xml,
//! )?;
//!
//! let max_concurrent = retrieval.max_concurrent_tasks;
//! let fetcher = HttpPeriodFetcher::new(api, retrieval);
//! let retriever = DataRetriever::new(fetcher, max_concurrent);
//! let records = retriever.retrieve_all(&request).await;
//! println!("retrieved {} records", records.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - Environment-backed API and engine configuration
//! - [`fetcher`] - URL construction, response parsing, single-period HTTP fetch
//! - [`retriever`] - Bounded concurrent orchestration and aggregation
//! - [`series`] - Record-to-time-series conversion with gap filling
//! - [`analysis`] - Imbalance statistics over converted series
//! - [`cli`] - CLI command implementations

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Imbalance statistics over converted report series
pub mod analysis;

/// CLI command implementations
pub mod cli;

/// Environment-backed configuration
pub mod config;

/// URL construction, response parsing, and single-period fetching
pub mod fetcher;

/// Bounded concurrent retrieval orchestration
pub mod retriever;

/// Record-to-time-series conversion
pub mod series;

pub use fetcher::PeriodRequest;

/// One report entry for one settlement period: field name to scalar text.
pub type Record = BTreeMap<String, String>;

/// Lowest valid settlement period number.
pub const MIN_PERIOD: u32 = 1;

/// Highest valid settlement period number (allows for variable-length days).
pub const MAX_PERIOD: u32 = 50;

/// Check a report name matches the expected shape: the letter `B` followed
/// by one or more digits.
///
/// Report names stay plain strings throughout the engine; they are validated
/// here, per period, when the request URL is built. An invalid name makes
/// every period of a campaign yield nothing - the campaign itself still
/// completes with an empty (non-error) result.
///
/// # Examples
///
/// ```
/// use bmrs_data_downloader::is_valid_report_name;
///
/// assert!(is_valid_report_name("B1770"));
/// assert!(!is_valid_report_name("INVALID_REPORT"));
/// ```
pub fn is_valid_report_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next() == Some('B') && s.len() > 1 && chars.all(|c| c.is_ascii_digit())
}

/// Response format requested from the reporting API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceFormat {
    /// Comma-separated values (single-shot retrieval mode)
    Csv,
    /// XML envelope (concurrent retrieval mode)
    Xml,
}

impl fmt::Display for ServiceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ServiceFormat::Csv => "csv",
            ServiceFormat::Xml => "xml",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ServiceFormat {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ServiceFormat::Csv),
            "xml" => Ok(ServiceFormat::Xml),
            _ => Err(RequestError::InvalidServiceFormat(s.to_string())),
        }
    }
}

/// Parsed payload of one period's response.
///
/// The API's innermost `item` field is either a single mapping or a sequence
/// of mappings; this sum type carries that distinction to the aggregation
/// step rather than relying on runtime type inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodData {
    /// Exactly one record for the period
    One(Record),
    /// Multiple records for the period, in source order
    Many(Vec<Record>),
}

impl PeriodData {
    /// Flatten into a vector of records, preserving source order
    pub fn into_records(self) -> Vec<Record> {
        match self {
            PeriodData::One(record) => vec![record],
            PeriodData::Many(records) => records,
        }
    }
}

/// One retrieval campaign: a report, a settlement date, an inclusive period
/// range, and the response format.
///
/// Invariant: `start <= end` and both lie within [`MIN_PERIOD`]..=[`MAX_PERIOD`].
/// Enforced at construction, before any network activity. Report name and
/// date are validated later, per period, by the URL builder.
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    report_name: String,
    settlement_date: String,
    period_start: u32,
    period_end: u32,
    service_format: ServiceFormat,
}

impl RetrievalRequest {
    /// Create a retrieval request with a validated period range
    pub fn new(
        report_name: String,
        settlement_date: String,
        period_start: u32,
        period_end: u32,
        service_format: ServiceFormat,
    ) -> Result<Self, RequestError> {
        if period_start < MIN_PERIOD || period_end > MAX_PERIOD || period_start > period_end {
            return Err(RequestError::InvalidPeriodRange {
                start: period_start,
                end: period_end,
            });
        }

        Ok(Self {
            report_name,
            settlement_date,
            period_start,
            period_end,
            service_format,
        })
    }

    /// Report being retrieved
    pub fn report_name(&self) -> &str {
        &self.report_name
    }

    /// Settlement date in `YYYY-MM-DD` form
    pub fn settlement_date(&self) -> &str {
        &self.settlement_date
    }

    /// Inclusive period range of the campaign
    pub fn period_range(&self) -> (u32, u32) {
        (self.period_start, self.period_end)
    }

    /// Expand into one immutable per-period request per period in range
    pub fn period_requests(&self) -> Vec<PeriodRequest> {
        (self.period_start..=self.period_end)
            .map(|period| PeriodRequest {
                report_name: self.report_name.clone(),
                settlement_date: self.settlement_date.clone(),
                period,
                service_format: self.service_format,
            })
            .collect()
    }
}

/// Errors constructing requests and request components
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Service format is neither csv nor xml
    #[error("invalid service format '{0}': allowed values are 'csv' and 'xml'")]
    InvalidServiceFormat(String),

    /// Period range violates 1 <= start <= end <= 50
    #[error("invalid period range {start}..{end}: periods must satisfy 1 <= start <= end <= 50")]
    InvalidPeriodRange {
        /// First requested period
        start: u32,
        /// Last requested period
        end: u32,
    },
}

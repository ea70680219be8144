//! Environment-backed configuration
//!
//! All campaign parameters are captured once at process start into explicit
//! configuration objects and passed by reference into the retrieval engine.
//! Missing required configuration refuses to start a campaign rather than
//! running with undefined defaults.

use std::env;
use std::time::Duration;

/// Fixed delay between attempts after a timeout or connection failure.
/// Long enough to let a flaky connection settle, short enough that a full
/// retry budget for one period stays under a few seconds. Distinct from the
/// rate-limit sleep, which is configured per campaign.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// HTTP connect timeout (seconds) - time to establish a TCP connection.
/// The per-request timeout comes from [`RetrievalConfig::timeout`].
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Upstream API parameters required to build any request URL
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base API URL, including trailing slash (e.g. `https://api.bmreports.com/BMRS/`)
    pub host: String,
    /// API version path segment (e.g. `v1`)
    pub version: String,
    /// URL suffix template with `{SettlementDate}`, `{Period}` and
    /// `{ServiceType}` placeholders
    pub url_end_str: String,
    /// API scripting key passed as the `APIKey` query parameter
    pub api_scripting_key: String,
}

impl ApiConfig {
    /// Load API parameters from `HOST`, `VERSION`, `URL_END_STR` and
    /// `API_SCRIPTING_KEY` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: required_var("HOST")?,
            version: required_var("VERSION")?,
            url_end_str: required_var("URL_END_STR")?,
            api_scripting_key: required_var("API_SCRIPTING_KEY")?,
        })
    }
}

/// Per-campaign retrieval engine parameters
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Overall timeout for one HTTP request
    pub timeout: Duration,
    /// Attempt budget per period, counting the first attempt
    pub max_tries: u32,
    /// Concurrency ceiling for in-flight period fetches
    pub max_concurrent_tasks: usize,
    /// Sleep applied after an HTTP 429 before the next attempt
    pub rate_limit_sleep: Duration,
}

impl RetrievalConfig {
    /// Load engine parameters from `TIMEOUT`, `MAX_TRIES`,
    /// `MAX_CONCURRENT_TASKS` and `RATE_LIMIT_SLEEP_TIME` environment
    /// variables (durations in whole seconds)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            timeout: Duration::from_secs(required_int("TIMEOUT")?),
            max_tries: required_int("MAX_TRIES")? as u32,
            max_concurrent_tasks: required_int("MAX_CONCURRENT_TASKS")? as usize,
            rate_limit_sleep: Duration::from_secs(required_int("RATE_LIMIT_SLEEP_TIME")?),
        })
    }
}

/// Value-column names for the standard report pair
#[derive(Debug, Clone)]
pub struct ReportColumns {
    /// Numeric column of the B1770 imbalance price report
    pub b1770_column: String,
    /// Numeric column of the B1780 imbalance volume report
    pub b1780_column: String,
}

impl ReportColumns {
    /// Load column names from `B1770_COLUMN` and `B1780_COLUMN`
    /// environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            b1770_column: required_var("B1770_COLUMN")?,
            b1780_column: required_var("B1780_COLUMN")?,
        })
    }
}

/// Configuration errors - fatal preconditions surfaced before any network
/// activity
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is missing or empty
    #[error("environment variable {0} is missing or empty")]
    MissingVar(&'static str),

    /// A required environment variable is not a valid positive integer
    #[error("environment variable {name} is not a valid positive integer: {value}")]
    InvalidVar {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
    },
}

fn required_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

fn required_int(name: &'static str) -> Result<u64, ConfigError> {
    let value = required_var(name)?;
    value.parse::<u64>().map_err(|_| ConfigError::InvalidVar { name, value })
}

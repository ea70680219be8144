//! Single-period fetching
//!
//! One [`PeriodRequest`] drives one request URL, one HTTP exchange (with
//! retries), and one parsed outcome. Failures here are absorbed into "no
//! record for this period" - they never abort sibling fetches.

use async_trait::async_trait;

use crate::{PeriodData, ServiceFormat};

pub mod http;
pub mod response;
pub mod url;

/// Request parameters for one settlement period, derived from a
/// [`crate::RetrievalRequest`] and immutable once constructed
#[derive(Debug, Clone)]
pub struct PeriodRequest {
    /// Report being retrieved; validated by the URL builder
    pub report_name: String,
    /// Settlement date in `YYYY-MM-DD` form
    pub settlement_date: String,
    /// Settlement period number
    pub period: u32,
    /// Response format to request
    pub service_format: ServiceFormat,
}

/// Fetches the data for one settlement period.
///
/// `None` means the period yielded no record - whether because the request
/// was invalid, the attempt budget was exhausted, or the response carried no
/// data. The distinction is logged, not propagated: a period's terminal
/// failure must never abort the campaign.
#[async_trait]
pub trait PeriodFetcher: Send + Sync {
    /// Fetch and parse one period's data
    async fn fetch_period(&self, request: &PeriodRequest) -> Option<PeriodData>;
}

//! Bounded concurrent retrieval orchestration
//!
//! One fetch task per requested period, admission-controlled by a counting
//! semaphore, joined with a barrier before the single-threaded merge. A
//! period's terminal failure never cancels its siblings, and an empty
//! aggregate is a valid result - the caller distinguishes "no data" from
//! "error" only by emptiness.

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::fetcher::PeriodFetcher;
use crate::{PeriodData, Record, RequestError, RetrievalRequest, ServiceFormat};
use crate::{MAX_PERIOD, MIN_PERIOD};

/// Orchestrates a retrieval campaign over a period range.
///
/// The concurrency ceiling and the fetcher (with its timeout and retry
/// parameters) are captured at construction; nothing global affects an
/// in-flight campaign. Dropping the future returned by
/// [`retrieve_all`](DataRetriever::retrieve_all) abandons all in-flight
/// fetches.
pub struct DataRetriever<F> {
    fetcher: Arc<F>,
    max_concurrent: usize,
}

impl<F: PeriodFetcher> DataRetriever<F> {
    /// Create a retriever with a fixed concurrency ceiling
    pub fn new(fetcher: F, max_concurrent: usize) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            max_concurrent,
        }
    }

    /// Retrieve every period in the request's range and flatten the
    /// outcomes into one record set.
    ///
    /// At most `max_concurrent` fetches are in flight at once; the rest
    /// wait at the admission gate. All periods are awaited - there is no
    /// partial-result short-circuit. Cross-period ordering of the aggregate
    /// is unspecified; a single period's multi-record response keeps its
    /// source order.
    pub async fn retrieve_all(&self, request: &RetrievalRequest) -> Vec<Record> {
        let (start, end) = request.period_range();
        info!(
            report = %request.report_name(),
            settlement_date = request.settlement_date(),
            start,
            end,
            "starting retrieval campaign"
        );

        // At least one permit, or the gate would never admit anything.
        let gate = Arc::new(Semaphore::new(self.max_concurrent.max(1)));

        let fetches = request.period_requests().into_iter().map(|period_request| {
            let gate = Arc::clone(&gate);
            let fetcher = Arc::clone(&self.fetcher);
            async move {
                let _permit = match gate.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        // The gate is never closed while fetches run.
                        warn!(period = period_request.period, "admission gate closed");
                        return None;
                    }
                };
                fetcher.fetch_period(&period_request).await
            }
        });

        let outcomes = join_all(fetches).await;

        let mut records = Vec::new();
        for data in outcomes.into_iter().flatten() {
            match data {
                PeriodData::One(record) => records.push(record),
                PeriodData::Many(mut many) => records.append(&mut many),
            }
        }

        info!(
            report = %request.report_name(),
            settlement_date = request.settlement_date(),
            records = records.len(),
            "retrieval campaign finished"
        );
        records
    }

    /// Retrieve a full day of a report: every period in
    /// [`MIN_PERIOD`]..=[`MAX_PERIOD`], XML format
    pub async fn retrieve_report(
        &self,
        report_name: String,
        settlement_date: String,
    ) -> Result<Vec<Record>, RequestError> {
        let request = RetrievalRequest::new(
            report_name,
            settlement_date,
            MIN_PERIOD,
            MAX_PERIOD,
            ServiceFormat::Xml,
        )?;
        Ok(self.retrieve_all(&request).await)
    }
}

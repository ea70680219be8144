//! HTTP single-period fetcher
//!
//! Executes one GET per attempt with the campaign timeout, interprets status
//! codes, and applies the two fixed backoff delays: the configured
//! rate-limit sleep after HTTP 429, and the short generic retry delay after
//! a timeout or connection failure. This is a bounded retry loop, not an
//! exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::config::{ApiConfig, RetrievalConfig, HTTP_CONNECT_TIMEOUT_SECS, RETRY_DELAY};
use crate::fetcher::{response, url::build_url, PeriodFetcher, PeriodRequest};
use crate::PeriodData;

/// Global HTTP client shared by all fetcher instances.
///
/// reqwest's Client is cheap to clone (Arc internally); a single instance
/// keeps connection pooling effective across concurrent period fetches. The
/// per-request timeout is a campaign parameter and is applied per request,
/// so the shared client carries only the connect timeout.
static SHARED_HTTP_CLIENT: Lazy<Arc<Client>> = Lazy::new(|| {
    Arc::new(
        Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|e| {
                panic!("FATAL: Failed to build HTTP client: {e}. Check system TLS configuration.");
            }),
    )
});

/// Get the shared HTTP client
pub fn shared_http_client() -> Arc<Client> {
    SHARED_HTTP_CLIENT.clone()
}

/// [`PeriodFetcher`] implementation backed by the shared HTTP client
pub struct HttpPeriodFetcher {
    client: Arc<Client>,
    api: ApiConfig,
    retrieval: RetrievalConfig,
}

impl HttpPeriodFetcher {
    /// Create a fetcher capturing the campaign configuration once; no
    /// configuration is consulted mid-flight
    pub fn new(api: ApiConfig, retrieval: RetrievalConfig) -> Self {
        Self {
            client: shared_http_client(),
            api,
            retrieval,
        }
    }

    fn build_request_url(&self, request: &PeriodRequest) -> Option<String> {
        match build_url(
            &request.period.to_string(),
            request.report_name.as_str(),
            &request.settlement_date,
            &request.service_format.to_string(),
            &self.api,
        ) {
            Ok(url) => Some(url),
            Err(err) => {
                // Skips the period without consuming an attempt.
                error!(
                    report = %request.report_name,
                    period = request.period,
                    error = %err,
                    "skipping period: request validation failed"
                );
                None
            }
        }
    }

    /// Fetch one period's raw response body without envelope parsing.
    ///
    /// Single-shot retrieval mode: the body (CSV or XML) is returned as-is
    /// for the caller to save. Retry rules match [`fetch_period`]:
    /// rate-limit sleep on 429, short fixed delay on timeout or connection
    /// failure, other non-2xx logged and retried.
    ///
    /// [`fetch_period`]: PeriodFetcher::fetch_period
    pub async fn fetch_period_raw(&self, request: &PeriodRequest) -> Option<Vec<u8>> {
        let url = self.build_request_url(request)?;

        for attempt in 1..=self.retrieval.max_tries {
            match self.client.get(&url).timeout(self.retrieval.timeout).send().await {
                Ok(resp) if resp.status() == StatusCode::OK => match resp.bytes().await {
                    Ok(bytes) => return Some(bytes.to_vec()),
                    Err(err) => {
                        warn!(attempt, error = %err, "failed to read response body");
                    }
                },
                Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => {
                    warn!(attempt, "rate limited by upstream API");
                    if attempt < self.retrieval.max_tries {
                        sleep(self.retrieval.rate_limit_sleep).await;
                    }
                    continue;
                }
                Ok(resp) => {
                    warn!(attempt, status = %resp.status(), "unexpected HTTP status");
                    continue;
                }
                Err(err) if err.is_timeout() => {
                    warn!(attempt, "attempt failed due to timeout");
                }
                Err(err) if err.is_connect() => {
                    warn!(attempt, "attempt failed due to connection error");
                }
                Err(err) => {
                    warn!(attempt, error = %err, "attempt failed due to network error");
                }
            }

            if attempt < self.retrieval.max_tries {
                sleep(RETRY_DELAY).await;
            }
        }

        error!(
            report = %request.report_name,
            period = request.period,
            "failed to retrieve data after {} attempts",
            self.retrieval.max_tries
        );
        None
    }
}

#[async_trait]
impl PeriodFetcher for HttpPeriodFetcher {
    async fn fetch_period(&self, request: &PeriodRequest) -> Option<PeriodData> {
        let url = self.build_request_url(request)?;

        for attempt in 1..=self.retrieval.max_tries {
            match self.client.get(&url).timeout(self.retrieval.timeout).send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status == StatusCode::OK {
                        match resp.text().await {
                            Ok(body) => match response::parse(&body) {
                                Ok(data) => {
                                    debug!(
                                        report = %request.report_name,
                                        period = request.period,
                                        attempt,
                                        "period fetch succeeded"
                                    );
                                    return Some(data);
                                }
                                Err(err) if err.is_retryable() => {
                                    warn!(
                                        period = request.period,
                                        attempt,
                                        error = %err,
                                        "discarding malformed response body"
                                    );
                                }
                                Err(_) => {
                                    // Well-formed body with no envelope data:
                                    // the period is empty, not failing.
                                    debug!(
                                        report = %request.report_name,
                                        period = request.period,
                                        "response carried no data for this period"
                                    );
                                    return None;
                                }
                            },
                            Err(err) => {
                                warn!(period = request.period, attempt, error = %err, "failed to read response body");
                            }
                        }
                    } else if status == StatusCode::TOO_MANY_REQUESTS {
                        warn!(period = request.period, attempt, "rate limited by upstream API");
                        if attempt < self.retrieval.max_tries {
                            sleep(self.retrieval.rate_limit_sleep).await;
                        }
                        continue;
                    } else {
                        warn!(period = request.period, attempt, status = %status, "unexpected HTTP status");
                        continue;
                    }
                }
                Err(err) if err.is_timeout() => {
                    warn!(period = request.period, attempt, "attempt failed due to timeout");
                }
                Err(err) if err.is_connect() => {
                    warn!(period = request.period, attempt, "attempt failed due to connection error");
                }
                Err(err) => {
                    warn!(period = request.period, attempt, error = %err, "attempt failed due to network error");
                }
            }

            if attempt < self.retrieval.max_tries {
                sleep(RETRY_DELAY).await;
            }
        }

        error!(
            report = %request.report_name,
            period = request.period,
            "failed to retrieve data after {} attempts",
            self.retrieval.max_tries
        );
        None
    }
}

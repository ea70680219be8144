//! Orchestrator tests against an instrumented fetcher
//!
//! The stub fetcher counts how many fetches are in flight at once, so the
//! admission gate's ceiling is observable without any network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bmrs_data_downloader::fetcher::{PeriodFetcher, PeriodRequest};
use bmrs_data_downloader::retriever::DataRetriever;
use bmrs_data_downloader::{PeriodData, Record, RetrievalRequest, ServiceFormat};

fn request(start: u32, end: u32) -> RetrievalRequest {
    RetrievalRequest::new(
        "B1770".to_string(),
        "2023-10-01".to_string(),
        start,
        end,
        ServiceFormat::Xml,
    )
    .unwrap()
}

fn record_for(period: u32) -> Record {
    let mut record = Record::new();
    record.insert("settlementDate".to_string(), "2023-10-01".to_string());
    record.insert("settlementPeriod".to_string(), period.to_string());
    record
}

/// Stub fetcher that records the peak number of concurrent calls through
/// shared counters
struct InstrumentedFetcher {
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    delay: Duration,
}

#[async_trait]
impl PeriodFetcher for InstrumentedFetcher {
    async fn fetch_period(&self, request: &PeriodRequest) -> Option<PeriodData> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Some(PeriodData::One(record_for(request.period)))
    }
}

/// Stub fetcher with a fixed outcome per period
struct ShapedFetcher;

#[async_trait]
impl PeriodFetcher for ShapedFetcher {
    async fn fetch_period(&self, request: &PeriodRequest) -> Option<PeriodData> {
        match request.period {
            5 => None,
            p if p % 2 == 0 => {
                let mut first = record_for(p);
                first.insert("order".to_string(), "first".to_string());
                let mut second = record_for(p);
                second.insert("order".to_string(), "second".to_string());
                Some(PeriodData::Many(vec![first, second]))
            }
            p => Some(PeriodData::One(record_for(p))),
        }
    }
}

#[tokio::test]
async fn test_in_flight_fetches_never_exceed_ceiling() {
    let peak = Arc::new(AtomicUsize::new(0));
    let fetcher = InstrumentedFetcher {
        in_flight: Arc::new(AtomicUsize::new(0)),
        peak: Arc::clone(&peak),
        delay: Duration::from_millis(20),
    };
    let retriever = DataRetriever::new(fetcher, 3);

    let records = retriever.retrieve_all(&request(1, 20)).await;

    assert_eq!(records.len(), 20);
    let peak = peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency {peak} exceeded ceiling 3");
    // The gate should actually be exercised, not trivially idle.
    assert!(peak >= 2, "peak concurrency {peak} suspiciously low");
}

#[tokio::test]
async fn test_full_range_yields_one_record_per_period() {
    let fetcher = InstrumentedFetcher {
        in_flight: Arc::new(AtomicUsize::new(0)),
        peak: Arc::new(AtomicUsize::new(0)),
        delay: Duration::from_millis(1),
    };
    let retriever = DataRetriever::new(fetcher, 10);

    let records = retriever.retrieve_all(&request(1, 50)).await;

    assert_eq!(records.len(), 50);
    let mut periods: Vec<u32> = records
        .iter()
        .map(|r| r["settlementPeriod"].parse().unwrap())
        .collect();
    periods.sort_unstable();
    assert_eq!(periods, (1..=50).collect::<Vec<u32>>());
}

#[tokio::test]
async fn test_flatten_splices_sequences_and_skips_absent_periods() {
    let retriever = DataRetriever::new(ShapedFetcher, 4);

    let records = retriever.retrieve_all(&request(1, 10)).await;

    // Periods 2, 4, 6, 8, 10 contribute two records each, period 5 none,
    // periods 1, 3, 7, 9 one each.
    assert_eq!(records.len(), 5 * 2 + 4);
    assert!(!records.iter().any(|r| r["settlementPeriod"] == "5"));

    // Within one period's multi-record response, source order survives.
    let even: Vec<&str> = records
        .iter()
        .filter(|r| r["settlementPeriod"] == "4")
        .map(|r| r["order"].as_str())
        .collect();
    assert_eq!(even, vec!["first", "second"]);
}

#[tokio::test]
async fn test_all_periods_failing_is_an_empty_result() {
    struct NothingFetcher;

    #[async_trait]
    impl PeriodFetcher for NothingFetcher {
        async fn fetch_period(&self, _request: &PeriodRequest) -> Option<PeriodData> {
            None
        }
    }

    let retriever = DataRetriever::new(NothingFetcher, 4);
    let records = retriever.retrieve_all(&request(1, 50)).await;
    assert!(records.is_empty());
}

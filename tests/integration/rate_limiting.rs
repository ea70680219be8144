//! Rate-limit backoff tests against a mock HTTP server

use std::time::{Duration, Instant};

use bmrs_data_downloader::config::{ApiConfig, RetrievalConfig};
use bmrs_data_downloader::fetcher::http::HttpPeriodFetcher;
use bmrs_data_downloader::fetcher::{PeriodFetcher, PeriodRequest};
use bmrs_data_downloader::{PeriodData, ServiceFormat};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ITEM_BODY: &str = "<response><responseBody><responseList>\
    <item><settlementDate>2023-10-01</settlementDate>\
    <settlementPeriod>1</settlementPeriod>\
    <imbalancePriceAmountGBP>45.21</imbalancePriceAmountGBP></item>\
    </responseList></responseBody></response>";

fn api_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        host: format!("{}/BMRS/", server.uri()),
        version: "v1".to_string(),
        url_end_str: "SettlementDate={SettlementDate}&Period={Period}&ServiceType={ServiceType}"
            .to_string(),
        api_scripting_key: "test-key".to_string(),
    }
}

fn period_request() -> PeriodRequest {
    PeriodRequest {
        report_name: "B1770".to_string(),
        settlement_date: "2023-10-01".to_string(),
        period: 1,
        service_format: ServiceFormat::Xml,
    }
}

#[tokio::test]
async fn test_rate_limited_attempt_sleeps_then_succeeds() {
    let server = MockServer::start().await;
    let rate_limit_sleep = Duration::from_millis(600);

    Mock::given(method("GET"))
        .and(path("/BMRS/B1770/v1"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/BMRS/B1770/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ITEM_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpPeriodFetcher::new(
        api_config(&server),
        RetrievalConfig {
            timeout: Duration::from_secs(5),
            max_tries: 3,
            max_concurrent_tasks: 1,
            rate_limit_sleep,
        },
    );

    let started = Instant::now();
    let data = fetcher.fetch_period(&period_request()).await;
    let elapsed = started.elapsed();

    assert!(matches!(data, Some(PeriodData::One(_))));
    assert!(
        elapsed >= rate_limit_sleep,
        "expected the configured rate-limit sleep before the retry, elapsed {elapsed:?}"
    );
}

#[tokio::test]
async fn test_persistent_rate_limiting_exhausts_the_attempt_budget() {
    let server = MockServer::start().await;
    let max_tries = 3;

    Mock::given(method("GET"))
        .and(path("/BMRS/B1770/v1"))
        .respond_with(ResponseTemplate::new(429))
        .expect(u64::from(max_tries))
        .mount(&server)
        .await;

    let fetcher = HttpPeriodFetcher::new(
        api_config(&server),
        RetrievalConfig {
            timeout: Duration::from_secs(5),
            max_tries,
            max_concurrent_tasks: 1,
            rate_limit_sleep: Duration::from_millis(50),
        },
    );

    let data = fetcher.fetch_period(&period_request()).await;
    assert!(data.is_none());
}

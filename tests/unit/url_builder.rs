//! Unit tests for the request URL builder

use bmrs_data_downloader::config::ApiConfig;
use bmrs_data_downloader::fetcher::url::{build_url, UrlError};

fn api_config() -> ApiConfig {
    ApiConfig {
        host: "https://api.example.com/BMRS/".to_string(),
        version: "v1".to_string(),
        url_end_str: "SettlementDate={SettlementDate}&Period={Period}&ServiceType={ServiceType}"
            .to_string(),
        api_scripting_key: "scripting-key-123".to_string(),
    }
}

/// Count non-overlapping occurrences of `needle` in `haystack`
fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn test_url_contains_each_component_exactly_once() {
    let api = api_config();

    for (period, report, date, format) in [
        ("1", "B1770", "2023-10-01", "xml"),
        ("50", "B1780", "2024-02-29", "csv"),
        ("25", "B1610", "2023-01-31", "xml"),
    ] {
        let url = build_url(period, report, date, format, &api).unwrap();

        assert_eq!(count(&url, report), 1, "report in {url}");
        assert_eq!(count(&url, &api.version), 1, "version in {url}");
        assert_eq!(count(&url, &api.api_scripting_key), 1, "api key in {url}");
        assert_eq!(count(&url, date), 1, "date in {url}");
        assert_eq!(count(&url, &format!("Period={period}&")), 1, "period in {url}");
        assert_eq!(count(&url, &format!("ServiceType={format}")), 1, "format in {url}");
    }
}

#[test]
fn test_invalid_periods_yield_no_url() {
    let api = api_config();

    for period in ["0", "-1", "51", "999", "abc", "", "1.5"] {
        assert_eq!(
            build_url(period, "B1770", "2023-10-01", "xml", &api),
            Err(UrlError::InvalidPeriod(period.to_string())),
            "period {period:?} should be rejected"
        );
    }
}

#[test]
fn test_invalid_report_names_yield_no_url() {
    let api = api_config();

    for report in ["", "B", "1770", "b1770", "INVALID_REPORT", "B17X0"] {
        assert_eq!(
            build_url("1", report, "2023-10-01", "xml", &api),
            Err(UrlError::InvalidReportName(report.to_string())),
            "report {report:?} should be rejected"
        );
    }
}

#[test]
fn test_invalid_dates_yield_no_url() {
    let api = api_config();

    for date in ["", "2023-10-1", "01-10-2023", "2023/10/01", "20231001", "2023-1O-01"] {
        assert_eq!(
            build_url("1", "B1770", date, "xml", &api),
            Err(UrlError::InvalidSettlementDate(date.to_string())),
            "date {date:?} should be rejected"
        );
    }
}

#[test]
fn test_invalid_service_type_yields_no_url() {
    let api = api_config();
    assert_eq!(
        build_url("1", "B1770", "2023-10-01", "json", &api),
        Err(UrlError::InvalidServiceType("json".to_string()))
    );
}

#[test]
fn test_missing_api_parameters_yield_no_url() {
    for strip in 0..4 {
        let mut api = api_config();
        match strip {
            0 => api.host = String::new(),
            1 => api.version = String::new(),
            2 => api.url_end_str = String::new(),
            _ => api.api_scripting_key = String::new(),
        }
        assert_eq!(
            build_url("1", "B1770", "2023-10-01", "xml", &api),
            Err(UrlError::IncompleteApiConfig)
        );
    }
}

#[test]
fn test_validation_short_circuits_in_order() {
    // With several fields invalid at once, the period check reports first.
    let api = api_config();
    assert_eq!(
        build_url("bad", "also-bad", "nope", "nope", &api),
        Err(UrlError::InvalidPeriod("bad".to_string()))
    );
    assert_eq!(
        build_url("1", "also-bad", "nope", "nope", &api),
        Err(UrlError::InvalidReportName("also-bad".to_string()))
    );
}

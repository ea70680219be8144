//! Request URL construction
//!
//! Pure validation plus string assembly - no hidden state, no network
//! access. A failed validation aborts that one period's request only; the
//! caller skips the period and the campaign continues.

use tracing::error;

use crate::config::ApiConfig;
use crate::{is_valid_report_name, MAX_PERIOD, MIN_PERIOD};

/// URL construction errors, one per validation step
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlError {
    /// Period is not an integer in [1, 50]
    #[error("invalid period '{0}': expected a number in the range 1-50")]
    InvalidPeriod(String),

    /// Report name does not match `B<digits>`
    #[error("invalid report name '{0}': expected 'B' followed by digits")]
    InvalidReportName(String),

    /// Settlement date does not match `YYYY-MM-DD`
    #[error("invalid settlement date '{0}': expected format YYYY-MM-DD")]
    InvalidSettlementDate(String),

    /// Service type is neither csv nor xml
    #[error("invalid service type '{0}': allowed values are 'csv' and 'xml'")]
    InvalidServiceType(String),

    /// One of host, version, URL suffix template, or API key is empty
    #[error("API configuration incomplete: host, version, url_end_str and api_scripting_key are all required")]
    IncompleteApiConfig,
}

/// Build one fully-qualified request URL.
///
/// Validations run in order and short-circuit on the first failure:
/// period, report name, settlement date, service type, API configuration.
/// Output shape:
/// `{host}{report}/{version}?APIKey={key}&{url_end_str}` with the
/// `{SettlementDate}`, `{Period}` and `{ServiceType}` placeholders of the
/// suffix template substituted.
pub fn build_url(
    period: &str,
    report_name: &str,
    settlement_date: &str,
    service_type: &str,
    api: &ApiConfig,
) -> Result<String, UrlError> {
    match period.parse::<u32>() {
        Ok(p) if (MIN_PERIOD..=MAX_PERIOD).contains(&p) => {}
        _ => {
            error!(period, "invalid 'period': expected a number in the range 1-50");
            return Err(UrlError::InvalidPeriod(period.to_string()));
        }
    }

    if !is_valid_report_name(report_name) {
        error!(
            report_name,
            "invalid 'report_name': expected a non-empty string starting with 'B' followed by numbers"
        );
        return Err(UrlError::InvalidReportName(report_name.to_string()));
    }

    if !is_iso_date(settlement_date) {
        error!(settlement_date, "invalid 'settlement_date': expected format YYYY-MM-DD");
        return Err(UrlError::InvalidSettlementDate(settlement_date.to_string()));
    }

    if service_type != "csv" && service_type != "xml" {
        error!(service_type, "invalid 'service_type': allowed values are 'csv' and 'xml'");
        return Err(UrlError::InvalidServiceType(service_type.to_string()));
    }

    if api.host.is_empty()
        || api.version.is_empty()
        || api.url_end_str.is_empty()
        || api.api_scripting_key.is_empty()
    {
        error!("API configuration incomplete: some essential parameters are missing or empty");
        return Err(UrlError::IncompleteApiConfig);
    }

    let suffix = api
        .url_end_str
        .replace("{SettlementDate}", settlement_date)
        .replace("{Period}", period)
        .replace("{ServiceType}", service_type);

    Ok(format!(
        "{}{}/{}?APIKey={}&{}",
        api.host, report_name, api.version, api.api_scripting_key, suffix
    ))
}

fn is_iso_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && [0, 1, 2, 3, 5, 6, 8, 9]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit())
}

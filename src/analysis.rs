//! Imbalance statistics over converted report series
//!
//! Daily summary figures for the standard report pair: total imbalance cost
//! for B1770, and imbalance unit rate plus the peak absolute hourly volume
//! for B1780.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use tracing::info;

use crate::config::ReportColumns;
use crate::series::ReportSeries;

/// Report of daily imbalance costs
pub const IMBALANCE_COST_REPORT: &str = "B1770";

/// Report of daily imbalance volumes
pub const IMBALANCE_VOLUME_REPORT: &str = "B1780";

/// Daily summary statistics for one report
#[derive(Debug, Clone, PartialEq)]
pub enum ReportSummary {
    /// B1770: sum of the imbalance price column over the day
    DailyImbalanceCost {
        /// Settlement date summarised
        date: NaiveDate,
        /// Total daily imbalance cost in GBP
        total_cost: Decimal,
    },
    /// B1780: average imbalance per entry and the hour with the highest
    /// total absolute imbalance volume
    DailyImbalanceVolume {
        /// Settlement date summarised
        date: NaiveDate,
        /// Sum of imbalances divided by the number of entries
        unit_rate: Decimal,
        /// Start of the hour with the highest summed absolute volume
        peak_hour: NaiveDateTime,
        /// Summed absolute volume of that hour
        peak_volume: Decimal,
    },
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportSummary::DailyImbalanceCost { date, total_cost } => {
                write!(
                    f,
                    "{} total daily imbalance cost £{:.2}",
                    date.format("%d-%m-%Y"),
                    total_cost
                )
            }
            ReportSummary::DailyImbalanceVolume {
                date,
                unit_rate,
                peak_hour,
                peak_volume,
            } => {
                write!(
                    f,
                    "{} daily imbalance unit rate {:.2} MWh; highest absolute hourly imbalance volume {:.2} MWh at {}",
                    date.format("%d-%m-%Y"),
                    unit_rate,
                    peak_volume,
                    peak_hour.format("%d-%m-%Y %H:%M")
                )
            }
        }
    }
}

/// Analysis errors
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// No summary is defined for this report
    #[error("no analysis defined for report '{0}'")]
    UnsupportedReport(String),
}

/// Summarise a day's series for one of the standard reports.
///
/// The series is guaranteed non-empty by construction, so the entry count
/// used for the unit rate is always positive.
pub fn summarise(report: &str, series: &ReportSeries) -> Result<ReportSummary, AnalysisError> {
    let date = series.start().date();
    let total: Decimal = series.points().iter().map(|p| p.value).sum();

    let summary = match report {
        IMBALANCE_COST_REPORT => ReportSummary::DailyImbalanceCost {
            date,
            total_cost: total,
        },
        IMBALANCE_VOLUME_REPORT => {
            let entries = Decimal::from(series.points().len());
            let (peak_hour, peak_volume) = peak_absolute_hour(series);
            ReportSummary::DailyImbalanceVolume {
                date,
                unit_rate: total / entries,
                peak_hour,
                peak_volume,
            }
        }
        other => return Err(AnalysisError::UnsupportedReport(other.to_string())),
    };

    info!(report, "{summary}");
    Ok(summary)
}

/// Numeric value column configured for one of the standard reports
pub fn value_column<'a>(columns: &'a ReportColumns, report: &str) -> Option<&'a str> {
    match report {
        IMBALANCE_COST_REPORT => Some(&columns.b1770_column),
        IMBALANCE_VOLUME_REPORT => Some(&columns.b1780_column),
        _ => None,
    }
}

/// Hour with the highest total absolute volume; ties go to the earliest hour
fn peak_absolute_hour(series: &ReportSeries) -> (NaiveDateTime, Decimal) {
    let mut hourly: BTreeMap<NaiveDateTime, Decimal> = BTreeMap::new();
    for point in series.points() {
        let hour = point.timestamp - Duration::minutes(i64::from(point.timestamp.minute()));
        *hourly.entry(hour).or_insert(Decimal::ZERO) += point.value.abs();
    }

    let mut peak = (series.start(), Decimal::ZERO);
    for (hour, volume) in hourly {
        if volume > peak.1 {
            peak = (hour, volume);
        }
    }
    peak
}

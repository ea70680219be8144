//! Record-to-time-series conversion
//!
//! Turns a flat, unordered record set from a retrieval campaign into a
//! sorted 30-minute time series for one numeric column. Each record's
//! timestamp is its settlement date plus `(period - 1) * 30` minutes.
//! Interior gaps on the 30-minute grid are filled backward then forward, so
//! the output always covers the full span between the first and last
//! observation.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use tracing::info;

use crate::{Record, MAX_PERIOD, MIN_PERIOD};

/// Record field holding the settlement date
pub const SETTLEMENT_DATE_FIELD: &str = "settlementDate";

/// Record field holding the 1-based settlement period
pub const SETTLEMENT_PERIOD_FIELD: &str = "settlementPeriod";

/// Minutes covered by one settlement period
const PERIOD_MINUTES: i64 = 30;

/// One observation in a converted series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    /// Settlement date plus the period offset
    pub timestamp: NaiveDateTime,
    /// Value of the selected column
    pub value: Decimal,
}

/// A sorted, gap-filled 30-minute series for one report column
#[derive(Debug, Clone)]
pub struct ReportSeries {
    column: String,
    points: Vec<SeriesPoint>,
}

/// Conversion errors
#[derive(Debug, thiserror::Error)]
pub enum SeriesError {
    /// No records to convert
    #[error("no records to convert")]
    Empty,

    /// A record is missing a required field
    #[error("record is missing required field '{0}'")]
    MissingField(String),

    /// A record's settlement date is not `YYYY-MM-DD`
    #[error("invalid settlement date '{0}' in record")]
    InvalidDate(String),

    /// A record's settlement period is not an integer in [1, 50]
    #[error("invalid settlement period '{0}' in record")]
    InvalidPeriod(String),

    /// A record's value column does not parse as a number
    #[error("non-numeric value '{value}' in column '{column}'")]
    InvalidValue {
        /// Column being converted
        column: String,
        /// Offending value
        value: String,
    },
}

impl ReportSeries {
    /// Convert retrieved records into a time series over `column`.
    ///
    /// Records may arrive in any order; the output is sorted by timestamp.
    /// When the same timestamp occurs more than once, the last record wins.
    pub fn from_records(column: &str, records: &[Record]) -> Result<Self, SeriesError> {
        if records.is_empty() {
            return Err(SeriesError::Empty);
        }

        let mut observed: BTreeMap<NaiveDateTime, Decimal> = BTreeMap::new();
        for record in records {
            let (timestamp, value) = decode_record(column, record)?;
            observed.insert(timestamp, value);
        }

        let points = fill_gaps(&observed);

        info!(column, points = points.len(), "time series generated");
        Ok(Self {
            column: column.to_string(),
            points,
        })
    }

    /// Column the series was built over
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Observations in ascending timestamp order
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    /// Timestamp of the first observation
    pub fn start(&self) -> NaiveDateTime {
        // from_records guarantees at least one point
        self.points[0].timestamp
    }
}

fn decode_record(column: &str, record: &Record) -> Result<(NaiveDateTime, Decimal), SeriesError> {
    let date_str = record
        .get(SETTLEMENT_DATE_FIELD)
        .ok_or_else(|| SeriesError::MissingField(SETTLEMENT_DATE_FIELD.to_string()))?;
    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| SeriesError::InvalidDate(date_str.clone()))?;

    let period_str = record
        .get(SETTLEMENT_PERIOD_FIELD)
        .ok_or_else(|| SeriesError::MissingField(SETTLEMENT_PERIOD_FIELD.to_string()))?;
    let period = period_str
        .parse::<u32>()
        .ok()
        .filter(|p| (MIN_PERIOD..=MAX_PERIOD).contains(p))
        .ok_or_else(|| SeriesError::InvalidPeriod(period_str.clone()))?;

    let value_str = record
        .get(column)
        .ok_or_else(|| SeriesError::MissingField(column.to_string()))?;
    let value = Decimal::from_str(value_str).map_err(|_| SeriesError::InvalidValue {
        column: column.to_string(),
        value: value_str.clone(),
    })?;

    let timestamp = date.and_time(NaiveTime::MIN)
        + Duration::minutes(PERIOD_MINUTES * (i64::from(period) - 1));
    Ok((timestamp, value))
}

/// Walk the full 30-minute grid between the first and last observation,
/// filling missing slots backward (next known value) then forward.
fn fill_gaps(observed: &BTreeMap<NaiveDateTime, Decimal>) -> Vec<SeriesPoint> {
    let mut slots: Vec<(NaiveDateTime, Option<Decimal>)> = Vec::new();
    if let (Some((&first, _)), Some((&last, _))) =
        (observed.iter().next(), observed.iter().next_back())
    {
        let mut cursor = first;
        while cursor <= last {
            slots.push((cursor, observed.get(&cursor).copied()));
            cursor += Duration::minutes(PERIOD_MINUTES);
        }
    }

    let mut next_known = None;
    for (_, value) in slots.iter_mut().rev() {
        match value {
            Some(v) => next_known = Some(*v),
            None => *value = next_known,
        }
    }

    let mut prev_known = None;
    for (_, value) in slots.iter_mut() {
        match value {
            Some(v) => prev_known = Some(*v),
            None => *value = prev_known,
        }
    }

    slots
        .into_iter()
        .filter_map(|(timestamp, value)| value.map(|value| SeriesPoint { timestamp, value }))
        .collect()
}

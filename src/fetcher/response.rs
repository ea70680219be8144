//! Response envelope parsing
//!
//! The reporting API wraps results in a fixed envelope,
//! `response.responseBody.responseList.item`, whose innermost field is
//! either a single mapping or a sequence of mappings. Malformed bodies are
//! kept distinct from structurally-absent data so the fetcher can retry the
//! former and treat the latter as empty.

use serde::Deserialize;

use crate::{PeriodData, Record};

/// Parse errors, split by whether a retry could plausibly help
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Body is not well-formed XML - transient corruption, worth retrying
    #[error("malformed response body: {0}")]
    MalformedBody(String),

    /// Body is well-formed but the envelope keys or items are absent -
    /// there is no data for this period
    #[error("response envelope incomplete or empty")]
    MissingEnvelope,
}

impl ParseError {
    /// Whether the failure should consume a retry attempt rather than be
    /// treated as an empty period
    pub fn is_retryable(&self) -> bool {
        matches!(self, ParseError::MalformedBody(_))
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "responseBody")]
    response_body: Option<ResponseBody>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(rename = "responseList")]
    response_list: Option<ResponseList>,
}

#[derive(Debug, Deserialize)]
struct ResponseList {
    #[serde(default)]
    item: Vec<Record>,
}

/// Extract the period's records from a raw response body.
///
/// A single `item` mapping is returned as-is. When the response carries a
/// sequence of items, only the last element is returned: the latest-ordered
/// item is treated as authoritative for the period. This is a deliberate
/// simplification carried over from the system this replaces, not an
/// inferred best practice.
pub fn parse(body: &str) -> Result<PeriodData, ParseError> {
    let envelope: Envelope =
        quick_xml::de::from_str(body).map_err(|e| ParseError::MalformedBody(e.to_string()))?;

    let mut items = envelope
        .response_body
        .and_then(|b| b.response_list)
        .map(|l| l.item)
        .ok_or(ParseError::MissingEnvelope)?;

    match items.len() {
        0 => Err(ParseError::MissingEnvelope),
        1 => Ok(PeriodData::One(items.remove(0))),
        _ => {
            // Authoritative-last tie-break for multi-item responses.
            let last = items.pop().ok_or(ParseError::MissingEnvelope)?;
            Ok(PeriodData::One(last))
        }
    }
}

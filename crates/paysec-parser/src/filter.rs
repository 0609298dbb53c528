//! Transaction filter grammar
//!
//! A filter is a flat map of `key -> value`. Keys are `timestamp`, `sender`,
//! `receiver`, `verified` and `status`; anything else is rejected before a
//! query is built. Values may come from a query string (all strings) or a
//! JSON body, so booleans are accepted in both spellings.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::patterns;

pub const FILTER_KEYS: [&str; 5] = ["timestamp", "sender", "receiver", "verified", "status"];

/// Timestamp constraint. All bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimestampFilter {
    After(DateTime<Utc>),
    Before(DateTime<Utc>),
    Between {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl TimestampFilter {
    /// Parse `>T`, `<T`, `T1:T2` or `>T1:<T2`
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let input = input.trim();
        let invalid = || ParseError::invalid("timestamp");

        if let Some(rest) = input.strip_prefix('<') {
            return parse_instant(rest).map(TimestampFilter::Before).ok_or_else(invalid);
        }

        let (body, lower_marked) = match input.strip_prefix('>') {
            Some(rest) => {
                if let Some(t) = parse_instant(rest) {
                    return Ok(TimestampFilter::After(t));
                }
                (rest, true)
            }
            None => (input, false),
        };

        let (start, end) = split_interval(body, lower_marked).ok_or_else(invalid)?;
        if start >= end {
            return Err(invalid());
        }
        Ok(TimestampFilter::Between { start, end })
    }

    pub fn matches(&self, t: &DateTime<Utc>) -> bool {
        match self {
            TimestampFilter::After(after) => t > after,
            TimestampFilter::Before(before) => t < before,
            TimestampFilter::Between { start, end } => t > start && t < end,
        }
    }
}

/// RFC 3339 timestamps contain ':', so try every split point and keep the
/// first where both halves are instants.
fn split_interval(body: &str, lower_marked: bool) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    body.match_indices(':').find_map(|(i, _)| {
        let left = &body[..i];
        let right = &body[i + 1..];
        let right = match right.strip_prefix('<') {
            Some(r) => r,
            // `>T1:T2` is not a form; the upper marker must accompany the lower one
            None if lower_marked => return None,
            None => right,
        };
        Some((parse_instant(left)?, parse_instant(right)?))
    })
}

/// RFC 3339 instant or a bare `YYYY-MM-DD` taken as midnight UTC
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Parsed filter. Absent fields place no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub timestamp: Option<TimestampFilter>,
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub verified: Option<bool>,
    /// Lowercased status name, checked against known statuses by the caller
    pub status: Option<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self == &FilterCriteria::default()
    }

    /// Parse a JSON filter object
    pub fn from_json(filter: &Map<String, Value>) -> Result<Self, ParseError> {
        if let Some(key) = filter.keys().find(|k| !FILTER_KEYS.contains(&k.as_str())) {
            return Err(ParseError::UnknownKey { key: key.clone() });
        }

        let mut criteria = FilterCriteria::default();

        if let Some(value) = filter.get("timestamp") {
            let raw = value.as_str().ok_or_else(|| ParseError::invalid("timestamp"))?;
            criteria.timestamp = Some(TimestampFilter::parse(raw)?);
        }

        if let Some(value) = filter.get("sender") {
            criteria.sender = Some(
                value
                    .as_str()
                    .filter(|s| patterns::is_sender_email(s))
                    .ok_or_else(|| ParseError::invalid("sender"))?
                    .to_string(),
            );
        }

        if let Some(value) = filter.get("receiver") {
            criteria.receiver = Some(
                value
                    .as_str()
                    .filter(|s| patterns::is_bic(s))
                    .ok_or_else(|| ParseError::invalid("receiver"))?
                    .to_string(),
            );
        }

        if let Some(value) = filter.get("verified") {
            criteria.verified = Some(parse_flag(value).ok_or_else(|| ParseError::invalid("verified"))?);
        }

        if let Some(value) = filter.get("status") {
            criteria.status = Some(
                value
                    .as_str()
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| ParseError::invalid("status"))?,
            );
        }

        Ok(criteria)
    }

    /// Parse query-string pairs; values are taken as strings
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let map: Map<String, Value> = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        Self::from_json(&map)
    }

    /// Parse a request body of the form `{"filter": {...}}`.
    ///
    /// A missing or null `filter` means no constraint.
    pub fn from_body(body: &Value) -> Result<Self, ParseError> {
        let filter = match body {
            Value::Null => return Ok(FilterCriteria::default()),
            Value::Object(obj) => match obj.get("filter") {
                None | Some(Value::Null) => return Ok(FilterCriteria::default()),
                Some(Value::Object(filter)) => filter,
                Some(_) => {
                    return Err(ParseError::Malformed {
                        message: "filter must be an object".to_string(),
                    })
                }
            },
            _ => {
                return Err(ParseError::Malformed {
                    message: "body must be an object".to_string(),
                })
            }
        };
        Self::from_json(filter)
    }
}

fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::CoreError;

/// Canonical on-disk timestamp format (local time, no offset).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted input formats, tried in order.
const ACCEPTED_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parse an ISO-like local timestamp with at least minute resolution.
///
/// Fractional seconds and trailing offsets are not accepted; the store only
/// ever writes [`TIMESTAMP_FORMAT`].
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, CoreError> {
    let trimmed = raw.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| CoreError::InvalidTimestamp(raw.to_string()))
}

/// Truncate a timestamp to the minute. Two snapshots with the same key are duplicates.
pub fn minute_key(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// Serde adapter for `NaiveDateTime` in the store's textual format.
pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{parse_timestamp, TIMESTAMP_FORMAT};

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

/// Reads a price map, dropping `null` entries (unknown at this instant).
fn deserialize_prices<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: BTreeMap<String, Option<f64>> = BTreeMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(asset, price)| price.map(|p| (asset, p)))
        .collect())
}

/// One timestamped observation of unit prices.
///
/// An asset missing from `prices` is *unknown at this instant*, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,

    /// Asset identifier → unit price in the native currency
    #[serde(deserialize_with = "deserialize_prices")]
    pub prices: BTreeMap<String, f64>,
}

impl PriceSnapshot {
    pub fn new(timestamp: NaiveDateTime, prices: BTreeMap<String, f64>) -> Self {
        Self { timestamp, prices }
    }

    /// Build a snapshot from `(asset, price)` pairs.
    pub fn from_pairs<I, S>(timestamp: NaiveDateTime, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            timestamp,
            prices: pairs.into_iter().map(|(a, p)| (a.into(), p)).collect(),
        }
    }

    pub fn price(&self, asset: &str) -> Option<f64> {
        self.prices.get(asset).copied()
    }

    pub fn minute_key(&self) -> NaiveDateTime {
        minute_key(self.timestamp)
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::snapshot::timestamp_format;

/// Which external input a fallback replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExternalSource {
    Benchmark,
    ExchangeRate,
    Dividend,
}

impl std::fmt::Display for ExternalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExternalSource::Benchmark => write!(f, "Benchmark"),
            ExternalSource::ExchangeRate => write!(f, "ExchangeRate"),
            ExternalSource::Dividend => write!(f, "Dividend"),
        }
    }
}

/// A locally recovered problem. Collected on the report so callers can tell
/// "degraded but valid" apart from "clean", and see which fallback fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// Held asset absent from a snapshot; excluded from that snapshot's value.
    MissingAssetPrice {
        asset: String,
        #[serde(with = "timestamp_format")]
        timestamp: NaiveDateTime,
    },

    /// Window omitted: a boundary had no snapshot at or before it, or both
    /// boundaries resolved to the same snapshot.
    EmptyWindow { label: String, reason: String },

    /// Window or asset omitted because its base value was zero.
    UndefinedReturn { context: String },

    /// Lookback window narrower than requested (series starts later).
    PartialWindow {
        label: String,
        #[serde(with = "timestamp_format")]
        requested_start: NaiveDateTime,
        #[serde(with = "timestamp_format")]
        actual_start: NaiveDateTime,
    },

    /// An external input failed and a documented default was used instead.
    Fallback {
        source: ExternalSource,
        /// Asset or instrument concerned, if any
        subject: Option<String>,
        cause: String,
    },

    /// Persisted snapshot log could not be read; started from an empty series.
    CorruptStore { cause: String },

    /// Figure omitted for a reason none of the variants above describe.
    Skipped { context: String, cause: String },
}

impl Diagnostic {
    /// Map a recoverable analytics error to a diagnostic. `context` names the
    /// window or figure that was being computed.
    pub fn from_error(context: &str, error: CoreError) -> Self {
        match error {
            CoreError::EmptyWindow { label, reason } => Diagnostic::EmptyWindow { label, reason },
            CoreError::InvalidWindow { label } => Diagnostic::EmptyWindow {
                label,
                reason: "window has zero length".into(),
            },
            CoreError::UndefinedReturn { context } => Diagnostic::UndefinedReturn { context },
            other => Diagnostic::Skipped {
                context: context.to_string(),
                cause: other.to_string(),
            },
        }
    }
}

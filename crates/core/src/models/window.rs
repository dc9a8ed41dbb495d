use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::snapshot::timestamp_format;

/// How a window's boundaries were derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowKind {
    /// Calendar day-of-month boundaries (e.g., the 10th to the 10th)
    Anchored,
    /// Fixed duration ending at the last available snapshot
    Lookback,
}

impl std::fmt::Display for WindowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowKind::Anchored => write!(f, "Anchored"),
            WindowKind::Lookback => write!(f, "Lookback"),
        }
    }
}

/// A requested time interval. `start < end` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    #[serde(with = "timestamp_format")]
    pub start: NaiveDateTime,

    #[serde(with = "timestamp_format")]
    pub end: NaiveDateTime,

    /// Display label, e.g. "12/23 - 01/24" or "7d"
    pub label: String,

    pub kind: WindowKind,
}

impl Window {
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        label: impl Into<String>,
        kind: WindowKind,
    ) -> Result<Self, CoreError> {
        let label = label.into();
        if start >= end {
            return Err(CoreError::InvalidWindow { label });
        }
        Ok(Self {
            start,
            end,
            label,
            kind,
        })
    }
}

/// A window mapped onto concrete series points via at-or-before lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedWindow {
    pub window: Window,

    /// Index of the series point the start boundary resolved to
    pub start_index: usize,

    /// Index of the series point the end boundary resolved to (always > start_index)
    pub end_index: usize,

    /// Timestamp of the start point actually used
    #[serde(with = "timestamp_format")]
    pub start_at: NaiveDateTime,

    /// Timestamp of the end point actually used
    #[serde(with = "timestamp_format")]
    pub end_at: NaiveDateTime,

    /// True when the series did not reach back to the requested start and the
    /// first point was used instead (lookback windows only).
    pub partial: bool,
}

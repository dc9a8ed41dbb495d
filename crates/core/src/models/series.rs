use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::snapshot::{timestamp_format, PriceSnapshot};

/// Anything positioned on the time axis. Lets window resolution work the same
/// way over portfolio values, benchmark prices and raw snapshots.
pub trait Timestamped {
    fn timestamp(&self) -> NaiveDateTime;
}

impl Timestamped for PriceSnapshot {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// Total portfolio value at one snapshot instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl Timestamped for ValuePoint {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// Portfolio value over time, one point per snapshot with at least one priced holding.
/// Points are non-decreasing by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSeries {
    pub points: Vec<ValuePoint>,
}

impl PortfolioSeries {
    pub fn new(points: Vec<ValuePoint>) -> Self {
        Self { points }
    }

    pub fn first(&self) -> Option<&ValuePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&ValuePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// One observation of the reference instrument.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkPoint {
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

impl Timestamped for BenchmarkPoint {
    fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// Externally supplied price series for the benchmark instrument.
///
/// Independent time resolution from the portfolio series; aligned only when a
/// window is evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkSeries {
    pub symbol: String,
    pub points: Vec<BenchmarkPoint>,
}

impl BenchmarkSeries {
    /// Build a series, sorting points by timestamp.
    pub fn new(symbol: impl Into<String>, mut points: Vec<BenchmarkPoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

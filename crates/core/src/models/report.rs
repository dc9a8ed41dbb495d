use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::diagnostic::Diagnostic;
use super::snapshot::timestamp_format;
use super::window::Window;

/// Return and gain over one resolved window, in the native currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub window: Window,

    /// Timestamp of the series point used as the window's start
    #[serde(with = "timestamp_format")]
    pub start_at: NaiveDateTime,

    /// Timestamp of the series point used as the window's end
    #[serde(with = "timestamp_format")]
    pub end_at: NaiveDateTime,

    pub start_value: f64,
    pub end_value: f64,

    /// (end / start - 1) * 100
    pub return_pct: f64,

    /// end - start, native currency
    pub gain: f64,

    /// Window narrower than requested
    pub partial: bool,
}

/// Whether the benchmark figure is real or a defaulted zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BenchmarkStatus {
    Available,
    Unavailable { reason: String },
}

/// Portfolio vs. benchmark over the same window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub symbol: String,
    pub portfolio_return_pct: f64,

    /// 0.0 when `status` is `Unavailable`
    pub benchmark_return_pct: f64,

    /// portfolio - benchmark
    pub relative_pct: f64,

    pub status: BenchmarkStatus,
}

impl BenchmarkComparison {
    /// True when the benchmark return was defaulted rather than computed.
    pub fn is_fallback(&self) -> bool {
        matches!(self.status, BenchmarkStatus::Unavailable { .. })
    }
}

/// One row of the windowed performance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    pub record: PerformanceRecord,

    /// Gain converted to the display currency
    pub gain_display: f64,

    pub benchmark: BenchmarkComparison,
}

/// Worst peak-to-trough decline over the whole series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownSummary {
    /// min(value / running_max - 1) * 100, in [-100, 0]
    pub max_drawdown_pct: f64,

    #[serde(with = "timestamp_format")]
    pub peak_at: NaiveDateTime,
    pub peak_value: f64,

    #[serde(with = "timestamp_format")]
    pub trough_at: NaiveDateTime,
    pub trough_value: f64,
}

/// Price performance of a single held asset across the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPerformance {
    pub asset: String,
    pub first_price: f64,
    pub last_price: f64,
    pub return_pct: f64,

    /// Number of observed (not forward-filled) prices
    pub observations: usize,
}

/// Assets with enough observations, sorted by return (best first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRanking {
    pub ranked: Vec<AssetPerformance>,
}

impl AssetRanking {
    pub fn best(&self) -> Option<&AssetPerformance> {
        self.ranked.first()
    }

    pub fn worst(&self) -> Option<&AssetPerformance> {
        self.ranked.last()
    }
}

/// Projected dividend income, native currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeEstimate {
    pub annual: f64,

    /// annual / 12
    pub monthly: f64,

    /// Asset → annual income contribution
    pub per_asset: BTreeMap<String, f64>,
}

/// Where the exchange rate used for display conversion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FxSource {
    /// Fetched during this run
    Live,
    /// Reused from an earlier successful fetch
    LastKnown,
    /// Configured constant
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxRate {
    /// Display-currency units per native unit
    pub rate: f64,
    pub source: FxSource,
}

/// Current position in a single held asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingSummary {
    pub asset: String,
    pub quantity: f64,

    /// Latest known unit price, native currency
    pub last_price: Option<f64>,

    /// quantity * last_price, native currency (0 when price unknown)
    pub value: f64,

    pub value_display: f64,

    /// Per-unit annual dividend, native currency
    pub annual_dividend_rate: f64,

    /// value / total value * 100
    pub allocation_pct: f64,
}

/// Everything an external renderer needs. Plain data, no formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(with = "timestamp_format")]
    pub generated_at: NaiveDateTime,

    pub native_currency: String,
    pub display_currency: String,
    pub fx: FxRate,

    /// Number of points in the portfolio series
    pub series_len: usize,

    /// Portfolio value at the last series point, native currency
    pub total_value: f64,
    pub total_value_display: f64,

    /// None when the first series value is zero (see diagnostics)
    pub cumulative_return_pct: Option<f64>,

    /// Window from the latest anchor day through now
    pub current: Option<WindowReport>,

    /// Completed anchored windows, most recent first
    pub history: Vec<WindowReport>,

    /// Fixed-duration windows ending at the last snapshot
    pub lookbacks: Vec<WindowReport>,

    pub max_drawdown: Option<DrawdownSummary>,
    pub ranking: AssetRanking,

    pub income: IncomeEstimate,
    pub income_annual_display: f64,
    pub income_monthly_display: f64,

    pub holdings: Vec<HoldingSummary>,

    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn best_performer(&self) -> Option<&AssetPerformance> {
        self.ranking.best()
    }

    pub fn worst_performer(&self) -> Option<&AssetPerformance> {
        self.ranking.worst()
    }

    /// True if any external input was replaced by a fallback.
    pub fn used_fallback(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::Fallback { .. }))
    }
}

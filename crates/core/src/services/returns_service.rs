use tracing::warn;

use crate::errors::CoreError;
use crate::models::diagnostic::Diagnostic;
use crate::models::holdings::Holdings;
use crate::models::report::{AssetPerformance, AssetRanking, DrawdownSummary, PerformanceRecord};
use crate::models::series::PortfolioSeries;
use crate::models::snapshot::PriceSnapshot;
use crate::models::window::ResolvedWindow;

/// `(end / start - 1) * 100`, refusing a zero base instead of returning 0.
pub fn percent_change(start: f64, end: f64, context: &str) -> Result<f64, CoreError> {
    if start == 0.0 || !start.is_finite() {
        return Err(CoreError::UndefinedReturn {
            context: context.to_string(),
        });
    }
    Ok((end / start - 1.0) * 100.0)
}

/// Running maximum of `values`; never decreases.
pub fn running_max(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    values
        .iter()
        .map(|&v| {
            peak = peak.max(v);
            peak
        })
        .collect()
}

/// `d_i = value_i / M_i - 1` as fractions (0.0 at a new peak, -0.25 for a 25% decline).
/// A non-positive running max yields 0.
pub fn drawdown_series(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .zip(running_max(values))
        .map(|(&v, peak)| if peak > 0.0 { v / peak - 1.0 } else { 0.0 })
        .collect()
}

/// Per-asset ranking plus the assets that could not be scored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingOutcome {
    pub ranking: AssetRanking,
    pub excluded: Vec<Diagnostic>,
}

/// Cumulative, windowed and drawdown figures over a portfolio series,
/// and per-asset price performance over the raw snapshots.
pub struct ReturnsService;

impl ReturnsService {
    pub fn new() -> Self {
        Self
    }

    /// Return from the first to the last series point, in percent.
    pub fn cumulative_return(&self, series: &PortfolioSeries) -> Result<f64, CoreError> {
        let first = series.first().ok_or(CoreError::NoSnapshots)?;
        let last = series.last().ok_or(CoreError::NoSnapshots)?;
        percent_change(first.value, last.value, "cumulative return")
    }

    /// Return and gain for a window already resolved against `series`.
    pub fn window_performance(
        &self,
        series: &PortfolioSeries,
        resolved: &ResolvedWindow,
    ) -> Result<PerformanceRecord, CoreError> {
        let (start, end) = match (
            series.points.get(resolved.start_index),
            series.points.get(resolved.end_index),
        ) {
            (Some(s), Some(e)) => (s, e),
            _ => {
                return Err(CoreError::EmptyWindow {
                    label: resolved.window.label.clone(),
                    reason: "resolved indices fall outside the series".into(),
                })
            }
        };

        let return_pct = percent_change(
            start.value,
            end.value,
            &format!("window {}", resolved.window.label),
        )?;

        Ok(PerformanceRecord {
            window: resolved.window.clone(),
            start_at: start.timestamp,
            end_at: end.timestamp,
            start_value: start.value,
            end_value: end.value,
            return_pct,
            gain: end.value - start.value,
            partial: resolved.partial,
        })
    }

    /// Worst decline from the running maximum. `None` for an empty series.
    pub fn max_drawdown(&self, series: &PortfolioSeries) -> Option<DrawdownSummary> {
        let values = series.values();
        let drawdowns = drawdown_series(&values);

        let (trough_index, worst) = drawdowns
            .iter()
            .copied()
            .enumerate()
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))?;

        // Peak is the highest point at or before the trough.
        let peak_index = values[..=trough_index]
            .iter()
            .enumerate()
            .fold(0, |best, (i, &v)| if v > values[best] { i } else { best });

        Some(DrawdownSummary {
            max_drawdown_pct: (worst * 100.0).clamp(-100.0, 0.0),
            peak_at: series.points[peak_index].timestamp,
            peak_value: values[peak_index],
            trough_at: series.points[trough_index].timestamp,
            trough_value: values[trough_index],
        })
    }

    /// Rank held assets by `(last / first - 1) * 100` over observed prices.
    ///
    /// Takes the raw snapshots, not forward-filled ones, so only real
    /// observations count. Assets with fewer than two observations are left out.
    pub fn rank_assets(&self, snapshots: &[PriceSnapshot], holdings: &Holdings) -> RankingOutcome {
        let mut ranked = Vec::new();
        let mut excluded = Vec::new();

        for asset in holdings.assets() {
            let observed: Vec<f64> = snapshots
                .iter()
                .filter_map(|s| s.price(asset))
                .filter(|p| p.is_finite())
                .collect();

            let (first, last) = match (observed.first(), observed.last()) {
                (Some(&f), Some(&l)) if observed.len() >= 2 => (f, l),
                _ => continue,
            };

            match percent_change(first, last, &format!("asset {asset}")) {
                Ok(return_pct) => ranked.push(AssetPerformance {
                    asset: asset.to_string(),
                    first_price: first,
                    last_price: last,
                    return_pct,
                    observations: observed.len(),
                }),
                Err(e) => {
                    warn!(asset = %asset, "Excluded from ranking: {e}");
                    excluded.push(Diagnostic::UndefinedReturn {
                        context: format!("asset {asset}"),
                    });
                }
            }
        }

        ranked.sort_by(|a, b| {
            b.return_pct
                .partial_cmp(&a.return_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.asset.cmp(&b.asset))
        });

        RankingOutcome {
            ranking: AssetRanking { ranked },
            excluded,
        }
    }
}

impl Default for ReturnsService {
    fn default() -> Self {
        Self::new()
    }
}

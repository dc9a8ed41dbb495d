use chrono::{Duration, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};

use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::diagnostic::{Diagnostic, ExternalSource};
use crate::models::holdings::Holdings;
use crate::models::report::{FxRate, FxSource, HoldingSummary, Report, WindowReport};
use crate::models::series::{BenchmarkSeries, PortfolioSeries};
use crate::models::settings::EngineConfig;
use crate::models::snapshot::PriceSnapshot;
use crate::models::window::Window;
use crate::services::benchmark_service::BenchmarkService;
use crate::services::income_service::IncomeService;
use crate::services::returns_service::ReturnsService;
use crate::services::valuation_service::ValuationService;
use crate::services::window_service::WindowService;

/// External inputs for one run, each either fetched or failed.
///
/// Failures are kept as errors so the report can log the cause and record
/// which fallback it applied.
#[derive(Debug)]
pub struct ExternalInputs {
    pub benchmark: Result<BenchmarkSeries, CoreError>,
    pub fx_rate: Result<f64, CoreError>,

    /// Rate from an earlier successful fetch, preferred over the configured constant
    pub last_known_fx: Option<f64>,

    /// Asset → fetched per-unit annual dividend. Absent assets contribute 0 silently.
    pub dividend_rates: BTreeMap<String, Result<f64, CoreError>>,
}

impl ExternalInputs {
    /// Inputs for an offline run: no benchmark, no FX, no dividends.
    pub fn offline() -> Self {
        Self {
            benchmark: Err(CoreError::NoProvider("offline".into())),
            fx_rate: Err(CoreError::NoProvider("offline".into())),
            last_known_fx: None,
            dividend_rates: BTreeMap::new(),
        }
    }
}

/// Assembles the report model from snapshots, holdings and external inputs.
///
/// Everything local to one asset, window or source is contained here: it is
/// recorded as a diagnostic and the rest of the report is still produced.
/// Only the absence of any valuable snapshot fails the run.
pub struct ReportService {
    valuation_service: ValuationService,
    window_service: WindowService,
    returns_service: ReturnsService,
    benchmark_service: BenchmarkService,
    income_service: IncomeService,
}

impl ReportService {
    pub fn new() -> Self {
        Self {
            valuation_service: ValuationService::new(),
            window_service: WindowService::new(),
            returns_service: ReturnsService::new(),
            benchmark_service: BenchmarkService::new(),
            income_service: IncomeService::new(),
        }
    }

    /// Earliest instant any configured window can reach back to. Used to size
    /// the benchmark fetch.
    pub fn required_history_start(
        &self,
        now: NaiveDateTime,
        config: &EngineConfig,
    ) -> Result<NaiveDateTime, CoreError> {
        let mut earliest = self.window_service.current_window_start(now, config.anchor_day)?;
        if let Some(oldest) = self
            .window_service
            .anchored_history(now, config.anchor_day, config.history_months)?
            .last()
        {
            earliest = earliest.min(oldest.start);
        }
        if let Some(&days) = config.lookback_days.iter().max() {
            earliest = earliest.min(now - Duration::days(i64::from(days)));
        }
        Ok(earliest)
    }

    /// Build the full report.
    pub fn build_report(
        &self,
        snapshots: &[PriceSnapshot],
        holdings: &Holdings,
        config: &EngineConfig,
        inputs: ExternalInputs,
        now: NaiveDateTime,
    ) -> Result<Report, CoreError> {
        let valuation = self
            .valuation_service
            .value_series(snapshots, holdings, config.forward_fill);
        let series = valuation.series;
        let last_point = *series.last().ok_or(CoreError::NoSnapshots)?;

        let mut diagnostics = valuation.gaps;

        // 1. External inputs, with documented fallbacks
        let fx = self.resolve_fx(inputs.fx_rate, inputs.last_known_fx, config, &mut diagnostics);

        let benchmark = match inputs.benchmark {
            Ok(series) => Some(series),
            Err(e) => {
                warn!(symbol = %config.benchmark_symbol, "Benchmark fetch failed, returns default to 0: {e}");
                diagnostics.push(Diagnostic::Fallback {
                    source: ExternalSource::Benchmark,
                    subject: Some(config.benchmark_symbol.clone()),
                    cause: e.to_string(),
                });
                None
            }
        };

        let mut dividend_rates: HashMap<String, f64> = HashMap::new();
        for (asset, rate) in inputs.dividend_rates {
            match rate {
                Ok(rate) => {
                    dividend_rates.insert(asset, rate);
                }
                Err(e) => {
                    warn!(asset = %asset, "Dividend rate fetch failed, using 0: {e}");
                    diagnostics.push(Diagnostic::Fallback {
                        source: ExternalSource::Dividend,
                        subject: Some(asset),
                        cause: e.to_string(),
                    });
                }
            }
        }

        // 2. Whole-series figures
        let cumulative_return_pct = match self.returns_service.cumulative_return(&series) {
            Ok(pct) => Some(pct),
            Err(e) => {
                Self::record_error("cumulative return", e, &mut diagnostics);
                None
            }
        };
        let max_drawdown = self.returns_service.max_drawdown(&series);

        // 3. Windows
        let ctx = WindowContext {
            series: &series,
            benchmark: benchmark.as_ref(),
            symbol: &config.benchmark_symbol,
            fx_rate: fx.rate,
        };

        let current = match self.window_service.current_window(now, config.anchor_day) {
            Ok(window) => self.evaluate_window(&ctx, &window, &mut diagnostics),
            Err(e) => {
                Self::record_error("current window", e, &mut diagnostics);
                None
            }
        };

        let history = self
            .window_service
            .anchored_history(now, config.anchor_day, config.history_months)?
            .iter()
            .filter_map(|window| self.evaluate_window(&ctx, window, &mut diagnostics))
            .collect();

        let mut lookbacks = Vec::with_capacity(config.lookback_days.len());
        for &days in &config.lookback_days {
            match self.window_service.lookback_window(now, days) {
                Ok(window) => lookbacks.extend(self.evaluate_window(&ctx, &window, &mut diagnostics)),
                Err(e) => Self::record_error(&format!("{days}d"), e, &mut diagnostics),
            }
        }

        // 4. Per-asset figures (observed prices only)
        let mut sorted_snapshots = snapshots.to_vec();
        sorted_snapshots.sort_by_key(|s| s.timestamp);

        let ranking_outcome = self.returns_service.rank_assets(&sorted_snapshots, holdings);
        diagnostics.extend(ranking_outcome.excluded);

        let income = self.income_service.estimate(holdings, &dividend_rates);
        let holdings_summary = Self::summarize_holdings(&sorted_snapshots, holdings, &dividend_rates, fx.rate);

        info!(
            points = series.len(),
            total_value = last_point.value,
            diagnostics = diagnostics.len(),
            "Report built"
        );

        Ok(Report {
            generated_at: now,
            native_currency: config.native_currency.clone(),
            display_currency: config.display_currency.clone(),
            fx,
            series_len: series.len(),
            total_value: last_point.value,
            total_value_display: last_point.value * fx.rate,
            cumulative_return_pct,
            current,
            history,
            lookbacks,
            max_drawdown,
            ranking: ranking_outcome.ranking,
            income_annual_display: income.annual * fx.rate,
            income_monthly_display: income.monthly * fx.rate,
            income,
            holdings: holdings_summary,
            diagnostics,
        })
    }

    // ── Internal ────────────────────────────────────────────────────

    fn resolve_fx(
        &self,
        fetched: Result<f64, CoreError>,
        last_known: Option<f64>,
        config: &EngineConfig,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> FxRate {
        let e = match fetched {
            Ok(rate) => {
                return FxRate {
                    rate,
                    source: FxSource::Live,
                }
            }
            Err(e) => e,
        };

        let pair = format!("{}/{}", config.native_currency, config.display_currency);
        let fx = match last_known.filter(|r| r.is_finite() && *r > 0.0) {
            Some(rate) => FxRate {
                rate,
                source: FxSource::LastKnown,
            },
            None => FxRate {
                rate: config.fallback_fx_rate,
                source: FxSource::Default,
            },
        };
        warn!(%pair, rate = fx.rate, source = ?fx.source, "Exchange rate fetch failed, using fallback: {e}");
        diagnostics.push(Diagnostic::Fallback {
            source: ExternalSource::ExchangeRate,
            subject: Some(pair),
            cause: e.to_string(),
        });
        fx
    }

    /// Resolve, measure and benchmark one window. Omitted windows leave a diagnostic.
    fn evaluate_window(
        &self,
        ctx: &WindowContext<'_>,
        window: &Window,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<WindowReport> {
        let record = self
            .window_service
            .resolve(&ctx.series.points, window)
            .and_then(|resolved| self.returns_service.window_performance(ctx.series, &resolved));

        let record = match record {
            Ok(record) => record,
            Err(e) => {
                Self::record_error(&window.label, e, diagnostics);
                return None;
            }
        };

        if record.partial {
            warn!(window = %window.label, requested = %window.start, actual = %record.start_at, "Lookback window narrower than requested");
            diagnostics.push(Diagnostic::PartialWindow {
                label: window.label.clone(),
                requested_start: window.start,
                actual_start: record.start_at,
            });
        }

        let benchmark = self.benchmark_service.compare(&record, ctx.benchmark, ctx.symbol);

        Some(WindowReport {
            gain_display: record.gain * ctx.fx_rate,
            record,
            benchmark,
        })
    }

    /// Turn a locally recoverable error into a diagnostic.
    fn record_error(context: &str, e: CoreError, diagnostics: &mut Vec<Diagnostic>) {
        let diagnostic = Diagnostic::from_error(context, e);
        match &diagnostic {
            Diagnostic::EmptyWindow { label, reason } => {
                info!(window = %label, "Window omitted: {reason}");
            }
            Diagnostic::UndefinedReturn { context } => {
                warn!("Return undefined for {context}: base value is zero");
            }
            Diagnostic::Skipped { context, cause } => {
                warn!("Unexpected analytics error for {context}: {cause}");
            }
            _ => {}
        }
        diagnostics.push(diagnostic);
    }

    fn summarize_holdings(
        snapshots: &[PriceSnapshot],
        holdings: &Holdings,
        dividend_rates: &HashMap<String, f64>,
        fx_rate: f64,
    ) -> Vec<HoldingSummary> {
        let mut summaries: Vec<HoldingSummary> = holdings
            .iter()
            .map(|(asset, quantity)| {
                let last_price = snapshots.iter().rev().find_map(|s| s.price(asset));
                let value = last_price.map(|p| p * quantity).unwrap_or(0.0);
                HoldingSummary {
                    asset: asset.to_string(),
                    quantity,
                    last_price,
                    value,
                    value_display: value * fx_rate,
                    annual_dividend_rate: dividend_rates.get(asset).copied().unwrap_or(0.0),
                    allocation_pct: 0.0, // filled below
                }
            })
            .collect();

        let total: f64 = summaries.iter().map(|h| h.value).sum();
        for holding in &mut summaries {
            holding.allocation_pct = if total > 0.0 {
                (holding.value / total) * 100.0
            } else {
                0.0
            };
        }

        // Sort by allocation (largest first)
        summaries.sort_by(|a, b| {
            b.allocation_pct
                .partial_cmp(&a.allocation_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        summaries
    }
}

impl Default for ReportService {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-run values shared by every window evaluation.
struct WindowContext<'a> {
    series: &'a PortfolioSeries,
    benchmark: Option<&'a BenchmarkSeries>,
    symbol: &'a str,
    fx_rate: f64,
}

use tracing::{debug, warn};

use crate::models::report::{BenchmarkComparison, BenchmarkStatus, PerformanceRecord};
use crate::models::series::BenchmarkSeries;
use crate::services::returns_service::percent_change;
use crate::services::window_service::at_or_before;

/// Compares a portfolio window against an external reference instrument.
///
/// The benchmark is aligned to the instants the portfolio window actually
/// resolved to, using the same at-or-before rule. When the benchmark cannot
/// cover the window the comparison degrades to a 0% benchmark return and is
/// flagged `Unavailable`, so a real 0% move stays distinguishable.
pub struct BenchmarkService;

impl BenchmarkService {
    pub fn new() -> Self {
        Self
    }

    /// Compare `record` to `benchmark`. `None` means the series could not be fetched.
    pub fn compare(
        &self,
        record: &PerformanceRecord,
        benchmark: Option<&BenchmarkSeries>,
        symbol: &str,
    ) -> BenchmarkComparison {
        let portfolio_return_pct = record.return_pct;

        let outcome = match benchmark {
            None => Err("benchmark series unavailable".to_string()),
            Some(series) => self.benchmark_return(record, series),
        };

        match outcome {
            Ok(benchmark_return_pct) => {
                debug!(
                    window = %record.window.label,
                    portfolio = portfolio_return_pct,
                    benchmark = benchmark_return_pct,
                    "Benchmark comparison"
                );
                BenchmarkComparison {
                    symbol: symbol.to_string(),
                    portfolio_return_pct,
                    benchmark_return_pct,
                    relative_pct: portfolio_return_pct - benchmark_return_pct,
                    status: BenchmarkStatus::Available,
                }
            }
            Err(reason) => {
                warn!(window = %record.window.label, %symbol, "Benchmark return defaulted to 0: {reason}");
                BenchmarkComparison {
                    symbol: symbol.to_string(),
                    portfolio_return_pct,
                    benchmark_return_pct: 0.0,
                    relative_pct: portfolio_return_pct,
                    status: BenchmarkStatus::Unavailable { reason },
                }
            }
        }
    }

    /// Benchmark return between the record's resolved start and end instants.
    fn benchmark_return(
        &self,
        record: &PerformanceRecord,
        series: &BenchmarkSeries,
    ) -> Result<f64, String> {
        let start = at_or_before(&series.points, record.start_at)
            .ok_or_else(|| format!("no {} price at or before {}", series.symbol, record.start_at))?;
        let end = at_or_before(&series.points, record.end_at)
            .ok_or_else(|| format!("no {} price at or before {}", series.symbol, record.end_at))?;

        if start >= end {
            return Err(format!(
                "{} series has a single point inside window {}",
                series.symbol, record.window.label
            ));
        }

        percent_change(
            series.points[start].price,
            series.points[end].price,
            &format!("benchmark {}", series.symbol),
        )
        .map_err(|e| e.to_string())
    }
}

impl Default for BenchmarkService {
    fn default() -> Self {
        Self::new()
    }
}

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::market_data::DataKind;
use crate::models::series::BenchmarkSeries;
use crate::models::snapshot::PriceSnapshot;
use crate::providers::registry::MarketDataRegistry;
use crate::providers::traits::MarketDataProvider;

/// Fetches external inputs (benchmark series, FX rate, dividend rates, price
/// samples) through the provider registry.
///
/// Every call is bounded by a timeout and falls through the registered
/// providers in priority order. Failures come back as `Err` so the caller can
/// pick the documented fallback; one failed fetch never blocks another.
pub struct MarketDataService {
    registry: MarketDataRegistry,
    timeout: Duration,
}

impl MarketDataService {
    pub fn new(registry: MarketDataRegistry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Benchmark price history covering `[from, to]`.
    pub async fn fetch_benchmark(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BenchmarkSeries, CoreError> {
        let providers = self.providers(DataKind::Quotes)?;
        let mut last_error = None;

        for provider in &providers {
            let what = format!("{} history for {symbol}", provider.name());
            match self.timed(&what, provider.get_price_history(symbol, from, to)).await {
                Ok(points) if !points.is_empty() => {
                    debug!(%symbol, points = points.len(), provider = provider.name(), "Fetched benchmark history");
                    return Ok(BenchmarkSeries::new(symbol, points));
                }
                Ok(_) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("Empty history for {symbol} between {from} and {to}"),
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(DataKind::Quotes.to_string())))
    }

    /// Latest exchange rate: units of `to` per one unit of `from`.
    pub async fn fetch_exchange_rate(&self, from: &str, to: &str) -> Result<f64, CoreError> {
        if from.eq_ignore_ascii_case(to) {
            return Ok(1.0);
        }

        let providers = self.providers(DataKind::ExchangeRates)?;
        let mut last_error = None;

        for provider in &providers {
            let what = format!("{} rate {from}/{to}", provider.name());
            match self.timed(&what, provider.get_exchange_rate(from, to)).await {
                Ok(rate) if rate.is_finite() && rate > 0.0 => return Ok(rate),
                Ok(rate) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("Invalid rate returned for {from}/{to}: {rate}"),
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(DataKind::ExchangeRates.to_string())))
    }

    /// Per-unit annual dividend rate of one asset.
    pub async fn fetch_dividend_rate(&self, symbol: &str) -> Result<f64, CoreError> {
        let providers = self.providers(DataKind::Dividends)?;
        let mut last_error = None;

        for provider in &providers {
            let what = format!("{} dividends for {symbol}", provider.name());
            match self.timed(&what, provider.get_annual_dividend_rate(symbol)).await {
                Ok(rate) if rate.is_finite() && rate >= 0.0 => return Ok(rate),
                Ok(rate) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("Invalid dividend rate returned for {symbol}: {rate}"),
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(DataKind::Dividends.to_string())))
    }

    /// Dividend rates for each asset, each fetched independently.
    pub async fn fetch_dividend_rates<'a, I>(&self, assets: I) -> BTreeMap<String, Result<f64, CoreError>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut rates = BTreeMap::new();
        for asset in assets {
            let rate = self.fetch_dividend_rate(asset).await;
            rates.insert(asset.to_string(), rate);
        }
        rates
    }

    /// Latest price of one asset.
    pub async fn fetch_latest_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let providers = self.providers(DataKind::Quotes)?;
        let mut last_error = None;

        for provider in &providers {
            let what = format!("{} quote for {symbol}", provider.name());
            match self.timed(&what, provider.get_latest_price(symbol)).await {
                Ok(price) if price.is_finite() && price >= 0.0 => return Ok(price),
                Ok(price) => {
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("Invalid price returned for {symbol}: {price} (must be finite and non-negative)"),
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(DataKind::Quotes.to_string())))
    }

    /// Sample the latest price of every symbol into one snapshot stamped `now`.
    ///
    /// Symbols whose fetch fails are left out of the snapshot (unknown, not zero).
    /// Returns `None` if no symbol could be priced.
    pub async fn collect_snapshot(&self, symbols: &[String], now: NaiveDateTime) -> Option<PriceSnapshot> {
        let mut prices = BTreeMap::new();

        for symbol in symbols {
            match self.fetch_latest_price(symbol).await {
                Ok(price) => {
                    prices.insert(symbol.clone(), price);
                }
                Err(e) => warn!(%symbol, "Price sample failed: {e}"),
            }
        }

        if prices.is_empty() {
            warn!("No prices collected for any symbol");
            return None;
        }
        Some(PriceSnapshot::new(now, prices))
    }

    /// Build daily snapshots from price history, one per local date that has
    /// at least one symbol priced. Used to seed an empty store.
    pub async fn backfill_history(
        &self,
        symbols: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceSnapshot>, CoreError> {
        let mut by_date: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();
        let mut last_error = None;

        for symbol in symbols {
            match self.fetch_benchmark(symbol, from, to).await {
                Ok(series) => {
                    for point in series.points {
                        by_date
                            .entry(point.timestamp.date())
                            .or_default()
                            .insert(symbol.clone(), point.price);
                    }
                }
                Err(e) => {
                    warn!(%symbol, "Backfill failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        if by_date.is_empty() {
            return Err(last_error.unwrap_or(CoreError::NoSnapshots));
        }

        let snapshots: Vec<PriceSnapshot> = by_date
            .into_iter()
            .filter_map(|(date, prices)| {
                date.and_hms_opt(0, 0, 0)
                    .map(|ts| PriceSnapshot::new(ts, prices))
            })
            .collect();

        info!(snapshots = snapshots.len(), %from, %to, "Backfilled daily history");
        Ok(snapshots)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn providers(&self, kind: DataKind) -> Result<Vec<&dyn MarketDataProvider>, CoreError> {
        let providers = self.registry.get_providers_for(kind);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(kind.to_string()));
        }
        Ok(providers)
    }

    /// Bound a provider call by the configured timeout; expiry is a fetch failure.
    async fn timed<T, F>(&self, what: &str, fut: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Timeout(what.to_string())),
        }
    }
}

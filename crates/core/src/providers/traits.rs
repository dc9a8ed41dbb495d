use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::market_data::DataKind;
use crate::models::series::BenchmarkPoint;

/// Trait abstraction for all external market data sources.
///
/// Each source (Yahoo Finance, Frankfurter) implements the operations for the
/// [`DataKind`]s it declares; the rest keep the default "unsupported" body.
/// The analytics core never sees a provider, only the values or errors the
/// market data service hands it.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which kinds of data this provider can supply.
    fn supported_data(&self) -> Vec<DataKind>;

    /// Latest unit price of `symbol` in its quote currency.
    async fn get_latest_price(&self, symbol: &str) -> Result<f64, CoreError> {
        Err(self.unsupported(DataKind::Quotes, symbol))
    }

    /// Price observations for `symbol` in `[from, to]`, sorted by timestamp.
    async fn get_price_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<BenchmarkPoint>, CoreError> {
        let _ = (from, to);
        Err(self.unsupported(DataKind::Quotes, symbol))
    }

    /// Latest rate: units of `to` per one unit of `from`.
    async fn get_exchange_rate(&self, from: &str, to: &str) -> Result<f64, CoreError> {
        Err(self.unsupported(DataKind::ExchangeRates, &format!("{from}/{to}")))
    }

    /// Per-unit annual dividend of `symbol` in its quote currency.
    async fn get_annual_dividend_rate(&self, symbol: &str) -> Result<f64, CoreError> {
        Err(self.unsupported(DataKind::Dividends, symbol))
    }

    #[doc(hidden)]
    fn unsupported(&self, kind: DataKind, subject: &str) -> CoreError {
        CoreError::Api {
            provider: self.name().to_string(),
            message: format!("{kind} not supported (requested for {subject})"),
        }
    }
}

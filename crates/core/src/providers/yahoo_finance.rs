use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use time::OffsetDateTime;

use crate::errors::CoreError;
use crate::models::market_data::DataKind;
use crate::models::series::BenchmarkPoint;
use super::traits::MarketDataProvider;

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance provider for quotes, dividends and (fallback) exchange rates.
///
/// - **Free**: No API key required.
/// - **Coverage**: Global equities, ETFs, indices, currency pairs.
///
/// Uses the `yahoo_finance_api` crate which wraps Yahoo Finance's public
/// chart endpoints. Prices are in the instrument's native currency.
///
/// **Note**: Not WASM-compatible (uses native reqwest/tokio).
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    /// Convert a `chrono::NaiveDate` to `time::OffsetDateTime` (midnight UTC).
    fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime, CoreError> {
        let ts = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .ok_or_else(|| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Invalid date {date}"),
            })?;
        OffsetDateTime::from_unix_timestamp(ts).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Invalid date {date}: {e}"),
        })
    }

    /// Convert a unix timestamp (seconds) to local wall-clock time, matching
    /// how snapshot timestamps are recorded.
    fn timestamp_to_local(ts: i64) -> Option<NaiveDateTime> {
        chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.with_timezone(&chrono::Local).naive_local())
    }

    async fn latest_close(&self, symbol: &str) -> Result<f64, CoreError> {
        let resp = self
            .connector
            .get_latest_quotes(symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch latest quote for {symbol}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No quote data for {symbol}: {e}"),
        })?;

        if !quote.close.is_finite() || quote.close <= 0.0 {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Invalid price returned for {symbol}: {}", quote.close),
            });
        }
        Ok(quote.close)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supported_data(&self) -> Vec<DataKind> {
        vec![DataKind::Quotes, DataKind::Dividends, DataKind::ExchangeRates]
    }

    async fn get_latest_price(&self, symbol: &str) -> Result<f64, CoreError> {
        self.latest_close(symbol).await
    }

    async fn get_price_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<BenchmarkPoint>, CoreError> {
        let start = Self::to_offset_datetime(from)?;
        let end = Self::to_offset_datetime(to + Duration::days(1))?; // inclusive end

        let resp = self
            .connector
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch history for {symbol}: {e}"),
            })?;

        let quotes = resp.quotes().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse quotes for {symbol}: {e}"),
        })?;

        let mut points: Vec<BenchmarkPoint> = quotes
            .iter()
            .filter(|q| q.close.is_finite() && q.close > 0.0)
            .filter_map(|q| {
                let timestamp = Self::timestamp_to_local(q.timestamp)?;
                Some(BenchmarkPoint {
                    timestamp,
                    price: q.close,
                })
            })
            .collect();

        points.sort_by_key(|p| p.timestamp);
        Ok(points)
    }

    /// Yahoo quotes currency pairs as e.g. "USDILS=X".
    async fn get_exchange_rate(&self, from: &str, to: &str) -> Result<f64, CoreError> {
        let base = from.to_uppercase();
        let target = to.to_uppercase();
        if base == target {
            return Ok(1.0);
        }
        self.latest_close(&format!("{base}{target}=X")).await
    }

    /// Trailing twelve-month sum of paid dividends per unit.
    async fn get_annual_dividend_rate(&self, symbol: &str) -> Result<f64, CoreError> {
        let today = chrono::Utc::now().date_naive();
        let start = Self::to_offset_datetime(today - Duration::days(365))?;
        let end = Self::to_offset_datetime(today + Duration::days(1))?;

        let resp = self
            .connector
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch dividend history for {symbol}: {e}"),
            })?;

        let dividends = resp.dividends().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse dividends for {symbol}: {e}"),
        })?;

        Ok(dividends
            .iter()
            .map(|d| d.amount)
            .filter(|a| a.is_finite() && *a > 0.0)
            .sum())
    }
}

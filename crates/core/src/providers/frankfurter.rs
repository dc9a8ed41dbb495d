use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::market_data::DataKind;
use super::traits::MarketDataProvider;

const BASE_URL: &str = "https://api.frankfurter.dev/v1";

/// Frankfurter API provider for fiat exchange rates.
///
/// - **Free**: No API key, no rate limits, open-source.
/// - **Source**: European Central Bank (ECB) reference rates.
/// - **Endpoint used**: `/latest?base=USD&symbols=ILS`
pub struct FrankfurterProvider {
    client: Client,
}

impl FrankfurterProvider {
    pub fn new() -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for FrankfurterProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Frankfurter API response types ──────────────────────────────────

#[derive(Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MarketDataProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        "Frankfurter"
    }

    fn supported_data(&self) -> Vec<DataKind> {
        vec![DataKind::ExchangeRates]
    }

    async fn get_exchange_rate(&self, from: &str, to: &str) -> Result<f64, CoreError> {
        let base = from.to_uppercase();
        let target = to.to_uppercase();

        // Same currency → rate is 1.0
        if base == target {
            return Ok(1.0);
        }

        let url = format!("{BASE_URL}/latest?base={base}&symbols={target}");

        let resp: RatesResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Frankfurter".into(),
                message: format!("Failed to parse response for {base}/{target}: {e}"),
            })?;

        resp.rates.get(&target).copied().ok_or_else(|| CoreError::Api {
            provider: "Frankfurter".into(),
            message: format!("No rate found for {base} → {target}"),
        })
    }
}

use std::collections::HashMap;

use crate::models::holdings::Holdings;
use crate::models::report::IncomeEstimate;

/// Projects dividend income from holdings and per-unit annual rates.
pub struct IncomeService;

impl IncomeService {
    pub fn new() -> Self {
        Self
    }

    /// `Σ quantity[a] * rate[a]`; assets without a rate contribute 0.
    pub fn estimate(&self, holdings: &Holdings, annual_rates: &HashMap<String, f64>) -> IncomeEstimate {
        let per_asset: std::collections::BTreeMap<String, f64> = holdings
            .iter()
            .map(|(asset, quantity)| {
                let rate = annual_rates
                    .get(asset)
                    .copied()
                    .filter(|r| r.is_finite())
                    .unwrap_or(0.0);
                (asset.to_string(), quantity * rate)
            })
            .collect();

        let annual: f64 = per_asset.values().sum();

        IncomeEstimate {
            annual,
            monthly: annual / 12.0,
            per_asset,
        }
    }
}

impl Default for IncomeService {
    fn default() -> Self {
        Self::new()
    }
}

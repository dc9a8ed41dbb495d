use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Engine configuration, passed explicitly into every run.
///
/// Every field has a default, so a partial JSON file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Day of month used as the monthly window boundary
    pub anchor_day: u32,

    /// Number of completed anchored windows to report before the current one
    pub history_months: u32,

    /// Lookback windows to report, in days (e.g., [1, 7])
    pub lookback_days: Vec<u32>,

    /// Maximum number of snapshots kept in the store (most recent win)
    pub retention_cap: usize,

    /// Forward-fill missing per-asset prices before valuation
    pub forward_fill: bool,

    /// Reference instrument for relative performance
    pub benchmark_symbol: String,

    /// Currency the snapshot prices are quoted in
    pub native_currency: String,

    /// Currency gains and totals are additionally expressed in
    pub display_currency: String,

    /// Exchange rate used when no live or last-known rate is available
    pub fallback_fx_rate: f64,

    /// Per-call timeout for external fetches
    pub fetch_timeout_secs: u64,

    /// Days of daily history fetched when the store is empty
    pub backfill_days: u32,

    /// Location of the snapshot log
    pub store_path: String,

    /// Location of the holdings file
    pub holdings_path: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            anchor_day: 10,
            history_months: 12,
            lookback_days: vec![1, 7],
            retention_cap: 5000,
            forward_fill: true,
            benchmark_symbol: "SPY".to_string(),
            native_currency: "USD".to_string(),
            display_currency: "ILS".to_string(),
            fallback_fx_rate: 3.7,
            fetch_timeout_secs: 30,
            backfill_days: 365,
            store_path: "stock_history.json".to_string(),
            holdings_path: "portfolio.json".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| CoreError::Config(format!("Invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(1..=31).contains(&self.anchor_day) {
            return Err(CoreError::Config(format!(
                "anchor_day must be between 1 and 31, got {}",
                self.anchor_day
            )));
        }
        if self.retention_cap == 0 {
            return Err(CoreError::Config("retention_cap must be at least 1".into()));
        }
        if !self.fallback_fx_rate.is_finite() || self.fallback_fx_rate <= 0.0 {
            return Err(CoreError::Config(format!(
                "fallback_fx_rate must be positive, got {}",
                self.fallback_fx_rate
            )));
        }
        if self.lookback_days.contains(&0) {
            return Err(CoreError::Config("lookback_days entries must be positive".into()));
        }
        for (name, code) in [
            ("native_currency", &self.native_currency),
            ("display_currency", &self.display_currency),
        ] {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(CoreError::Config(format!(
                    "Invalid {name} '{code}': must be exactly 3 ASCII letters (e.g., USD, EUR, ILS)"
                )));
            }
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fetch_timeout_secs)
    }
}

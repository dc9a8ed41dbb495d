use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::CoreError;

/// Static asset → quantity mapping for one analysis run.
///
/// Owned by the caller; the engine only reads it. Keys are kept exactly as
/// given since they must match the snapshot price keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct Holdings {
    quantities: BTreeMap<String, f64>,
}

impl Holdings {
    /// Build holdings, rejecting negative or non-finite quantities.
    pub fn new(quantities: BTreeMap<String, f64>) -> Result<Self, CoreError> {
        for (asset, qty) in &quantities {
            if !qty.is_finite() || *qty < 0.0 {
                return Err(CoreError::Config(format!(
                    "Holding quantity for {asset} must be finite and non-negative, got {qty}"
                )));
            }
        }
        Ok(Self { quantities })
    }

    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(a, q)| (a.into(), q)).collect())
    }

    /// Parse and validate a JSON object such as `{"AAPL": 10, "MSFT": 2.5}`.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::Config(format!("Invalid holdings JSON: {e}")))
    }

    pub fn quantity(&self, asset: &str) -> Option<f64> {
        self.quantities.get(asset).copied()
    }

    /// Iterate `(asset, quantity)` in asset order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.quantities.iter().map(|(a, q)| (a.as_str(), *q))
    }

    pub fn assets(&self) -> impl Iterator<Item = &str> {
        self.quantities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

impl TryFrom<BTreeMap<String, f64>> for Holdings {
    type Error = CoreError;

    fn try_from(quantities: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::new(quantities)
    }
}

impl From<Holdings> for BTreeMap<String, f64> {
    fn from(holdings: Holdings) -> Self {
        holdings.quantities
    }
}

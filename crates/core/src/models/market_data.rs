use serde::{Deserialize, Serialize};

/// The kind of external market data a provider can supply.
/// Determines which providers the registry routes a request to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    /// Latest and historical unit prices (holdings, benchmark)
    Quotes,
    /// Fiat exchange rates (native → display currency)
    ExchangeRates,
    /// Per-unit annual dividend rates
    Dividends,
}

impl std::fmt::Display for DataKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataKind::Quotes => write!(f, "Quotes"),
            DataKind::ExchangeRates => write!(f, "ExchangeRates"),
            DataKind::Dividends => write!(f, "Dividends"),
        }
    }
}

use crate::models::market_data::DataKind;

use super::frankfurter::FrankfurterProvider;
#[cfg(not(target_arch = "wasm32"))]
use super::yahoo_finance::YahooFinanceProvider;
use super::traits::MarketDataProvider;

/// Registry of all available market data providers.
///
/// Routes requests to the correct provider based on `DataKind`.
/// New providers can be added without modifying existing code.
pub struct MarketDataRegistry {
    providers: Vec<Box<dyn MarketDataProvider>>,
}

impl MarketDataRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with all default providers pre-configured.
    pub fn new_with_defaults() -> Self {
        let mut registry = Self::new();

        // Frankfurter: exchange rates, no API key needed (primary for FX)
        registry.register(Box::new(FrankfurterProvider::new()));

        // Yahoo Finance: quotes + dividends, FX fallback via "XXXYYY=X" pairs
        // Not available on WASM (uses native reqwest/tokio connectors)
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Ok(yahoo) = YahooFinanceProvider::new() {
                registry.register(Box::new(yahoo));
            }
        }

        registry
    }

    /// Register a new provider. Earlier registrations take priority.
    pub fn register(&mut self, provider: Box<dyn MarketDataProvider>) {
        self.providers.push(provider);
    }

    /// Find the first provider that supplies the given kind of data.
    pub fn get_provider_for(&self, kind: DataKind) -> Option<&dyn MarketDataProvider> {
        self.providers
            .iter()
            .find(|p| p.supported_data().contains(&kind))
            .map(|p| p.as_ref())
    }

    /// Return ALL providers for the given kind, ordered by registration priority.
    /// Used for fallback: if the first provider fails, try the next one.
    pub fn get_providers_for(&self, kind: DataKind) -> Vec<&dyn MarketDataProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_data().contains(&kind))
            .map(|p| p.as_ref())
            .collect()
    }
}

impl Default for MarketDataRegistry {
    fn default() -> Self {
        Self::new()
    }
}

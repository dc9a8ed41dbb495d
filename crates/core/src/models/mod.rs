pub mod diagnostic;
pub mod holdings;
pub mod market_data;
pub mod report;
pub mod series;
pub mod settings;
pub mod snapshot;
pub mod window;

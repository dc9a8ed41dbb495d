pub mod benchmark_service;
pub mod income_service;
pub mod market_data_service;
pub mod report_service;
pub mod returns_service;
pub mod valuation_service;
pub mod window_service;

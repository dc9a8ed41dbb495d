use crate::errors::CoreError;
use crate::models::holdings::Holdings;
use crate::models::settings::EngineConfig;

/// Loads the caller-owned inputs: holdings and engine configuration.
///
/// A missing holdings file is a configuration error, never an empty portfolio.
pub struct StorageManager;

impl StorageManager {
    /// Parse holdings from raw bytes (portable, platform-independent).
    pub fn holdings_from_bytes(data: &[u8]) -> Result<Holdings, CoreError> {
        let json = std::str::from_utf8(data)
            .map_err(|e| CoreError::Config(format!("Holdings file is not UTF-8: {e}")))?;
        Holdings::from_json(json)
    }

    /// Parse engine configuration from raw bytes.
    pub fn config_from_bytes(data: &[u8]) -> Result<EngineConfig, CoreError> {
        let json = std::str::from_utf8(data)
            .map_err(|e| CoreError::Config(format!("Config file is not UTF-8: {e}")))?;
        EngineConfig::from_json(json)
    }

    /// Load holdings from a JSON file on disk (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_holdings(path: &str) -> Result<Holdings, CoreError> {
        let bytes = std::fs::read(path)
            .map_err(|e| CoreError::Config(format!("Cannot read holdings file {path}: {e}")))?;
        Self::holdings_from_bytes(&bytes)
    }

    /// Load configuration from a JSON file on disk (native only).
    /// A missing file yields the defaults.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_config(path: &str) -> Result<EngineConfig, CoreError> {
        match std::fs::read(path) {
            Ok(bytes) => Self::config_from_bytes(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EngineConfig::default()),
            Err(e) => Err(CoreError::Config(format!("Cannot read config file {path}: {e}"))),
        }
    }
}

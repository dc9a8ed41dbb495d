use thiserror::Error;

/// Unified error type for the entire portfolio-tracker-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage / File ──────────────────────────────────────────────
    #[error("Snapshot store is corrupt: {0}")]
    CorruptStore(String),

    #[error("Invalid timestamp '{0}': expected YYYY-MM-DD HH:MM[:SS]")]
    InvalidTimestamp(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No provider available for: {0}")]
    NoProvider(String),

    #[error("Request to {0} timed out")]
    Timeout(String),

    // ── Analytics ───────────────────────────────────────────────────
    #[error("No usable snapshot data, no report producible")]
    NoSnapshots,

    #[error("Invalid window '{label}': start must be before end")]
    InvalidWindow { label: String },

    #[error("Window '{label}' is empty: {reason}")]
    EmptyWindow { label: String, reason: String },

    #[error("Return undefined for {context}: base value is zero")]
    UndefinedReturn { context: String },
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors often contain full URLs; keep query strings out of logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

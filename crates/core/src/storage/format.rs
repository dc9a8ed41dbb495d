use crate::errors::CoreError;
use crate::models::snapshot::PriceSnapshot;

/// Encode a snapshot log as pretty-printed JSON.
///
/// Layout:
/// ```text
/// [
///   { "timestamp": "2024-01-15 10:30:00", "prices": { "AAPL": 185.2, "SPY": 472.1 } },
///   ...
/// ]
/// ```
pub fn encode_snapshots(snapshots: &[PriceSnapshot]) -> Result<Vec<u8>, CoreError> {
    serde_json::to_vec_pretty(snapshots)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize snapshots: {e}")))
}

/// Decode a snapshot log. Any malformed content is a `CorruptStore` error.
///
/// Empty or whitespace-only input decodes to an empty log. `null` prices are
/// read as unknown.
pub fn decode_snapshots(data: &[u8]) -> Result<Vec<PriceSnapshot>, CoreError> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    serde_json::from_slice(data)
        .map_err(|e| CoreError::CorruptStore(format!("Failed to parse snapshot log: {e}")))
}

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::diagnostic::Diagnostic;
use crate::models::snapshot::PriceSnapshot;

use super::format;

/// Append `snapshot` unless one with the same minute-truncated timestamp is
/// already present. Keeps the log sorted ascending. Returns whether it was added.
pub fn append_snapshot(snapshots: &mut Vec<PriceSnapshot>, snapshot: PriceSnapshot) -> bool {
    let key = snapshot.minute_key();
    if snapshots.iter().any(|s| s.minute_key() == key) {
        debug!(timestamp = %snapshot.timestamp, "Duplicate snapshot minute; append skipped");
        return false;
    }

    let pos = snapshots.partition_point(|s| s.timestamp <= snapshot.timestamp);
    snapshots.insert(pos, snapshot);
    true
}

/// Drop every entry whose minute-truncated timestamp matches an earlier one.
/// Expects `snapshots` sorted ascending; the first entry of each minute wins.
/// Returns the number dropped.
pub fn dedup_minutes(snapshots: &mut Vec<PriceSnapshot>) -> usize {
    let before = snapshots.len();
    snapshots.dedup_by_key(|s| s.minute_key());
    before - snapshots.len()
}

/// Sort ascending (stable, so equal timestamps keep their order) and keep
/// only the `cap` most recent entries. Returns the number dropped.
pub fn apply_retention(snapshots: &mut Vec<PriceSnapshot>, cap: usize) -> usize {
    snapshots.sort_by_key(|s| s.timestamp);
    let excess = snapshots.len().saturating_sub(cap);
    if excess > 0 {
        snapshots.drain(..excess);
    }
    excess
}

/// Snapshots read from the store, plus the reason if the file was unusable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedSnapshots {
    pub snapshots: Vec<PriceSnapshot>,
    pub corruption: Option<Diagnostic>,
}

/// Persistent snapshot log (JSON file), single writer per run.
///
/// Read once at the start of a run and overwritten once at the end. The
/// overwrite goes through a temporary file and a rename so readers never see
/// a partial write.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    retention_cap: usize,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>, retention_cap: usize) -> Self {
        Self {
            path: path.into(),
            retention_cap: retention_cap.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn retention_cap(&self) -> usize {
        self.retention_cap
    }

    /// Decode raw bytes into a sorted log; corruption yields an empty log and a diagnostic.
    pub fn load_from_bytes(data: &[u8]) -> LoadedSnapshots {
        match format::decode_snapshots(data) {
            Ok(mut snapshots) => {
                snapshots.sort_by_key(|s| s.timestamp);
                let merged = dedup_minutes(&mut snapshots);
                if merged > 0 {
                    warn!(merged, "Snapshot store held duplicate minutes; kept the first of each");
                }
                LoadedSnapshots {
                    snapshots,
                    corruption: None,
                }
            }
            Err(e) => {
                warn!("Snapshot store unreadable, starting from an empty series: {e}");
                LoadedSnapshots {
                    snapshots: Vec::new(),
                    corruption: Some(Diagnostic::CorruptStore {
                        cause: e.to_string(),
                    }),
                }
            }
        }
    }

    /// Sort, dedup and cap a log for writing.
    fn prepare(&self, snapshots: &[PriceSnapshot]) -> Vec<PriceSnapshot> {
        let mut trimmed = snapshots.to_vec();
        trimmed.sort_by_key(|s| s.timestamp);
        let merged = dedup_minutes(&mut trimmed);
        if merged > 0 {
            debug!(merged, "Duplicate snapshot minutes dropped");
        }
        let dropped = apply_retention(&mut trimmed, self.retention_cap);
        if dropped > 0 {
            debug!(dropped, cap = self.retention_cap, "Retention cap applied");
        }
        trimmed
    }

    /// Sort, dedup, cap and encode a log for writing.
    pub fn save_to_bytes(&self, snapshots: &[PriceSnapshot]) -> Result<Vec<u8>, CoreError> {
        format::encode_snapshots(&self.prepare(snapshots))
    }

    /// Read the log from disk. A missing file is an empty log; an unreadable
    /// or malformed one is treated as empty and reported as `CorruptStore`.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(&self) -> LoadedSnapshots {
        match std::fs::read(&self.path) {
            Ok(bytes) => {
                let loaded = Self::load_from_bytes(&bytes);
                debug!(path = %self.path.display(), snapshots = loaded.snapshots.len(), "Loaded snapshot store");
                loaded
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No snapshot store yet; starting empty");
                LoadedSnapshots::default()
            }
            Err(e) => {
                warn!(path = %self.path.display(), "Snapshot store unreadable, starting from an empty series: {e}");
                LoadedSnapshots {
                    snapshots: Vec::new(),
                    corruption: Some(Diagnostic::CorruptStore {
                        cause: CoreError::from(e).to_string(),
                    }),
                }
            }
        }
    }

    /// Atomically overwrite the log with the sorted, deduped, capped `snapshots`.
    /// Returns the number of entries written.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self, snapshots: &[PriceSnapshot]) -> Result<usize, CoreError> {
        let trimmed = self.prepare(snapshots);
        let bytes = format::encode_snapshots(&trimmed)?;
        let written = trimmed.len();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;

        info!(path = %self.path.display(), snapshots = written, "Saved snapshot store");
        Ok(written)
    }
}

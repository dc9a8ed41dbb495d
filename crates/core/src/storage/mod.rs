pub mod format;
pub mod manager;
pub mod snapshot_store;

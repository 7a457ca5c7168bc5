//! Persistence - binary world snapshots

pub mod snapshot;

pub use snapshot::{load_snapshot, save_snapshot, SnapshotInfo};

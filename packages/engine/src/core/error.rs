use std::time::Duration;

use thiserror::Error;

use crate::spatial::chunks::PhaseColor;

/// Errors surfaced by the engine's public API.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid world dimensions {width}x{height} (each side must be 1..=65535)")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("failed to allocate shared buffer `{buffer}` ({bytes} bytes)")]
    SharedMemoryAlloc { buffer: &'static str, bytes: usize },

    #[error("failed to spawn worker {worker_id}: {source}")]
    WorkerSpawn {
        worker_id: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("worker {worker_id} disconnected")]
    WorkerDisconnected { worker_id: usize },

    #[error("frame {frame} phase {color:?}: {pending} worker(s) silent after {timeout:?}")]
    WorkerStalled {
        frame: u64,
        color: PhaseColor,
        pending: usize,
        timeout: Duration,
    },

    #[error("invalid material bundle: {0}")]
    Bundle(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Malformed snapshot data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("snapshot too small ({len} bytes, minimum {min})")]
    TooShort { len: usize, min: usize },

    #[error("expected 'SAND' signature, found {found:?}")]
    BadMagic { found: [u8; 4] },

    #[error("snapshot version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u8, supported: u8 },

    #[error("snapshot truncated in {block} block at byte {offset}")]
    Truncated { block: &'static str, offset: usize },
}

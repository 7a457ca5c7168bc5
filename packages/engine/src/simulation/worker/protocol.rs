//! Messages between the coordinator and its workers.
//!
//! One `Init` per worker, then per frame four `Phase` commands, each answered
//! by exactly one `Done`. The `Done` round-trip is the only synchronization
//! between phases.

use std::sync::Arc;

use crate::core::shared_memory::SharedMemory;
use crate::domain::registry::MaterialRegistry;
use crate::spatial::chunks::{ChunkAssignment, ChunkBitmap, PhaseColor};

use super::SimulationConfig;

pub enum WorkerCommand {
    Init {
        width: u32,
        height: u32,
        worker_id: usize,
        assigned_chunks: Vec<ChunkAssignment>,
        shared: Arc<SharedMemory>,
        registry: Arc<MaterialRegistry>,
        config: SimulationConfig,
    },
    Phase {
        color: PhaseColor,
        frame: u64,
        /// First phase of the frame: also conduct heat and integrate off-grid particles.
        frame_start: bool,
        /// Active-this-frame bitmap; sent with the first phase only.
        active_snapshot: Option<Arc<ChunkBitmap>>,
        jitter_x: i32,
        jitter_y: i32,
    },
    /// Drop the off-grid pool after the world was cleared or reloaded. No reply.
    ResetParticles,
    Shutdown,
}

#[derive(Debug)]
pub enum WorkerReply {
    Done {
        worker_id: usize,
        frame: u64,
        color: PhaseColor,
        /// `[x, y, vx, vy, id, color]` records, only after a frame-start phase.
        particle_buffer: Option<Vec<f32>>,
        /// Live cell count as this worker saw it when it finished.
        particle_count: u32,
        cells_updated: u32,
    },
}

impl std::fmt::Debug for WorkerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerCommand::Init {
                width,
                height,
                worker_id,
                assigned_chunks,
                ..
            } => f
                .debug_struct("Init")
                .field("width", width)
                .field("height", height)
                .field("worker_id", worker_id)
                .field("assigned_chunks", &assigned_chunks.len())
                .finish_non_exhaustive(),
            WorkerCommand::Phase {
                color,
                frame,
                frame_start,
                ..
            } => f
                .debug_struct("Phase")
                .field("color", color)
                .field("frame", frame)
                .field("frame_start", frame_start)
                .finish_non_exhaustive(),
            WorkerCommand::ResetParticles => f.write_str("ResetParticles"),
            WorkerCommand::Shutdown => f.write_str("Shutdown"),
        }
    }
}

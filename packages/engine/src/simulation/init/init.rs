use std::sync::Arc;

use crate::core::constants::CHUNK_AREA;
use crate::core::rng::SimRng;
use crate::core::shared_memory::SharedMemory;
use crate::domain::registry::MaterialRegistry;
use crate::spatial::chunks::{ChunkAssignment, ChunkBitmap};
use crate::spatial::grid::Grid;
use crate::systems::offgrid::ParticlePool;

use super::SimulationConfig;
use super::WorkerCore;

/// Per-worker seed: the base seed offset by the worker id, plus one so no
/// worker shares the coordinator's stream.
pub(super) fn worker_seed(base: u64, worker_id: usize) -> u64 {
    base.wrapping_add(worker_id as u64 + 1)
}

pub(super) fn create_worker_core(
    worker_id: usize,
    shared: Arc<SharedMemory>,
    registry: Arc<MaterialRegistry>,
    chunks: Vec<ChunkAssignment>,
    config: &SimulationConfig,
) -> WorkerCore {
    let total_chunks = shared.layout().total_chunks();
    WorkerCore {
        worker_id,
        grid: Grid::new(shared),
        registry,
        chunks,
        active: Arc::new(ChunkBitmap::new(total_chunks)),
        rng: SimRng::seed_from(worker_seed(config.seed, worker_id)),
        pool: ParticlePool::with_capacity(256),
        scratch: Vec::with_capacity(CHUNK_AREA),
        gravity: config.gravity,
        terminal_velocity: config.terminal_velocity,
    }
}

use std::sync::Arc;

use crate::core::constants::{CHUNK_SIZE, PARTICLE_STRIDE};
use crate::core::rng::SimRng;
use crate::core::shared_memory::SharedMemory;
use crate::spatial::chunks::{wake_occupied_chunks, ChunkBitmap, PhaseColor};
use crate::spatial::grid::Grid;
use crate::systems::offgrid::{OffGridParticle, ParticlePool};

use super::PerfStats;

/// Everything decided on the driving thread before a frame's phases run.
pub(crate) struct FramePlan {
    pub(crate) frame: u64,
    pub(crate) order: [PhaseColor; 4],
    pub(crate) active: Arc<ChunkBitmap>,
    pub(crate) occupied: usize,
    /// Generated and sent to workers but not applied to iteration.
    pub(crate) jitter: (i32, i32),
}

/// Wake occupied chunks, snapshot the activity bitmap and draw the phase order.
pub(crate) fn prepare_frame(mem: &SharedMemory, rng: &mut SimRng, frame: u64) -> FramePlan {
    mem.retire_stamps(Grid::tag_for(frame));
    let occupied = wake_occupied_chunks(mem);

    let mut active = ChunkBitmap::new(mem.layout().total_chunks());
    mem.take_chunk_state(&mut active);

    let order = PhaseColor::shuffled(rng);
    let jitter = (rng.below(CHUNK_SIZE) as i32, rng.below(CHUNK_SIZE) as i32);

    FramePlan {
        frame,
        order,
        active: Arc::new(active),
        occupied,
        jitter,
    }
}

/// Result of one `advance_frame` / `step`.
#[derive(Clone, Debug, Default)]
pub struct FrameOutput {
    pub frame: u64,
    /// Off-grid particles after integration, `[x, y, vx, vy, id, color]` records
    /// from every worker back to back.
    pub particles: Vec<f32>,
    /// Live (non-empty) cells.
    pub particle_count: u32,
    pub cells_updated: u32,
    /// Chunks that were active this frame.
    pub active_chunks: usize,
    pub perf: Option<PerfStats>,
}

impl FrameOutput {
    /// Number of off-grid particles in `particles`.
    pub fn offgrid_count(&self) -> usize {
        self.particles.len() / PARTICLE_STRIDE
    }

    /// Decode `particles` back into typed records.
    pub fn offgrid_particles(&self) -> impl Iterator<Item = OffGridParticle> + '_ {
        ParticlePool::particles_from_buffer(&self.particles)
    }
}

//! Simulation - frame drivers over the shared grid
//!
//! `WorkerCore` is the per-thread engine: it owns a grid view, a fixed set of
//! chunks, an RNG stream and an off-grid particle pool, and runs one phase at
//! a time. Two drivers sit on top of it:
//!
//! - `Coordinator` runs one core per worker thread and steps them through the
//!   four checkerboard phases over channels.
//! - `World` runs a single core owning every chunk on the calling thread.
//!
//! Both prepare frames identically (occupancy scan, activity snapshot, phase
//! shuffle), so a one-worker coordinator and a world with the same seed
//! produce the same cells.

use std::sync::Arc;

use crate::core::rng::SimRng;
use crate::core::shared_memory::SharedMemory;
use crate::domain::registry::MaterialRegistry;
use crate::spatial::chunks::{ChunkAssignment, ChunkBitmap, PhaseColor};
use crate::spatial::grid::Grid;
use crate::systems::offgrid::{integrate_particles, IntegrateStats, ParticlePool};
use crate::systems::temperature::{conduct_chunks, ConductionStats};

#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "init/settings.rs"]
mod settings;
#[path = "init/init.rs"]
mod init;
#[path = "step/phase_runner.rs"]
mod phase_runner;
#[path = "step/frame.rs"]
mod frame;
#[path = "worker/protocol.rs"]
mod protocol;
#[path = "worker/thread.rs"]
mod worker_thread;
#[path = "commands/commands.rs"]
mod commands;
mod coordinator;
mod world;

pub use coordinator::Coordinator;
pub use frame::FrameOutput;
pub use perf_stats::PerfStats;
pub use protocol::{WorkerCommand, WorkerReply};
pub use settings::{SimulationConfig, MAX_WORKERS};
pub use world::World;

use perf_timer::PerfTimer;

/// What one worker did during a phase.
#[derive(Debug, Default)]
pub struct PhaseReport {
    pub cells_updated: u32,
    /// Off-grid pool contents after integration; frame-start phases only.
    pub particle_buffer: Option<Vec<f32>>,
    pub conduction: ConductionStats,
    pub offgrid: IntegrateStats,
}

/// Per-thread simulation state.
pub struct WorkerCore {
    worker_id: usize,
    grid: Grid,
    registry: Arc<MaterialRegistry>,
    chunks: Vec<ChunkAssignment>,
    /// Active-this-frame snapshot from the driver.
    active: Arc<ChunkBitmap>,
    rng: SimRng,
    pool: ParticlePool,
    /// Shuffled local cell order, reused across chunks.
    scratch: Vec<u16>,
    gravity: f32,
    terminal_velocity: f32,
}

impl WorkerCore {
    pub fn new(
        worker_id: usize,
        shared: Arc<SharedMemory>,
        registry: Arc<MaterialRegistry>,
        chunks: Vec<ChunkAssignment>,
        config: &SimulationConfig,
    ) -> Self {
        init::create_worker_core(worker_id, shared, registry, chunks, config)
    }

    pub fn worker_id(&self) -> usize { self.worker_id }

    pub fn grid(&self) -> &Grid { &self.grid }

    pub fn grid_mut(&mut self) -> &mut Grid { &mut self.grid }

    pub fn registry(&self) -> &Arc<MaterialRegistry> { &self.registry }

    pub fn chunks(&self) -> &[ChunkAssignment] { &self.chunks }

    pub fn pool(&self) -> &ParticlePool { &self.pool }

    pub fn set_active(&mut self, active: Arc<ChunkBitmap>) {
        self.active = active;
    }

    /// Drop in-flight off-grid particles and pending spawns.
    pub fn reset_particles(&mut self) {
        self.pool.clear();
        self.grid.take_queued();
    }

    /// Run the rules for `color`. The first phase of a frame also conducts
    /// heat and integrates the off-grid pool afterwards.
    pub fn run_phase(&mut self, color: PhaseColor, frame: u64, frame_start: bool) -> PhaseReport {
        self.grid.begin_frame(frame);
        let mut report = PhaseReport {
            cells_updated: phase_runner::run_rules(self, color, frame),
            ..PhaseReport::default()
        };

        if frame_start {
            report.conduction = conduct_chunks(&mut self.grid, &self.registry, &self.chunks, &self.active);
            report.offgrid = integrate_particles(&mut self.pool, &mut self.grid, &self.registry, &mut self.rng);
            report.particle_buffer = self.pool.to_buffer();
        }

        self.grid.end_frame();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::SLEEP_THRESHOLD;
    use crate::domain::materials::{MAT_SAND, MAT_STONE};
    use crate::spatial::chunks::assign_round_robin;
    use crate::systems::offgrid::OffGridParticle;

    fn core_for(width: u32, height: u32) -> WorkerCore {
        let shared = Arc::new(SharedMemory::new(width, height).unwrap());
        let chunks = assign_round_robin(shared.layout(), 1).remove(0);
        let config = SimulationConfig::with_size(width, height);
        WorkerCore::new(0, shared, Arc::new(MaterialRegistry::with_builtins()), chunks, &config)
    }

    fn activate_all(core: &mut WorkerCore) {
        let total = core.grid.shared().layout().total_chunks();
        core.set_active(Arc::new(ChunkBitmap::all(total)));
    }

    #[test]
    fn inactive_chunks_are_skipped() {
        let mut core = core_for(64, 64);
        core.grid_mut().set(10, 10, MAT_SAND);
        let report = core.run_phase(PhaseColor::Red, 1, false);
        assert_eq!(report.cells_updated, 0);
        assert_eq!(core.grid().get(10, 10), MAT_SAND);
    }

    #[test]
    fn only_chunks_of_the_phase_color_run() {
        let mut core = core_for(128, 64);
        activate_all(&mut core);
        // chunk (1, 0) is Blue
        core.grid_mut().set(70, 10, MAT_SAND);
        for frame in 1..=2 {
            assert_eq!(core.run_phase(PhaseColor::Red, frame, false).cells_updated, 0);
            assert_eq!(core.run_phase(PhaseColor::Blue, frame, false).cells_updated, 1);
        }
        // first update only builds speed
        assert_eq!(core.grid().get(70, 10), 0);
        assert_eq!(core.grid().get(70, 11), MAT_SAND);
    }

    #[test]
    fn moved_cell_is_not_updated_twice_in_a_frame() {
        let mut core = core_for(64, 64);
        activate_all(&mut core);
        core.grid_mut().set(5, 5, MAT_SAND);
        core.grid_mut().set_velocity(5, 5, 1.0);
        let report = core.run_phase(PhaseColor::Red, 1, false);
        assert_eq!(report.cells_updated, 1);
        // one step per unit of speed: 1.5 floors to a single row
        assert_eq!(core.grid().get(5, 6), MAT_SAND);
        assert_eq!(core.grid().particle_count(), 1);
    }

    #[test]
    fn resting_cells_fall_asleep() {
        let mut core = core_for(64, 64);
        activate_all(&mut core);
        core.grid_mut().set(5, 63, MAT_STONE);
        core.grid_mut().set(6, 63, MAT_SAND);
        let idx = core.grid().index_unchecked(6, 63);

        for frame in 1..=40 {
            core.run_phase(PhaseColor::Red, frame, false);
        }
        assert_eq!(core.grid().sleep_timer(idx), SLEEP_THRESHOLD);
        assert_eq!(core.run_phase(PhaseColor::Red, 41, false).cells_updated, 0);
    }

    #[test]
    fn frame_start_returns_the_particle_buffer() {
        let mut core = core_for(64, 64);
        activate_all(&mut core);
        let report = core.run_phase(PhaseColor::Red, 1, true);
        assert!(report.particle_buffer.is_none());

        core.grid_mut()
            .queue_particle(OffGridParticle::new(10.0, 10.0, 0.0, 0.0, MAT_SAND, 0));
        let report = core.run_phase(PhaseColor::Red, 2, true);
        assert_eq!(report.offgrid.spawned, 1);
        assert_eq!(report.particle_buffer.map(|b| b.len()), Some(6));
    }
}

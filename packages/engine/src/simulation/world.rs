use std::sync::Arc;

use crate::core::error::EngineError;
use crate::core::rng::SimRng;
use crate::core::shared_memory::SharedMemory;
use crate::domain::materials::MaterialId;
use crate::domain::registry::MaterialRegistry;
use crate::persistence::snapshot::{self, SnapshotInfo};
use crate::spatial::chunks::{assign_round_robin, ChunkBitmap};
use crate::spatial::grid::Grid;
use crate::systems::offgrid::ParticlePool;

use super::commands;
use super::frame::{prepare_frame, FrameOutput};
use super::{PerfStats, PerfTimer, SimulationConfig, WorkerCore};

/// Single-threaded driver: one core owns every chunk and runs the four phases
/// inline on the calling thread.
pub struct World {
    config: SimulationConfig,
    core: WorkerCore,
    rng: SimRng,
    frame: u64,
    active: Arc<ChunkBitmap>,
    perf: PerfStats,
}

impl World {
    pub fn new(config: SimulationConfig, registry: Arc<MaterialRegistry>) -> Result<Self, EngineError> {
        config.validate()?;
        let shared = Arc::new(SharedMemory::new(config.width, config.height)?);
        let total_chunks = shared.layout().total_chunks();
        let chunks = assign_round_robin(shared.layout(), 1)
            .into_iter()
            .next()
            .unwrap_or_default();
        let core = WorkerCore::new(0, shared, registry, chunks, &config);

        log::info!(
            "world {}x{}: {} chunks, single-threaded",
            config.width,
            config.height,
            total_chunks
        );

        Ok(Self {
            rng: SimRng::seed_from(config.seed),
            frame: 0,
            active: Arc::new(ChunkBitmap::new(total_chunks)),
            perf: PerfStats::default(),
            config,
            core,
        })
    }

    /// A world with the built-in materials and default settings.
    pub fn with_size(width: u32, height: u32) -> Result<Self, EngineError> {
        Self::new(
            SimulationConfig::with_size(width, height),
            Arc::new(MaterialRegistry::with_builtins()),
        )
    }

    pub fn width(&self) -> u32 { self.core.grid().width() }

    pub fn height(&self) -> u32 { self.core.grid().height() }

    pub fn frame(&self) -> u64 { self.frame }

    pub fn config(&self) -> &SimulationConfig { &self.config }

    pub fn grid(&self) -> &Grid { self.core.grid() }

    /// Edit access between steps.
    pub fn grid_mut(&mut self) -> &mut Grid { self.core.grid_mut() }

    pub fn shared(&self) -> &Arc<SharedMemory> { self.core.grid().shared() }

    pub fn registry(&self) -> &Arc<MaterialRegistry> { self.core.registry() }

    pub fn particle_count(&self) -> u32 { self.core.grid().particle_count() }

    /// Chunks that were active during the last step.
    pub fn active_chunks(&self) -> &ChunkBitmap { &self.active }

    pub fn offgrid_particles(&self) -> &ParticlePool { self.core.pool() }

    /// Last frame's timings; all zero while perf metrics are off.
    pub fn perf_stats(&self) -> &PerfStats { &self.perf }

    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.config.enable_perf_metrics = enabled;
        if !enabled {
            self.perf.reset();
        }
    }

    /// Advance one frame.
    pub fn step(&mut self) -> FrameOutput {
        let frame_timer = PerfTimer::start();
        self.frame += 1;

        let prepare_timer = PerfTimer::start();
        let plan = prepare_frame(self.core.grid().shared(), &mut self.rng, self.frame);
        let prepare_ms = prepare_timer.elapsed_ms();

        self.core.set_active(plan.active.clone());
        let mut out = FrameOutput {
            frame: plan.frame,
            active_chunks: plan.active.count(),
            ..FrameOutput::default()
        };

        let mut phase_ms = [0.0; 4];
        for (i, color) in plan.order.into_iter().enumerate() {
            let phase_timer = PerfTimer::start();
            let report = self.core.run_phase(color, plan.frame, i == 0);
            phase_ms[i] = phase_timer.elapsed_ms();

            out.cells_updated += report.cells_updated;
            if let Some(buffer) = report.particle_buffer {
                out.particles = buffer;
            }
            if i == 0 {
                log::trace!(
                    "frame {}: conducted {} cells, off-grid +{} / -{}",
                    plan.frame,
                    report.conduction.cells,
                    report.offgrid.spawned,
                    report.offgrid.removed
                );
            }
        }

        out.particle_count = self.particle_count();
        self.active = plan.active;

        if self.config.enable_perf_metrics {
            self.perf = PerfStats {
                frame_ms: frame_timer.elapsed_ms(),
                prepare_ms,
                phase_ms,
                cells_updated: out.cells_updated,
                active_chunks: out.active_chunks as u32,
                occupied_chunks: plan.occupied as u32,
                particle_count: out.particle_count,
                offgrid_particles: out.offgrid_count() as u32,
            };
            out.perf = Some(self.perf.clone());
        }
        out
    }

    /// Put `id` into an empty cell.
    pub fn place(&mut self, x: i32, y: i32, id: MaterialId) -> bool {
        let registry = self.core.registry().clone();
        commands::place_cell(self.core.grid_mut(), &registry, x, y, id)
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, id: MaterialId) -> usize {
        let registry = self.core.registry().clone();
        commands::fill_rect(self.core.grid_mut(), &registry, x, y, width, height, id)
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, id: MaterialId) -> usize {
        let registry = self.core.registry().clone();
        commands::fill_circle(self.core.grid_mut(), &registry, cx, cy, radius, id)
    }

    /// Empty the world, including in-flight off-grid particles.
    pub fn clear(&mut self) {
        self.core.grid_mut().clear();
        self.core.reset_particles();
    }

    pub fn save_snapshot(&self) -> Vec<u8> {
        snapshot::save_snapshot(self.core.grid())
    }

    pub fn load_snapshot(&mut self, data: &[u8]) -> Result<SnapshotInfo, EngineError> {
        let registry = self.core.registry().clone();
        let info = snapshot::load_snapshot(self.core.grid_mut(), &registry, data)?;
        self.core.reset_particles();
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::materials::{MAT_SAND, MAT_STONE};

    #[test]
    fn sand_falls_to_the_floor_and_sleeps() {
        let mut world = World::with_size(64, 64).unwrap();
        world.place(10, 0, MAT_SAND);
        for _ in 0..60 {
            world.step();
        }
        assert_eq!(world.grid().get(10, 63), MAT_SAND);
        assert_eq!(world.particle_count(), 1);

        // resting and asleep: the chunk stays active (occupied) but nothing updates
        let out = world.step();
        assert_eq!(out.active_chunks, 1);
        assert_eq!(out.cells_updated, 0);
    }

    #[test]
    fn empty_world_does_no_work() {
        let mut world = World::with_size(128, 128).unwrap();
        let out = world.step();
        assert_eq!(out.frame, 1);
        assert_eq!(out.active_chunks, 0);
        assert_eq!(out.cells_updated, 0);
        assert!(out.perf.is_none());
    }

    #[test]
    fn perf_metrics_fill_in_when_enabled() {
        let mut world = World::with_size(64, 64).unwrap();
        world.enable_perf_metrics(true);
        world.fill_rect(0, 60, 64, 4, MAT_STONE);
        let out = world.step();
        let perf = out.perf.unwrap();
        assert_eq!(perf.particle_count, 256);
        assert_eq!(perf.active_chunks, 1);
        assert!(perf.frame_ms >= perf.slowest_phase_ms());
    }

    #[test]
    fn snapshot_round_trip_through_world() {
        let mut world = World::with_size(64, 64).unwrap();
        world.fill_circle(32, 32, 5, MAT_SAND);
        let bytes = world.save_snapshot();

        let mut other = World::with_size(64, 64).unwrap();
        let info = other.load_snapshot(&bytes).unwrap();
        assert_eq!(info.particles, world.particle_count());
        assert_eq!(other.shared().cells_to_vec(), world.shared().cells_to_vec());
    }

    #[test]
    fn clear_empties_everything() {
        let mut world = World::with_size(64, 64).unwrap();
        world.fill_rect(0, 0, 64, 64, MAT_SAND);
        world.clear();
        assert_eq!(world.particle_count(), 0);
        assert_eq!(world.shared().count_non_empty(), 0);
    }
}

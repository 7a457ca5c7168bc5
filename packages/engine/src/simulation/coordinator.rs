use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::error::EngineError;
use crate::core::rng::SimRng;
use crate::core::shared_memory::SharedMemory;
use crate::domain::materials::MaterialId;
use crate::domain::registry::MaterialRegistry;
use crate::persistence::snapshot::{self, SnapshotInfo};
use crate::spatial::chunks::{assign_round_robin, ChunkBitmap, PhaseColor};
use crate::spatial::grid::Grid;

use super::commands;
use super::frame::{prepare_frame, FrameOutput};
use super::protocol::{WorkerCommand, WorkerReply};
use super::worker_thread::{spawn_worker, WorkerHandle};
use super::{PerfStats, PerfTimer, SimulationConfig};

/// How often a blocked phase wait checks for dead workers.
const LIVENESS_POLL: Duration = Duration::from_millis(50);

/// Replies gathered for one phase.
#[derive(Default)]
struct PhaseTally {
    cells_updated: u32,
    particles: Vec<f32>,
}

/// Multi-threaded driver. Owns the worker pool and steps it through each
/// frame's four phases; `advance_frame` returns once all of them finished.
pub struct Coordinator {
    config: SimulationConfig,
    /// The coordinator's own view, for edits and reads between frames.
    grid: Grid,
    registry: Arc<MaterialRegistry>,
    workers: Vec<WorkerHandle>,
    replies: Receiver<WorkerReply>,
    rng: SimRng,
    frame: u64,
    active: Arc<ChunkBitmap>,
    perf: PerfStats,
    /// Set once a worker died or stalled; every later frame fails with it.
    halted: Option<usize>,
    stalled: bool,
}

impl Coordinator {
    /// Allocate shared memory, spawn the workers and hand each its chunks.
    pub fn new(config: SimulationConfig, registry: Arc<MaterialRegistry>) -> Result<Self, EngineError> {
        config.validate()?;
        let shared = Arc::new(SharedMemory::new(config.width, config.height)?);
        let worker_count = config.resolved_workers();
        let assignments = assign_round_robin(shared.layout(), worker_count);

        let (reply_tx, replies) = mpsc::channel();
        let mut workers = Vec::with_capacity(worker_count);
        for (worker_id, assigned_chunks) in assignments.into_iter().enumerate() {
            let handle = spawn_worker(worker_id, reply_tx.clone())?;
            handle.send(WorkerCommand::Init {
                width: config.width,
                height: config.height,
                worker_id,
                assigned_chunks,
                shared: Arc::clone(&shared),
                registry: Arc::clone(&registry),
                config: config.clone(),
            })?;
            workers.push(handle);
        }
        // only workers hold senders now, so a fully dead pool disconnects the channel
        drop(reply_tx);

        log::info!(
            "coordinator {}x{}: {} chunks over {} workers",
            config.width,
            config.height,
            shared.layout().total_chunks(),
            worker_count
        );

        Ok(Self {
            grid: Grid::new(Arc::clone(&shared)),
            active: Arc::new(ChunkBitmap::new(shared.layout().total_chunks())),
            rng: SimRng::seed_from(config.seed),
            frame: 0,
            perf: PerfStats::default(),
            halted: None,
            stalled: false,
            registry,
            workers,
            replies,
            config,
        })
    }

    pub fn width(&self) -> u32 { self.grid.width() }

    pub fn height(&self) -> u32 { self.grid.height() }

    pub fn frame(&self) -> u64 { self.frame }

    pub fn worker_count(&self) -> usize { self.workers.len() }

    pub fn config(&self) -> &SimulationConfig { &self.config }

    pub fn grid(&self) -> &Grid { &self.grid }

    /// Edit access between frames.
    pub fn grid_mut(&mut self) -> &mut Grid { &mut self.grid }

    pub fn shared(&self) -> &Arc<SharedMemory> { self.grid.shared() }

    pub fn registry(&self) -> &Arc<MaterialRegistry> { &self.registry }

    pub fn particle_count(&self) -> u32 { self.grid.particle_count() }

    /// Chunks that were active during the last frame.
    pub fn active_chunks(&self) -> &ChunkBitmap { &self.active }

    pub fn perf_stats(&self) -> &PerfStats { &self.perf }

    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.config.enable_perf_metrics = enabled;
        if !enabled {
            self.perf.reset();
        }
    }

    /// Run one frame: prepare, then the four phases in shuffled order.
    pub fn advance_frame(&mut self) -> Result<FrameOutput, EngineError> {
        if let Some(worker_id) = self.halted {
            return Err(EngineError::WorkerDisconnected { worker_id });
        }
        let frame_timer = PerfTimer::start();
        self.frame += 1;

        let prepare_timer = PerfTimer::start();
        let plan = prepare_frame(self.grid.shared(), &mut self.rng, self.frame);
        let prepare_ms = prepare_timer.elapsed_ms();

        let mut out = FrameOutput {
            frame: plan.frame,
            active_chunks: plan.active.count(),
            ..FrameOutput::default()
        };

        let mut phase_ms = [0.0; 4];
        for (i, color) in plan.order.into_iter().enumerate() {
            let frame_start = i == 0;
            let phase_timer = PerfTimer::start();
            for worker in &self.workers {
                let sent = worker.send(WorkerCommand::Phase {
                    color,
                    frame: plan.frame,
                    frame_start,
                    active_snapshot: frame_start.then(|| Arc::clone(&plan.active)),
                    jitter_x: plan.jitter.0,
                    jitter_y: plan.jitter.1,
                });
                if let Err(e) = sent {
                    self.halted = Some(worker.id);
                    return Err(e);
                }
            }

            let tally = self.await_phase(plan.frame, color)?;
            phase_ms[i] = phase_timer.elapsed_ms();
            out.cells_updated += tally.cells_updated;
            out.particles.extend_from_slice(&tally.particles);
        }

        out.particle_count = self.grid.particle_count();
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
        Ok(out)
    }

    /// Block until every worker reported `Done` for `(frame, color)`.
    fn await_phase(&mut self, frame: u64, color: PhaseColor) -> Result<PhaseTally, EngineError> {
        let mut pending = vec![true; self.workers.len()];
        let mut remaining = self.workers.len();
        let mut tally = PhaseTally::default();

        let timeout = self.config.phase_timeout_ms.map(Duration::from_millis);
        let deadline = timeout.map(|t| Instant::now() + t);

        while remaining > 0 {
            let wait = match deadline {
                Some(d) => d.saturating_duration_since(Instant::now()).min(LIVENESS_POLL),
                None => LIVENESS_POLL,
            };
            match self.replies.recv_timeout(wait) {
                Ok(WorkerReply::Done {
                    worker_id,
                    frame: reply_frame,
                    color: reply_color,
                    particle_buffer,
                    cells_updated,
                    ..
                }) => {
                    if reply_frame != frame || reply_color != color || !pending.get(worker_id).copied().unwrap_or(false) {
                        log::debug!(
                            "discarding stale reply from worker {worker_id} (frame {reply_frame} {reply_color:?})"
                        );
                        continue;
                    }
                    pending[worker_id] = false;
                    remaining -= 1;
                    tally.cells_updated += cells_updated;
                    if let Some(buffer) = particle_buffer {
                        tally.particles.extend_from_slice(&buffer);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(worker_id) = self.first_dead(&pending) {
                        log::error!("worker {worker_id} died during frame {frame} {color:?}");
                        self.halted = Some(worker_id);
                        return Err(EngineError::WorkerDisconnected { worker_id });
                    }
                    if let (Some(d), Some(timeout)) = (deadline, timeout) {
                        if Instant::now() >= d {
                            let worker_id = pending.iter().position(|&p| p).unwrap_or(0);
                            log::error!(
                                "frame {frame} {color:?}: {remaining} worker(s) silent after {timeout:?}"
                            );
                            self.halted = Some(worker_id);
                            self.stalled = true;
                            return Err(EngineError::WorkerStalled {
                                frame,
                                color,
                                pending: remaining,
                                timeout,
                            });
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    let worker_id = pending.iter().position(|&p| p).unwrap_or(0);
                    self.halted = Some(worker_id);
                    return Err(EngineError::WorkerDisconnected { worker_id });
                }
            }
        }
        Ok(tally)
    }

    fn first_dead(&self, pending: &[bool]) -> Option<usize> {
        self.workers
            .iter()
            .find(|w| pending[w.id] && w.is_dead())
            .map(|w| w.id)
    }

    /// Put `id` into an empty cell.
    pub fn place(&mut self, x: i32, y: i32, id: MaterialId) -> bool {
        commands::place_cell(&mut self.grid, &self.registry, x, y, id)
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, id: MaterialId) -> usize {
        commands::fill_rect(&mut self.grid, &self.registry, x, y, width, height, id)
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, id: MaterialId) -> usize {
        commands::fill_circle(&mut self.grid, &self.registry, cx, cy, radius, id)
    }

    /// Empty the world and every worker's off-grid pool.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.reset_worker_particles();
    }

    pub fn save_snapshot(&self) -> Vec<u8> {
        snapshot::save_snapshot(&self.grid)
    }

    pub fn load_snapshot(&mut self, data: &[u8]) -> Result<SnapshotInfo, EngineError> {
        let info = snapshot::load_snapshot(&mut self.grid, &self.registry, data)?;
        self.reset_worker_particles();
        Ok(info)
    }

    fn reset_worker_particles(&self) {
        for worker in &self.workers {
            // a dead worker surfaces on the next frame
            let _ = worker.send(WorkerCommand::ResetParticles);
        }
    }

    /// Stop and join every worker.
    pub fn shutdown(mut self) {
        self.stop_workers();
    }

    fn stop_workers(&mut self) {
        for worker in &self.workers {
            let _ = worker.send(WorkerCommand::Shutdown);
        }
        for worker in &mut self.workers {
            let Some(thread) = worker.thread.take() else {
                continue;
            };
            // a stalled worker may never read its Shutdown
            if self.stalled && !thread.is_finished() {
                log::warn!("leaving stalled worker {} detached", worker.id);
                continue;
            }
            if thread.join().is_err() {
                log::error!("worker {} panicked", worker.id);
            }
        }
        if !self.workers.is_empty() {
            log::debug!("coordinator: {} workers stopped", self.workers.len());
        }
        self.workers.clear();
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop_workers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::materials::{MAT_SAND, MAT_STONE};

    fn coordinator(width: u32, height: u32, workers: usize) -> Coordinator {
        let config = SimulationConfig {
            workers,
            phase_timeout_ms: Some(5_000),
            ..SimulationConfig::with_size(width, height)
        };
        Coordinator::new(config, Arc::new(MaterialRegistry::with_builtins())).unwrap()
    }

    #[test]
    fn spawns_requested_workers_and_shuts_down() {
        let c = coordinator(256, 128, 3);
        assert_eq!(c.worker_count(), 3);
        c.shutdown();
    }

    #[test]
    fn frames_count_up_and_conserve_inert_matter() {
        let mut c = coordinator(256, 256, 4);
        c.fill_rect(0, 250, 256, 6, MAT_STONE);
        c.fill_rect(40, 10, 100, 20, MAT_SAND);
        let before = c.particle_count();
        for expected in 1..=30 {
            let out = c.advance_frame().unwrap();
            assert_eq!(out.frame, expected);
            assert_eq!(out.particle_count, before);
        }
        assert_eq!(c.shared().count_non_empty() as u32, before);
    }

    #[test]
    fn more_workers_than_chunks_still_steps() {
        let mut c = coordinator(64, 64, 4);
        c.place(5, 5, MAT_SAND);
        for _ in 0..5 {
            c.advance_frame().unwrap();
        }
        assert_eq!(c.particle_count(), 1);
    }

    #[test]
    fn invalid_config_is_rejected_before_spawning() {
        let config = SimulationConfig {
            workers: 1000,
            ..SimulationConfig::with_size(64, 64)
        };
        let err = Coordinator::new(config, Arc::new(MaterialRegistry::with_builtins()));
        assert!(matches!(err, Err(EngineError::Config(_))));
    }
}

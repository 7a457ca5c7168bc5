use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::core::error::EngineError;

use super::protocol::{WorkerCommand, WorkerReply};
use super::WorkerCore;

/// Coordinator-side end of one worker thread.
pub(super) struct WorkerHandle {
    pub(super) id: usize,
    pub(super) commands: Sender<WorkerCommand>,
    pub(super) thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// True once the thread has exited (shutdown, panic or a closed channel).
    pub(super) fn is_dead(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    pub(super) fn send(&self, command: WorkerCommand) -> Result<(), EngineError> {
        self.commands
            .send(command)
            .map_err(|_| EngineError::WorkerDisconnected { worker_id: self.id })
    }
}

pub(super) fn spawn_worker(id: usize, replies: Sender<WorkerReply>) -> Result<WorkerHandle, EngineError> {
    let (commands, inbox) = mpsc::channel();
    let thread = thread::Builder::new()
        .name(format!("sandy-worker-{id}"))
        .spawn(move || worker_main(id, inbox, replies))
        .map_err(|source| EngineError::WorkerSpawn { worker_id: id, source })?;

    Ok(WorkerHandle {
        id,
        commands,
        thread: Some(thread),
    })
}

fn worker_main(id: usize, inbox: Receiver<WorkerCommand>, replies: Sender<WorkerReply>) {
    let mut core: Option<WorkerCore> = None;

    while let Ok(command) = inbox.recv() {
        match command {
            WorkerCommand::Init {
                width,
                height,
                worker_id,
                assigned_chunks,
                shared,
                registry,
                config,
            } => {
                if shared.width() != width || shared.height() != height {
                    log::error!(
                        "worker {worker_id}: init for {width}x{height} but shared memory is {}x{}",
                        shared.width(),
                        shared.height()
                    );
                    return;
                }
                log::debug!("worker {worker_id}: {} chunks assigned", assigned_chunks.len());
                core = Some(WorkerCore::new(worker_id, shared, registry, assigned_chunks, &config));
            }
            WorkerCommand::Phase {
                color,
                frame,
                frame_start,
                active_snapshot,
                jitter_x,
                jitter_y,
            } => {
                let Some(core) = core.as_mut() else {
                    log::error!("worker {id}: phase command before init");
                    return;
                };
                if let Some(active) = active_snapshot {
                    core.set_active(active);
                }
                log::trace!("worker {id}: frame {frame} {color:?} jitter ({jitter_x}, {jitter_y})");

                let report = core.run_phase(color, frame, frame_start);
                let reply = WorkerReply::Done {
                    worker_id: id,
                    frame,
                    color,
                    particle_buffer: report.particle_buffer,
                    particle_count: core.grid().particle_count(),
                    cells_updated: report.cells_updated,
                };
                if replies.send(reply).is_err() {
                    // coordinator is gone
                    break;
                }
            }
            WorkerCommand::ResetParticles => {
                if let Some(core) = core.as_mut() {
                    core.reset_particles();
                }
            }
            WorkerCommand::Shutdown => break,
        }
    }
    log::debug!("worker {id}: exiting");
}

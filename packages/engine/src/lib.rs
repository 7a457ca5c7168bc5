//! Sandy Engine - multi-threaded falling-sand simulation
//!
//! Layout:
//! - core/        - constants, errors, shared atomic buffers, RNG
//! - spatial/     - chunk layout, activity bitmaps, per-thread grid views
//! - domain/      - material ids, descriptors and the registry
//! - systems/     - material rules, heat conduction, off-grid particles
//! - simulation/  - worker cores, the threaded coordinator and the inline world
//! - persistence/ - "SAND" snapshots

pub mod core;
pub mod spatial;
pub mod domain;
pub mod systems;
pub mod simulation;
pub mod persistence;

pub use spatial::chunks;
pub use spatial::grid;
pub use systems::behaviors;

pub use crate::core::error::{EngineError, SnapshotError};
pub use crate::core::shared_memory::SharedMemory;
pub use domain::materials::{MaterialId, MaterialKind};
pub use domain::registry::MaterialRegistry;
pub use persistence::SnapshotInfo;
pub use simulation::{Coordinator, FrameOutput, PerfStats, SimulationConfig, World, WorkerCore};

/// Engine version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

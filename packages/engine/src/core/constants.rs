//! Engine-wide constants

/// Chunk edge length in cells. Unit of activity tracking and worker assignment.
pub const CHUNK_SIZE: u32 = 64;

/// Cells per chunk.
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Largest distance (in cells) any single cell update may read or write away
/// from the updated cell. Two chunks running in the same phase are separated
/// by a full chunk, so reach from both sides must stay below half of it.
pub const MAX_EFFECT_REACH: u32 = CHUNK_SIZE / 2 - 1;

/// Default temperature of a fresh cell.
pub const DEFAULT_TEMPERATURE: f32 = 20.0;

/// Consecutive "did not move" updates before a sleep-capable cell is skipped.
pub const SLEEP_THRESHOLD: u8 = 30;

/// Temperature delta during conduction that force-wakes a cell.
pub const TEMP_WAKE_THRESHOLD: f32 = 5.0;

/// Default gravity added to the velocity slot of falling cells every update.
pub const DEFAULT_GRAVITY: f32 = 0.5;

/// Default clamp for the velocity slot of falling cells.
pub const DEFAULT_TERMINAL_VELOCITY: f32 = 8.0;

/// Worker count used when the platform cannot report its parallelism.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Floats per off-grid particle in transfer buffers: x, y, vx, vy, id, color.
pub const PARTICLE_STRIDE: usize = 6;

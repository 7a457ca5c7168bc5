//! Core - constants, error types, shared buffers and randomness
//!
//! Everything in here is below the grid: no module in `core` knows about
//! materials or scheduling.

pub mod constants;
pub mod error;
pub mod rng;
pub mod shared_memory;

pub use constants::*;
pub use error::{EngineError, SnapshotError};
pub use rng::SimRng;
pub use shared_memory::SharedMemory;

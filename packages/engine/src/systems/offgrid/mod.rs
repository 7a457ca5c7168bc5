//! Off-grid particles - ballistic debris flying above the cell grid
//!
//! Explosions and fireworks lift cells out of the grid; they fly under
//! gravity and drag until they leave the world or hit matter, at which point
//! they re-enter the grid as ordinary cells.

mod integrate;
mod pool;

pub use integrate::{integrate_particles, IntegrateStats};
pub use pool::{OffGridParticle, ParticlePool};

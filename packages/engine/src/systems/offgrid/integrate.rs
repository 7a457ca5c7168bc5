use crate::core::rng::SimRng;
use crate::domain::registry::MaterialRegistry;
use crate::spatial::grid::{Grid, BOUNDARY_ID};

use super::pool::{OffGridParticle, ParticlePool};

const GRAVITY: f32 = 0.2;
const DRAG: f32 = 0.99;
/// Impact speed above which hitting a liquid throws up a droplet.
const SPLASH_SPEED: f32 = 3.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IntegrateStats {
    pub spawned: u32,
    pub reentered: u32,
    pub removed: u32,
    pub splashes: u32,
}

/// Advance every particle by one frame.
///
/// Spawns queued on `grid` by this frame's rules are ingested first. Runs
/// concurrently on all workers; re-entry goes through `Grid::claim` so two
/// workers never land particles in the same cell.
pub fn integrate_particles(
    pool: &mut ParticlePool,
    grid: &mut Grid,
    registry: &MaterialRegistry,
    rng: &mut SimRng,
) -> IntegrateStats {
    let mut stats = IntegrateStats::default();

    let queued = grid.take_queued();
    stats.spawned = queued.len() as u32;
    pool.extend(queued);

    let (w, h) = (grid.width() as f32, grid.height() as f32);

    // reverse order: swap-remove only pulls in already-processed particles
    for i in (0..pool.len()).rev() {
        let Some(p) = pool.get(i) else { continue };

        let vx = p.vx * DRAG;
        let vy = (p.vy + GRAVITY) * DRAG;
        let (nx, ny) = (p.x + vx, p.y + vy);

        if !nx.is_finite() || !ny.is_finite() || nx < 0.0 || nx >= w || ny < 0.0 || ny >= h {
            pool.swap_remove(i);
            stats.removed += 1;
            continue;
        }

        let (ix, iy) = (nx.floor() as i32, ny.floor() as i32);
        let (px, py) = (p.x.floor() as i32, p.y.floor() as i32);
        let hit = grid.get(ix, iy);

        if hit == 0 || hit == BOUNDARY_ID {
            pool.set_motion(i, nx, ny, vx, vy);
            continue;
        }

        if registry.is_gas(hit) {
            // push the gas behind us and keep flying
            if grid.claim(px, py, hit) {
                grid.set(ix, iy, 0);
            }
            pool.set_motion(i, nx, ny, vx, vy);
            continue;
        }

        if grid.claim(px, py, p.id) {
            grid.set_velocity(px, py, vy);
            stats.reentered += 1;

            let speed = (vx * vx + vy * vy).sqrt();
            if registry.is_liquid(hit) && speed > SPLASH_SPEED {
                grid.set(ix, iy, 0);
                pool.push(OffGridParticle::new(
                    ix as f32,
                    iy as f32,
                    (rng.next_f32() - 0.5) * 4.0,
                    -2.0 - rng.next_f32() * 4.0,
                    hit,
                    registry.color(hit),
                ));
                stats.splashes += 1;
            }
        }
        pool.swap_remove(i);
        stats.removed += 1;
    }

    stats
}

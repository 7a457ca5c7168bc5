//! Explosion - destructive disc plus a shockwave ring that throws debris off-grid.

use super::UpdateContext;
use crate::core::constants::MAX_EFFECT_REACH;
use crate::domain::materials::{
    MaterialId, MAT_BOUNDARY, MAT_C4, MAT_DUST, MAT_FIRE, MAT_GUNPOWDER, MAT_SMOKE, MAT_STONE,
};
use crate::systems::offgrid::OffGridParticle;

/// Largest blast radius any rule may request (C4).
pub const MAX_EXPLOSION_RADIUS: i32 = 12;

/// Shockwave ring extends to `radius * SHOCKWAVE_FACTOR`.
pub const SHOCKWAVE_FACTOR: f32 = 1.6;

/// Integer ceiling of `MAX_EXPLOSION_RADIUS * SHOCKWAVE_FACTOR` (x8/5).
const MAX_SHOCKWAVE_REACH: i32 = (MAX_EXPLOSION_RADIUS * 8 + 4) / 5;

const _: () = assert!(MAX_SHOCKWAVE_REACH < MAX_EFFECT_REACH as i32);

/// Fraction of the radius beyond which destroyed cells turn to smoke.
const SMOKE_RING: f32 = 0.7;

/// Upward kick added to every thrown particle, in cells/frame.
const UPWARD_BIAS: f32 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Blast {
    pub radius: i32,
    /// Peak debris speed at the inner edge of the shockwave ring.
    pub strength: f32,
}

impl Blast {
    pub fn new(radius: i32, strength: f32) -> Self {
        Self {
            radius: radius.clamp(1, MAX_EXPLOSION_RADIUS),
            strength,
        }
    }
}

#[inline]
fn is_explosive(id: MaterialId) -> bool {
    matches!(id, MAT_GUNPOWDER | MAT_C4 | MAT_DUST)
}

/// Detonate at `(cx, cy)`.
///
/// Explosives inside the disc become fire and go off on a later update, so
/// chains propagate one hop per frame instead of recursing.
pub fn explode(ctx: &mut UpdateContext, cx: i32, cy: i32, blast: Blast) {
    let r = blast.radius;
    let rf = r as f32;

    for dy in -r..=r {
        for dx in -r..=r {
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            if dist > rf {
                continue;
            }
            let (nx, ny) = (cx + dx, cy + dy);
            let id = ctx.grid.get(nx, ny);
            if id == MAT_BOUNDARY || id == MAT_STONE {
                continue;
            }
            if !ctx.rng.chance(1.0 - (dist / rf) * 0.5) {
                continue;
            }
            if is_explosive(id) {
                ctx.grid.set(nx, ny, MAT_FIRE);
            } else if dist > rf * SMOKE_RING {
                ctx.grid.set(nx, ny, MAT_SMOKE);
            } else if id != 0 {
                ctx.grid.set(nx, ny, 0);
            }
        }
    }

    shockwave(ctx, cx, cy, blast);
}

fn shockwave(ctx: &mut UpdateContext, cx: i32, cy: i32, blast: Blast) {
    let rf = blast.radius as f32;
    let shock_r = rf * SHOCKWAVE_FACTOR;
    let reach = shock_r.ceil() as i32;

    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            if dist <= rf || dist > shock_r {
                continue;
            }
            let (nx, ny) = (cx + dx, cy + dy);
            let id = ctx.grid.get(nx, ny);
            if id == MAT_BOUNDARY || !ctx.registry.is_movable(id) {
                continue;
            }
            let force = blast.strength * (1.0 - dist / shock_r);
            let vx = dx as f32 / dist * force;
            let vy = dy as f32 / dist * force - UPWARD_BIAS;
            let color = ctx.registry.color(id);
            ctx.grid
                .queue_particle(OffGridParticle::new(nx as f32, ny as f32, vx, vy, id, color));
            ctx.grid.set(nx, ny, 0);
        }
    }
}

//! Powder - sand, coal, gunpowder
//!
//! Velocity-driven fall: the velocity slot accumulates gravity up to the
//! terminal speed and the grain attempts `floor(v)` single-row steps per update.
//! Blocked grains roll to a random diagonal; gas is swapped through and
//! lighter liquids are sunk through (slowing the grain down).

use super::explosion::{explode, Blast};
use super::UpdateContext;
use crate::domain::materials::{MAT_EMBER, MAT_FIRE};

const SINK_WOBBLE_CHANCE: f32 = 0.4;
const LIQUID_DRAG: f32 = 0.9;
const DIAGONAL_LIQUID_DRAG: f32 = 0.5;

pub(super) fn update_sand(ctx: &mut UpdateContext) -> bool {
    fall(ctx)
}

pub(super) fn update_coal(ctx: &mut UpdateContext) -> bool {
    if ctx.temp() > 250.0 && ctx.chance(0.05) {
        ctx.replace_self(MAT_EMBER);
        ctx.grid.set_velocity(ctx.x, ctx.y, 0.8);
        return true;
    }
    fall(ctx)
}

pub(super) fn update_gunpowder(ctx: &mut UpdateContext) -> bool {
    if ctx.find_cardinal(|id| id == MAT_FIRE).is_some() {
        let (x, y) = (ctx.x, ctx.y);
        let radius = 5 + ctx.rng.below(3) as i32;
        explode(ctx, x, y, Blast::new(radius, 6.0));
        return true;
    }
    fall(ctx)
}

/// Shared powder motion. Returns true if the grain moved.
pub(super) fn fall(ctx: &mut UpdateContext) -> bool {
    let reg = ctx.registry;
    let id = ctx.grid.get(ctx.x, ctx.y);
    let my_density = reg.density(id);
    let sinks_into = |other: u8| reg.is_liquid(other) && reg.density(other) < my_density;

    let mut velocity = (ctx.grid.get_velocity(ctx.x, ctx.y) + ctx.gravity).min(ctx.terminal_velocity);
    let steps = velocity.floor() as i32;

    let mut moved = false;
    let (mut cx, mut cy) = (ctx.x, ctx.y);

    for _ in 0..steps {
        let ny = cy + 1;
        let below = ctx.grid.get(cx, ny);

        if below == 0 {
            ctx.grid.move_cell(cx, cy, cx, ny);
            cy = ny;
            moved = true;
        } else if reg.is_gas(below) {
            ctx.grid.swap(cx, cy, cx, ny);
            cy = ny;
            moved = true;
        } else if sinks_into(below) {
            let mut wobbled = false;
            if ctx.rng.chance(SINK_WOBBLE_CHANCE) {
                let dir = ctx.rng.sign();
                if sinks_into(ctx.grid.get(cx + dir, ny)) {
                    ctx.grid.swap(cx, cy, cx + dir, ny);
                    cx += dir;
                    wobbled = true;
                }
            }
            if !wobbled {
                ctx.grid.swap(cx, cy, cx, ny);
            }
            cy = ny;
            moved = true;
            velocity *= LIQUID_DRAG;
        } else {
            let dir = ctx.rng.sign();
            let mut rolled = false;
            for side in [dir, -dir] {
                let target = ctx.grid.get(cx + side, ny);
                if target == 0 {
                    ctx.grid.move_cell(cx, cy, cx + side, ny);
                } else if reg.is_gas(target) {
                    ctx.grid.swap(cx, cy, cx + side, ny);
                } else if sinks_into(target) {
                    ctx.grid.swap(cx, cy, cx + side, ny);
                    velocity *= DIAGONAL_LIQUID_DRAG;
                } else {
                    continue;
                }
                cx += side;
                cy = ny;
                rolled = true;
                break;
            }
            if !rolled {
                ctx.grid.set_velocity(cx, cy, 0.0);
                return moved;
            }
            moved = true;
        }
    }

    ctx.grid.set_velocity(cx, cy, velocity);
    moved
}

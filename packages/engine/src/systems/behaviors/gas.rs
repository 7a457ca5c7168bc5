//! Gas - steam, smoke, hot smoke, gas, cryo, dust, plasma
//!
//! Gases rise with a random sideways drift and dissipate at a fixed per-update
//! rate. Most only move on a fraction of updates so clouds linger.

use super::explosion::{explode, Blast};
use super::{UpdateContext, CARDINAL};
use crate::domain::materials::{
    MAT_BLACK_HOLE, MAT_BOUNDARY, MAT_CRYO, MAT_EMBER, MAT_FIRE, MAT_GAS, MAT_ICE, MAT_LAVA,
    MAT_MAGMA_ROCK, MAT_PLASMA, MAT_SMOKE, MAT_STEAM, MAT_STONE, MAT_WATER,
};

const IGNITE_RADIUS: i32 = 3;
const CRYO_TEMPERATURE: f32 = -100.0;
const PLASMA_TEMPERATURE: f32 = 3000.0;

/// Dissipate with probability `decay`, otherwise drift on a `move_chance` share of updates.
fn drift(ctx: &mut UpdateContext, decay: f32, move_chance: f32) -> bool {
    if ctx.chance(decay) {
        ctx.replace_self(0);
        return true;
    }
    if !ctx.chance(move_chance) {
        return false;
    }
    ctx.rise_or_slip()
}

pub(super) fn update_steam(ctx: &mut UpdateContext) -> bool {
    if ctx.chance(0.005) {
        ctx.replace_self(0);
        return true;
    }
    if ctx.temp() < 60.0 && ctx.chance(0.01) {
        ctx.replace_self(MAT_WATER);
        return true;
    }
    if !ctx.chance(0.3) {
        return false;
    }

    let (x, y) = (ctx.x, ctx.y);
    let tx = x + ctx.rng.jitter();
    match ctx.grid.get(tx, y - 1) {
        0 => {
            ctx.grid.move_cell(x, y, tx, y - 1);
            true
        }
        MAT_WATER | MAT_ICE => {
            // condenses on contact
            if ctx.chance(0.2) {
                ctx.replace_self(MAT_WATER);
                return true;
            }
            false
        }
        MAT_BOUNDARY => false,
        _ => {
            if tx != x && ctx.grid.get(tx, y) == 0 {
                ctx.grid.move_cell(x, y, tx, y);
                return true;
            }
            false
        }
    }
}

pub(super) fn update_smoke(ctx: &mut UpdateContext) -> bool {
    drift(ctx, 0.02, 0.2)
}

pub(super) fn update_hot_smoke(ctx: &mut UpdateContext) -> bool {
    if ctx.chance(0.03) {
        ctx.replace_self(MAT_SMOKE);
        return true;
    }
    drift(ctx, 0.01, 1.0)
}

pub(super) fn update_gas(ctx: &mut UpdateContext) -> bool {
    let temp = ctx.temp();
    if temp < -50.0 && ctx.chance(0.15) {
        ctx.replace_self(MAT_CRYO);
        return true;
    }
    if temp > 1500.0 && ctx.chance(0.2) {
        ctx.replace_self(MAT_PLASMA);
        return true;
    }
    let flame_nearby = ctx
        .find_cardinal(|id| matches!(id, MAT_FIRE | MAT_EMBER | MAT_LAVA))
        .is_some();
    if (temp > 200.0 || flame_nearby) && ctx.chance(0.3) {
        ignite(ctx);
        return true;
    }

    for (dx, dy) in CARDINAL {
        let turns_into = match ctx.at(dx, dy) {
            MAT_ICE if ctx.chance(0.08) => MAT_CRYO,
            MAT_LAVA if ctx.chance(0.15) => MAT_PLASMA,
            MAT_CRYO if ctx.chance(0.05) => MAT_CRYO,
            MAT_PLASMA if ctx.chance(0.1) => MAT_PLASMA,
            _ => continue,
        };
        ctx.replace_self(turns_into);
        return true;
    }

    drift(ctx, 0.002, 0.4)
}

/// Flash every gas cell within the radius and scatter fire into empty space.
fn ignite(ctx: &mut UpdateContext) {
    let (cx, cy) = (ctx.x, ctx.y);
    let r = IGNITE_RADIUS;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let (nx, ny) = (cx + dx, cy + dy);
            match ctx.grid.get(nx, ny) {
                MAT_GAS => ctx.grid.set(nx, ny, MAT_FIRE),
                0 if ctx.chance(0.5) => ctx.grid.set(nx, ny, MAT_FIRE),
                _ => {}
            }
        }
    }
    ctx.grid.set(cx, cy, MAT_FIRE);
}

pub(super) fn update_cryo(ctx: &mut UpdateContext) -> bool {
    let (x, y) = (ctx.x, ctx.y);
    ctx.grid.set_temp(x, y, CRYO_TEMPERATURE);

    for (dx, dy) in CARDINAL {
        let (nx, ny) = (x + dx, y + dy);
        match ctx.grid.get(nx, ny) {
            MAT_WATER => {
                if ctx.chance(0.15) {
                    ctx.grid.set(nx, ny, MAT_ICE);
                    ctx.grid.set_temp(nx, ny, -20.0);
                }
            }
            MAT_STEAM => {
                if ctx.chance(0.2) {
                    ctx.grid.set(nx, ny, MAT_WATER);
                }
            }
            MAT_FIRE | MAT_EMBER => {
                ctx.grid.set(nx, ny, MAT_STEAM);
                if ctx.chance(0.3) {
                    ctx.replace_self(0);
                    return true;
                }
            }
            MAT_LAVA => {
                if ctx.chance(0.2) {
                    ctx.grid.set(nx, ny, MAT_MAGMA_ROCK);
                    ctx.replace_self(MAT_STEAM);
                    return true;
                }
            }
            _ => {}
        }
    }

    drift(ctx, 0.015, 0.5)
}

pub(super) fn update_dust(ctx: &mut UpdateContext) -> bool {
    let spark = ctx
        .find_cardinal(|id| matches!(id, MAT_FIRE | MAT_EMBER | MAT_LAVA | MAT_PLASMA))
        .is_some();
    if spark {
        let (x, y) = (ctx.x, ctx.y);
        explode(ctx, x, y, Blast::new(4, 4.0));
        return true;
    }
    drift(ctx, 0.005, 0.3)
}

pub(super) fn update_plasma(ctx: &mut UpdateContext) -> bool {
    let (x, y) = (ctx.x, ctx.y);
    ctx.grid.set_temp(x, y, PLASMA_TEMPERATURE);

    for (dx, dy) in CARDINAL {
        let (nx, ny) = (x + dx, y + dy);
        let id = ctx.grid.get(nx, ny);
        if matches!(id, 0 | MAT_BOUNDARY | MAT_STONE | MAT_PLASMA | MAT_BLACK_HOLE) {
            continue;
        }
        if ctx.chance(0.3) {
            let product = if ctx.chance(0.5) { MAT_FIRE } else { MAT_SMOKE };
            ctx.grid.set(nx, ny, product);
        }
    }

    if ctx.chance(0.05) {
        ctx.replace_self(MAT_FIRE);
        return true;
    }
    ctx.rise_or_slip()
}

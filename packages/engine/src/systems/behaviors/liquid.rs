//! Liquid - water, oil, acid, lava, slime, mercury
//!
//! One generic step parameterized by the registry entry (density,
//! dispersion, flow rate). Material-specific reactions run first and fall
//! through to `flow`.
//!
//! Horizontal spreading is gated by a cheap positional hash instead of the
//! RNG so that viscosity produces a stable, moire-free pattern.

use super::{UpdateContext, CARDINAL};
use crate::domain::materials::{
    MaterialId, MAT_ACID, MAT_EMBER, MAT_FIRE, MAT_GAS, MAT_GLASS, MAT_GUNPOWDER, MAT_ICE,
    MAT_MAGMA_ROCK, MAT_OIL, MAT_SAND, MAT_SMOKE, MAT_STEAM, MAT_STONE, MAT_WATER, MAT_WOOD,
};

const SWAP_DRAG: f32 = 0.8;
const LAVA_TEMPERATURE: f32 = 1000.0;

#[inline]
fn flow_hash(x: i32, y: i32, frame: u64) -> u32 {
    ((x as u64).wrapping_mul(12347))
        .wrapping_add((y as u64).wrapping_mul(42347))
        .wrapping_add(frame.wrapping_mul(73241)) as u32
        & 127
}

#[inline]
fn direction_hash(x: i32, y: i32, frame: u64) -> i32 {
    let h = (x as u64)
        .wrapping_mul(4523)
        .wrapping_add((y as u64).wrapping_mul(8321))
        .wrapping_add(frame.wrapping_mul(5123));
    if h & 1 == 0 { 1 } else { -1 }
}

struct Flow {
    id: MaterialId,
    density: u8,
    dispersion: i32,
    pressurized: bool,
    can_spread: bool,
    can_slide: bool,
}

impl Flow {
    /// Lighter fluid (liquid or gas) that this liquid may push aside.
    #[inline]
    fn displaces(&self, ctx: &UpdateContext, other: MaterialId) -> bool {
        other != 0
            && other != self.id
            && ctx.registry.is_fluid(other)
            && ctx.registry.density(other) < self.density
    }

    /// Down-diagonal, then sideways up to `dispersion`, then up-diagonal when pressurized.
    fn try_dir(&self, ctx: &mut UpdateContext, x: i32, y: i32, dir: i32) -> bool {
        let tx = x + dir;
        if tx < 0 || tx >= ctx.grid.width() as i32 {
            return false;
        }

        if self.can_slide {
            let into = ctx.grid.get(tx, y + 1);
            if into == 0 {
                ctx.grid.move_cell(x, y, tx, y + 1);
                return true;
            }
            if self.displaces(ctx, into) {
                ctx.grid.swap(x, y, tx, y + 1);
                return true;
            }
        }

        if !self.can_spread {
            return false;
        }

        for i in 1..=self.dispersion {
            let sx = x + dir * i;
            let content = ctx.grid.get(sx, y);
            if content == 0 {
                ctx.grid.move_cell(x, y, sx, y);
                return true;
            }
            if content == self.id {
                continue;
            }
            if self.displaces(ctx, content) {
                ctx.grid.swap(x, y, sx, y);
                return true;
            }
            break;
        }

        if self.pressurized {
            let into = ctx.grid.get(tx, y - 1);
            if into == 0 {
                ctx.grid.move_cell(x, y, tx, y - 1);
                return true;
            }
            if self.displaces(ctx, into) {
                ctx.grid.swap(x, y, tx, y - 1);
                return true;
            }
        }
        false
    }
}

/// Generic liquid step.
pub(super) fn flow(ctx: &mut UpdateContext) -> bool {
    let (x, y) = (ctx.x, ctx.y);
    let id = ctx.grid.get(x, y);
    let reg = ctx.registry;
    let density = reg.density(id);
    let flow_rate = reg.flow_rate(id);

    let mut velocity = (ctx.grid.get_velocity(x, y) + ctx.gravity).min(ctx.terminal_velocity);
    let fast_rand = flow_hash(x, y, ctx.frame) as f32;
    let can_spread = fast_rand < flow_rate * 128.0;
    let can_slide = fast_rand < flow_rate.max(0.5) * 128.0;

    let steps = (velocity.floor() as i32).max(1);
    let mut moved = false;
    let mut hit_ground = false;
    let cx = x;
    let mut cy = y;

    for _ in 0..steps {
        let ny = cy + 1;
        let below = ctx.grid.get(cx, ny);
        if below == 0 {
            ctx.grid.move_cell(cx, cy, cx, ny);
            cy = ny;
            moved = true;
        } else if below != id && reg.is_fluid(below) && reg.density(below) < density {
            ctx.grid.swap(cx, cy, cx, ny);
            cy = ny;
            moved = true;
            velocity *= SWAP_DRAG;
        } else {
            // floor, boundary, own kind or something denser
            hit_ground = true;
            break;
        }
    }

    if !hit_ground {
        ctx.grid.set_velocity(cx, cy, velocity);
        return moved;
    }
    ctx.grid.set_velocity(cx, cy, 0.0);

    if !can_spread && !can_slide {
        return moved;
    }

    let above = ctx.grid.get(cx, cy - 1);
    let pressurized = above == id || (reg.is_fluid(above) && reg.density(above) >= density);

    let step = Flow {
        id,
        density,
        dispersion: reg.dispersion(id) as i32,
        pressurized,
        can_spread,
        can_slide,
    };
    let dir = direction_hash(x, y, ctx.frame);
    if step.try_dir(ctx, cx, cy, dir) || step.try_dir(ctx, cx, cy, -dir) {
        return true;
    }
    moved
}

pub(super) fn update_water(ctx: &mut UpdateContext) -> bool {
    let temp = ctx.temp();
    if temp < 0.0 {
        if ctx.chance(0.1) {
            ctx.replace_self(MAT_ICE);
            return true;
        }
    } else if temp > 100.0 && ctx.chance(0.15) {
        ctx.replace_self(MAT_STEAM);
        // keep the heat so the steam does not condense right away
        ctx.grid.set_temp(ctx.x, ctx.y, temp);
        return true;
    }

    if let Some((fx, fy)) = ctx.find_cardinal(|id| id == MAT_FIRE) {
        ctx.grid.set(fx, fy, MAT_STEAM);
        ctx.replace_self(MAT_STEAM);
        return true;
    }

    flow(ctx)
}

pub(super) fn update_acid(ctx: &mut UpdateContext) -> bool {
    for (dx, dy) in CARDINAL {
        let (nx, ny) = (ctx.x + dx, ctx.y + dy);
        let id = ctx.grid.get(nx, ny);
        if matches!(id, MAT_STONE | MAT_SAND | MAT_WOOD | MAT_GLASS) && ctx.chance(0.1) {
            ctx.grid.set(nx, ny, 0);
            ctx.replace_self(0);
            return true;
        }
    }
    flow(ctx)
}

pub(super) fn update_lava(ctx: &mut UpdateContext) -> bool {
    let (x, y) = (ctx.x, ctx.y);
    let temp = ctx.temp();

    if temp < 600.0 && ctx.chance(0.15) {
        ctx.replace_self(MAT_MAGMA_ROCK);
        return true;
    }

    for (dx, dy) in CARDINAL {
        let (nx, ny) = (x + dx, y + dy);
        match ctx.grid.get(nx, ny) {
            MAT_WATER => {
                if temp < 950.0 && ctx.chance(0.1) {
                    ctx.replace_self(MAT_MAGMA_ROCK);
                    ctx.grid.set(nx, ny, MAT_STEAM);
                    return true;
                }
            }
            MAT_ICE => {
                if ctx.chance(0.4) {
                    ctx.grid.set(nx, ny, MAT_STEAM);
                    ctx.grid.set_temp(nx, ny, 200.0);
                }
                if ctx.chance(0.02) {
                    ctx.replace_self(MAT_MAGMA_ROCK);
                    return true;
                }
            }
            MAT_OIL => {
                if ctx.chance(0.5) {
                    ctx.grid.set(nx, ny, MAT_FIRE);
                }
            }
            MAT_WOOD => {
                if ctx.chance(0.1) {
                    ctx.grid.set(nx, ny, MAT_EMBER);
                    ctx.grid.set_velocity(nx, ny, 0.5);
                }
            }
            MAT_GUNPOWDER => ctx.grid.set(nx, ny, MAT_FIRE),
            _ => {}
        }
    }

    if ctx.chance(0.01) && ctx.grid.get(x, y - 1) == 0 {
        let roll = ctx.rng.next_f32();
        let emitted = if roll < 0.4 {
            MAT_FIRE
        } else if roll < 0.7 {
            MAT_SMOKE
        } else {
            MAT_GAS
        };
        ctx.grid.set(x, y - 1, emitted);
    }

    ctx.grid.set_temp(x, y, LAVA_TEMPERATURE);
    flow(ctx)
}

pub(super) fn update_slime(ctx: &mut UpdateContext) -> bool {
    for (dx, dy) in CARDINAL {
        let (nx, ny) = (ctx.x + dx, ctx.y + dy);
        match ctx.grid.get(nx, ny) {
            MAT_WATER if ctx.chance(0.02) => ctx.grid.set(nx, ny, MAT_ACID),
            MAT_WOOD if ctx.chance(0.05) => ctx.grid.set(nx, ny, MAT_FIRE),
            _ => {}
        }
    }
    flow(ctx)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Bench;
    use super::*;
    use crate::domain::materials::{MAT_LAVA, MAT_MERCURY};

    #[test]
    fn hashes_stay_in_range() {
        for x in [-3, 0, 5, 4000] {
            for frame in [0u64, 1, 99, u64::MAX] {
                assert!(flow_hash(x, 7, frame) < 128);
                assert!(direction_hash(x, 7, frame).abs() == 1);
            }
        }
    }

    #[test]
    fn water_falls_one_row_per_update_from_rest() {
        let mut b = Bench::new(8, 8);
        b.grid.set(4, 0, MAT_WATER);
        assert!(b.update(4, 0));
        assert_eq!(b.grid.get(4, 1), MAT_WATER);
        assert_eq!(b.grid.get_velocity(4, 1), 0.5);
    }

    #[test]
    fn water_spreads_on_a_flat_floor() {
        let mut b = Bench::new(16, 4);
        for x in 0..16 {
            b.grid.set(x, 3, MAT_STONE);
        }
        b.grid.set(8, 2, MAT_WATER);
        b.grid.set(8, 1, MAT_WATER);
        b.grid.set(8, 0, MAT_WATER);
        for _ in 0..40 {
            b.sweep();
        }
        assert_eq!(b.count(MAT_WATER), 3);
        // the column has collapsed into the bottom row
        let bottom = (0..16).filter(|&x| b.grid.get(x, 2) == MAT_WATER).count();
        assert_eq!(bottom, 3);
    }

    #[test]
    fn heavier_liquid_sinks_below_lighter() {
        let mut b = Bench::new(4, 8);
        b.grid.set(1, 7, MAT_OIL);
        b.grid.set(1, 6, MAT_MERCURY);
        assert!(b.update(1, 6));
        assert_eq!(b.grid.get(1, 7), MAT_MERCURY);
        assert_eq!(b.grid.get(1, 6), MAT_OIL);
    }

    #[test]
    fn liquid_never_displaces_powder() {
        let mut b = Bench::new(3, 3);
        b.grid.set(1, 2, MAT_SAND);
        b.grid.set(0, 2, MAT_STONE);
        b.grid.set(2, 2, MAT_STONE);
        b.grid.set(1, 1, MAT_MERCURY);
        b.grid.set(0, 1, MAT_STONE);
        b.grid.set(2, 1, MAT_STONE);
        for _ in 0..10 {
            b.sweep();
        }
        assert_eq!(b.grid.get(1, 2), MAT_SAND);
    }

    #[test]
    fn water_extinguishes_fire() {
        let mut b = Bench::new(8, 8);
        b.grid.set(3, 7, MAT_WATER);
        b.grid.set(4, 7, MAT_FIRE);
        assert!(b.update(3, 7));
        assert_eq!(b.grid.get(3, 7), MAT_STEAM);
        assert_eq!(b.grid.get(4, 7), MAT_STEAM);
    }

    /// Stone pocket around `(x, 7)` so the cell cannot flow away.
    fn pocket(b: &mut Bench, x: i32) {
        b.grid.set(x - 1, 7, MAT_STONE);
        b.grid.set(x + 1, 7, MAT_STONE);
    }

    #[test]
    fn boiling_water_keeps_its_heat() {
        let mut b = Bench::new(8, 8);
        pocket(&mut b, 3);
        b.grid.set(3, 7, MAT_WATER);
        b.grid.set_temp(3, 7, 150.0);
        for _ in 0..200 {
            if b.grid.get(3, 7) != MAT_WATER {
                break;
            }
            b.update(3, 7);
        }
        assert_eq!(b.grid.get(3, 7), MAT_STEAM);
        assert_eq!(b.grid.get_temp(3, 7), 150.0);
    }

    #[test]
    fn lava_pins_its_temperature() {
        let mut b = Bench::new(8, 8);
        pocket(&mut b, 3);
        b.grid.set(3, 7, MAT_LAVA);
        b.grid.set_temp(3, 7, 700.0);
        b.update(3, 7);
        assert_eq!(b.grid.get(3, 7), MAT_LAVA);
        assert_eq!(b.grid.get_temp(3, 7), LAVA_TEMPERATURE);
    }

    #[test]
    fn acid_eats_stone_and_is_spent() {
        let mut b = Bench::new(8, 8);
        pocket(&mut b, 3);
        b.grid.set(3, 7, MAT_ACID);
        for _ in 0..200 {
            if b.grid.get(3, 7) != MAT_ACID {
                break;
            }
            b.update(3, 7);
        }
        assert_eq!(b.grid.get(3, 7), 0);
        assert_eq!(b.count(MAT_STONE), 1);
    }
}

//! Solid - wood, ice, glass, magma rock, C4
//!
//! Static unless noted. These rules mostly react to temperature or to
//! neighbours and report `false` so that settled solids can fall asleep.

use super::explosion::{explode, Blast};
use super::{UpdateContext, CARDINAL, NEIGHBORS_8};
use crate::domain::materials::{
    MAT_EMBER, MAT_FIRE, MAT_ICE, MAT_LAVA, MAT_OIL, MAT_PLASMA, MAT_WATER,
};

const ICE_TEMPERATURE: f32 = -50.0;
const C4_AUTOIGNITION: f32 = 300.0;

pub(super) fn update_wood(ctx: &mut UpdateContext) -> bool {
    let (x, y) = (ctx.x, ctx.y);
    for (dx, dy) in CARDINAL {
        let (nx, ny) = (x + dx, y + dy);
        match ctx.grid.get(nx, ny) {
            MAT_FIRE => {
                if ctx.chance(0.15) {
                    ctx.replace_self(MAT_EMBER);
                    ctx.grid.set_velocity(x, y, 0.3);
                    return true;
                }
            }
            MAT_EMBER => {
                // embers keep their heat in the velocity slot
                if ctx.grid.get_velocity(nx, ny) > 0.5 && ctx.chance(0.02) {
                    ctx.replace_self(MAT_EMBER);
                    ctx.grid.set_velocity(x, y, 0.1);
                    return true;
                }
            }
            _ => {}
        }
    }
    false
}

pub(super) fn update_ice(ctx: &mut UpdateContext) -> bool {
    let (x, y) = (ctx.x, ctx.y);
    if ctx.temp() > 0.0 && ctx.chance(0.1) {
        ctx.replace_self(MAT_WATER);
        return true;
    }
    ctx.grid.set_temp(x, y, ICE_TEMPERATURE);

    for (dx, dy) in CARDINAL {
        let (nx, ny) = (x + dx, y + dy);
        if ctx.grid.get(nx, ny) == MAT_WATER && ctx.chance(0.02) {
            ctx.grid.set(nx, ny, MAT_ICE);
        }
    }
    false
}

pub(super) fn update_glass(ctx: &mut UpdateContext) -> bool {
    if ctx.temp() > 1400.0 && ctx.chance(0.1) {
        ctx.replace_self(MAT_LAVA);
        return true;
    }
    false
}

pub(super) fn update_magma_rock(ctx: &mut UpdateContext) -> bool {
    if ctx.temp() > 800.0 && ctx.chance(0.1) {
        ctx.replace_self(MAT_LAVA);
        return true;
    }

    let (x, y) = (ctx.x, ctx.y);
    let dir = ctx.rng.sign();
    for tx in [x, x + dir] {
        match ctx.grid.get(tx, y + 1) {
            0 => {
                ctx.grid.move_cell(x, y, tx, y + 1);
                return true;
            }
            MAT_WATER | MAT_LAVA | MAT_OIL => {
                ctx.grid.swap(x, y, tx, y + 1);
                return true;
            }
            _ => {}
        }
    }
    false
}

pub(super) fn update_c4(ctx: &mut UpdateContext) -> bool {
    let (x, y) = (ctx.x, ctx.y);
    let triggered = ctx.temp() > C4_AUTOIGNITION
        || NEIGHBORS_8
            .iter()
            .any(|&(dx, dy)| matches!(ctx.at(dx, dy), MAT_FIRE | MAT_EMBER | MAT_LAVA | MAT_PLASMA));
    if triggered {
        explode(ctx, x, y, Blast::new(12, 10.0));
    }
    triggered
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Bench;
    use super::*;
    use crate::domain::materials::{MAT_C4, MAT_GLASS, MAT_MAGMA_ROCK, MAT_STONE, MAT_WOOD};

    #[test]
    fn wood_catches_from_fire_as_ember() {
        let mut b = Bench::new(8, 8);
        b.grid.set(3, 3, MAT_WOOD);
        b.grid.set(3, 2, MAT_FIRE);
        for _ in 0..200 {
            if b.update(3, 3) {
                break;
            }
        }
        assert_eq!(b.grid.get(3, 3), MAT_EMBER);
        assert_eq!(b.grid.get_velocity(3, 3), 0.3);
    }

    #[test]
    fn cold_ice_is_static_and_pinned() {
        let mut b = Bench::new(8, 8);
        b.grid.set(3, 3, MAT_ICE);
        b.grid.set_temp(3, 3, -10.0);
        assert!(!b.update(3, 3));
        assert_eq!(b.grid.get_temp(3, 3), ICE_TEMPERATURE);
    }

    #[test]
    fn warm_ice_melts() {
        let mut b = Bench::new(8, 8);
        b.grid.set(3, 3, MAT_ICE);
        for _ in 0..200 {
            if b.grid.get(3, 3) != MAT_ICE {
                break;
            }
            // something keeps heating it
            b.grid.set_temp(3, 3, 40.0);
            b.update(3, 3);
        }
        assert_eq!(b.grid.get(3, 3), MAT_WATER);
    }

    #[test]
    fn glass_melts_only_when_very_hot() {
        let mut b = Bench::new(8, 8);
        b.grid.set(3, 3, MAT_GLASS);
        b.grid.set_temp(3, 3, 1000.0);
        for _ in 0..100 {
            b.update(3, 3);
        }
        assert_eq!(b.grid.get(3, 3), MAT_GLASS);
    }

    #[test]
    fn magma_rock_sinks_through_water() {
        let mut b = Bench::new(3, 4);
        for x in 0..3 {
            b.grid.set(x, 3, MAT_STONE);
        }
        b.grid.set(1, 2, MAT_WATER);
        b.grid.set(1, 1, MAT_MAGMA_ROCK);
        assert!(b.update(1, 1));
        assert_eq!(b.grid.get(1, 2), MAT_MAGMA_ROCK);
        assert_eq!(b.grid.get(1, 1), MAT_WATER);
    }

    #[test]
    fn c4_waits_for_a_trigger() {
        let mut b = Bench::new(64, 64);
        b.grid.set(32, 32, MAT_C4);
        assert!(!b.update(32, 32));
        assert_eq!(b.grid.get(32, 32), MAT_C4);

        b.grid.set(33, 33, MAT_FIRE);
        // detonation changes the cell, so it must not count towards sleep
        assert!(b.update(32, 32));
        assert_ne!(b.grid.get(32, 32), MAT_C4);
    }
}

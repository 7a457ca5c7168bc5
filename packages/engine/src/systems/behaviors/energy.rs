//! Energy - fire, ember, firework
//!
//! Ember and firework keep private state in the velocity slot: ember heat and
//! rocket vertical speed respectively.

use super::explosion::{explode, Blast};
use super::{UpdateContext, CARDINAL, NEIGHBORS_8};
use crate::domain::materials::{
    MAT_BOUNDARY, MAT_C4, MAT_DUST, MAT_EMBER, MAT_FIRE, MAT_GUNPOWDER, MAT_HOT_SMOKE, MAT_OIL,
    MAT_SMOKE, MAT_WOOD,
};
use crate::systems::offgrid::OffGridParticle;

const EMBER_MAX_HEAT: f32 = 1.5;
const FIREWORK_SPARKS: usize = 6;

/// Above, left, right. Embers only emit where flames can rise.
const EMBER_EMIT: [(i32, i32); 3] = [(0, -1), (-1, 0), (1, 0)];

pub(super) fn update_fire(ctx: &mut UpdateContext) -> bool {
    if ctx.chance(0.03) {
        let residue = if ctx.chance(0.7) { MAT_SMOKE } else { 0 };
        ctx.replace_self(residue);
        return true;
    }

    let (x, y) = (ctx.x, ctx.y);
    for (dx, dy) in NEIGHBORS_8 {
        let (nx, ny) = (x + dx, y + dy);
        match ctx.grid.get(nx, ny) {
            MAT_OIL => {
                if ctx.chance(0.3) {
                    ctx.grid.set(nx, ny, MAT_FIRE);
                }
            }
            MAT_WOOD => {
                if ctx.chance(0.08) {
                    ctx.grid.set(nx, ny, MAT_EMBER);
                    ctx.grid.set_velocity(nx, ny, 0.4);
                }
            }
            MAT_GUNPOWDER => {
                let radius = 5 + ctx.rng.below(3) as i32;
                explode(ctx, nx, ny, Blast::new(radius, 6.0));
            }
            MAT_C4 => explode(ctx, nx, ny, Blast::new(12, 10.0)),
            MAT_DUST => explode(ctx, nx, ny, Blast::new(4, 4.0)),
            _ => {}
        }
    }

    // a blast may have consumed this cell
    if ctx.grid.get(x, y) != MAT_FIRE {
        return true;
    }
    ctx.rise_or_slip()
}

pub(super) fn update_ember(ctx: &mut UpdateContext) -> bool {
    let (x, y) = (ctx.x, ctx.y);
    let mut heat = ctx.grid.get_velocity(x, y) + 0.01 + ctx.rng.next_f32() * 0.01;
    heat = heat.min(EMBER_MAX_HEAT);

    if heat > 0.6 {
        for (dx, dy) in EMBER_EMIT {
            let (nx, ny) = (x + dx, y + dy);
            if ctx.grid.get(nx, ny) == 0 && ctx.chance(0.2) {
                let flame = if ctx.chance(0.8) { MAT_FIRE } else { MAT_HOT_SMOKE };
                ctx.grid.set(nx, ny, flame);
                heat -= 0.05;
                break;
            }
        }
    }

    if heat > 0.5 {
        for (dx, dy) in CARDINAL {
            let (nx, ny) = (x + dx, y + dy);
            if ctx.grid.get(nx, ny) == MAT_WOOD && ctx.chance(0.01) {
                ctx.grid.set(nx, ny, MAT_EMBER);
                ctx.grid.set_velocity(nx, ny, heat * 0.3);
                heat -= 0.05;
            }
        }
    }

    let burnout = if heat > 1.2 {
        0.05
    } else if heat > 0.8 {
        0.01
    } else {
        0.001
    };
    if ctx.chance(burnout) {
        let residue = if ctx.chance(0.8) { MAT_HOT_SMOKE } else { 0 };
        ctx.replace_self(residue);
        return true;
    }

    ctx.grid.set_velocity(x, y, heat);
    true
}

pub(super) fn update_firework(ctx: &mut UpdateContext) -> bool {
    let (x, y) = (ctx.x, ctx.y);
    let mut velocity = ctx.grid.get_velocity(x, y);
    if velocity == 0.0 {
        velocity = -3.0 - ctx.rng.next_f32() * 2.0;
    }
    velocity += 0.08;

    if (-0.1..=0.5).contains(&velocity) {
        burst(ctx);
        return true;
    }

    // half-up rounding, so -2.5 lands on -2
    let dy = (velocity + 0.5).floor() as i32;
    if dy == 0 {
        ctx.grid.set_velocity(x, y, velocity);
        return true;
    }
    let ty = y + dy;
    match ctx.grid.get(x, ty) {
        0 => {
            ctx.grid.move_cell(x, y, x, ty);
            ctx.grid.set_velocity(x, ty, velocity);
        }
        MAT_BOUNDARY => ctx.grid.set_velocity(x, y, velocity),
        _ => burst(ctx),
    }
    true
}

/// Clear the rocket, sprinkle fire in a disc and throw a handful of sparks.
fn burst(ctx: &mut UpdateContext) {
    let (cx, cy) = (ctx.x, ctx.y);
    let radius = 4 + ctx.rng.below(3) as i32;
    ctx.grid.set(cx, cy, 0);

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > radius * radius {
                continue;
            }
            let (nx, ny) = (cx + dx, cy + dy);
            if ctx.grid.get(nx, ny) == 0 && ctx.chance(0.4) {
                ctx.grid.set(nx, ny, MAT_FIRE);
            }
        }
    }

    let color = ctx.registry.color(MAT_FIRE);
    for i in 0..FIREWORK_SPARKS {
        let angle = (i as f32 + ctx.rng.next_f32()) * std::f32::consts::TAU / FIREWORK_SPARKS as f32;
        let speed = 2.0 + ctx.rng.next_f32() * 2.0;
        ctx.grid.queue_particle(OffGridParticle::new(
            cx as f32,
            cy as f32,
            angle.cos() * speed,
            angle.sin() * speed,
            MAT_FIRE,
            color,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Bench;
    use super::*;
    use crate::domain::materials::{MAT_FIREWORK, MAT_STONE};

    #[test]
    fn fire_burns_out_eventually() {
        let mut b = Bench::new(16, 16);
        b.grid.set(8, 15, MAT_FIRE);
        for _ in 0..600 {
            b.sweep();
        }
        assert_eq!(b.count(MAT_FIRE), 0);
    }

    #[test]
    fn fire_sets_off_gunpowder() {
        let mut b = Bench::new(32, 32);
        for x in 10..20 {
            b.grid.set(x, 20, MAT_GUNPOWDER);
        }
        b.grid.set(15, 19, MAT_FIRE);
        b.update(15, 19);
        assert!(b.count(MAT_GUNPOWDER) < 10);
    }

    #[test]
    fn ember_heats_up_and_stays_awake() {
        let mut b = Bench::new(8, 8);
        // boxed in so nothing can be emitted
        for (x, y) in [(2, 3), (4, 3), (3, 2), (3, 4)] {
            b.grid.set(x, y, MAT_STONE);
        }
        b.grid.set(3, 3, MAT_EMBER);
        b.grid.set_velocity(3, 3, 0.2);
        assert!(b.update(3, 3));
        if b.grid.get(3, 3) == MAT_EMBER {
            let heat = b.grid.get_velocity(3, 3);
            assert!(heat > 0.2 && heat <= 0.22 + f32::EPSILON);
        }
    }

    #[test]
    fn ember_heat_is_capped() {
        let mut b = Bench::new(8, 8);
        for (x, y) in [(2, 3), (4, 3), (3, 2), (3, 4)] {
            b.grid.set(x, y, MAT_STONE);
        }
        b.grid.set(3, 3, MAT_EMBER);
        b.grid.set_velocity(3, 3, EMBER_MAX_HEAT);
        b.update(3, 3);
        assert!(b.grid.get_velocity(3, 3) <= EMBER_MAX_HEAT);
    }

    #[test]
    fn firework_launches_upward() {
        let mut b = Bench::new(16, 32);
        b.grid.set(8, 30, MAT_FIREWORK);
        assert!(b.update(8, 30));
        let rocket = (0..30).find(|&y| b.grid.get(8, y) == MAT_FIREWORK);
        let y = rocket.expect("rocket moved up");
        assert!(b.grid.get_velocity(8, y) < -2.0);
    }

    #[test]
    fn firework_bursts_at_apex() {
        let mut b = Bench::new(32, 32);
        b.grid.set(16, 16, MAT_FIREWORK);
        b.grid.set_velocity(16, 16, -0.15);
        assert!(b.update(16, 16));
        assert_eq!(b.count(MAT_FIREWORK), 0);
        assert_eq!(b.grid.queued_len(), FIREWORK_SPARKS);
    }
}

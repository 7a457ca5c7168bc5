//! Special - black hole

use super::UpdateContext;
use crate::domain::materials::{MAT_BLACK_HOLE, MAT_BOUNDARY, MAT_STONE};

const SAMPLES: usize = 20;
const PULL_RADIUS: f32 = 20.0;
const CONSUME_RADIUS: f32 = 6.0;

/// Sample random points around the hole: swallow what is close, pull the rest
/// one cell inward. Never sleeps.
pub(super) fn update_black_hole(ctx: &mut UpdateContext) -> bool {
    let (x, y) = (ctx.x, ctx.y);
    for _ in 0..SAMPLES {
        let angle = ctx.rng.next_f32() * std::f32::consts::TAU;
        let dist = ctx.rng.next_f32() * PULL_RADIUS;
        let dx = (angle.cos() * dist).floor() as i32;
        let dy = (angle.sin() * dist).floor() as i32;
        if dx == 0 && dy == 0 {
            continue;
        }

        let (px, py) = (x + dx, y + dy);
        if matches!(
            ctx.grid.get(px, py),
            0 | MAT_BOUNDARY | MAT_STONE | MAT_BLACK_HOLE
        ) {
            continue;
        }

        if (((dx * dx + dy * dy) as f32).sqrt()) <= CONSUME_RADIUS {
            ctx.grid.set(px, py, 0);
            continue;
        }

        let (tx, ty) = (px - dx.signum(), py - dy.signum());
        if ctx.grid.get(tx, ty) == 0 {
            ctx.grid.move_cell(px, py, tx, ty);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Bench;
    use crate::domain::materials::{MAT_BLACK_HOLE, MAT_SAND, MAT_STONE};

    #[test]
    fn swallows_nearby_cells_but_not_stone() {
        let mut b = Bench::new(64, 64);
        b.grid.set(32, 32, MAT_BLACK_HOLE);
        for y in 29..=35 {
            for x in 29..=35 {
                if (x, y) != (32, 32) {
                    b.grid.set(x, y, if x == 29 { MAT_STONE } else { MAT_SAND });
                }
            }
        }
        for _ in 0..200 {
            assert!(b.update(32, 32));
        }
        assert!(b.count(MAT_SAND) < 41);
        assert_eq!(b.count(MAT_STONE), 7);
        assert_eq!(b.count(MAT_BLACK_HOLE), 1);
    }
}

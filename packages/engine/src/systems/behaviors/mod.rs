//! Behaviors - per-material update rules
//!
//! Every non-empty, awake cell is handed to `update_cell`, which dispatches on
//! the material's `MaterialKind` with a single exhaustive match. A rule
//! returns `true` when the cell moved or changed, `false` when it stayed put
//! (that is what drives the sleep timer).
//!
//! Rules may read and write any cell within `MAX_EFFECT_REACH` of the updated
//! cell; nothing further.

mod energy;
mod explosion;
mod gas;
mod liquid;
mod powder;
mod solid;
mod special;

pub use explosion::{explode, Blast, MAX_EXPLOSION_RADIUS, SHOCKWAVE_FACTOR};

use crate::core::rng::SimRng;
use crate::domain::materials::{MaterialId, MaterialKind};
use crate::domain::registry::MaterialRegistry;
use crate::spatial::grid::Grid;

/// Cardinal neighbour offsets: up, down, left, right.
pub(crate) const CARDINAL: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

/// Cardinal then diagonal neighbour offsets.
pub(crate) const NEIGHBORS_8: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Everything a rule needs to update the cell at `(x, y)`.
pub struct UpdateContext<'a> {
    pub grid: &'a mut Grid,
    pub registry: &'a MaterialRegistry,
    pub rng: &'a mut SimRng,
    pub x: i32,
    pub y: i32,
    pub frame: u64,
    pub gravity: f32,
    pub terminal_velocity: f32,
}

impl<'a> UpdateContext<'a> {
    /// Material at an offset from the updated cell.
    #[inline]
    pub fn at(&self, dx: i32, dy: i32) -> MaterialId {
        self.grid.get(self.x + dx, self.y + dy)
    }

    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.rng.chance(p)
    }

    #[inline]
    pub fn temp(&self) -> f32 {
        self.grid.get_temp(self.x, self.y)
    }

    /// Replace the updated cell.
    #[inline]
    pub fn replace_self(&mut self, id: MaterialId) {
        self.grid.set(self.x, self.y, id);
    }

    /// First cardinal neighbour whose id satisfies `pred`.
    pub fn find_cardinal(&self, pred: impl Fn(MaterialId) -> bool) -> Option<(i32, i32)> {
        CARDINAL
            .iter()
            .map(|&(dx, dy)| (self.x + dx, self.y + dy))
            .find(|&(nx, ny)| pred(self.grid.get(nx, ny)))
    }

    /// Rise one row with a random -1/0/+1 drift, else slip sideways into empty space.
    pub fn rise_or_slip(&mut self) -> bool {
        let (x, y) = (self.x, self.y);
        let tx = x + self.rng.jitter();
        if self.grid.get(tx, y - 1) == 0 {
            self.grid.move_cell(x, y, tx, y - 1);
            return true;
        }
        let side = self.rng.sign();
        if self.grid.get(x + side, y) == 0 {
            self.grid.move_cell(x, y, x + side, y);
            return true;
        }
        false
    }
}

/// Run the rule of `kind` for the cell in `ctx`.
pub fn update_cell(kind: MaterialKind, ctx: &mut UpdateContext) -> bool {
    use MaterialKind::*;
    match kind {
        Empty => false,

        Sand => powder::update_sand(ctx),
        Coal => powder::update_coal(ctx),
        Gunpowder => powder::update_gunpowder(ctx),

        Water => liquid::update_water(ctx),
        Oil | Mercury => liquid::flow(ctx),
        Acid => liquid::update_acid(ctx),
        Lava => liquid::update_lava(ctx),
        Slime => liquid::update_slime(ctx),

        Steam => gas::update_steam(ctx),
        Smoke => gas::update_smoke(ctx),
        HotSmoke => gas::update_hot_smoke(ctx),
        Gas => gas::update_gas(ctx),
        Cryo => gas::update_cryo(ctx),
        Dust => gas::update_dust(ctx),
        Plasma => gas::update_plasma(ctx),

        Stone => false,
        Wood => solid::update_wood(ctx),
        Ice => solid::update_ice(ctx),
        Glass => solid::update_glass(ctx),
        MagmaRock => solid::update_magma_rock(ctx),
        C4 => solid::update_c4(ctx),

        Fire => energy::update_fire(ctx),
        Ember => energy::update_ember(ctx),
        Firework => energy::update_firework(ctx),

        BlackHole => special::update_black_hole(ctx),
    }
}

use crate::core::constants::SLEEP_THRESHOLD;
use crate::domain::registry::MaterialRegistry;
use crate::spatial::chunks::{ChunkAssignment, PhaseColor};
use crate::systems::behaviors::{update_cell, UpdateContext};

use super::WorkerCore;

/// Update every awake cell of the assigned chunks of `color` that are active
/// this frame. Returns the number of cells handed to a rule.
pub(super) fn run_rules(core: &mut WorkerCore, color: PhaseColor, frame: u64) -> u32 {
    let layout = *core.grid.shared().layout();
    let mut updated = 0;
    for i in 0..core.chunks.len() {
        let ChunkAssignment { cx, cy } = core.chunks[i];
        if !color.matches(cx, cy) || !core.active.check(layout.chunk_idx_from_coords(cx, cy)) {
            continue;
        }
        updated += process_chunk(core, cx, cy, frame);
    }
    updated
}

/// Visit the chunk's cells in a fresh random order.
fn process_chunk(core: &mut WorkerCore, cx: u32, cy: u32, frame: u64) -> u32 {
    let WorkerCore {
        grid,
        registry,
        rng,
        scratch,
        gravity,
        terminal_velocity,
        ..
    } = core;
    let registry: &MaterialRegistry = &**registry;

    let (x0, y0, x1, y1) = grid.shared().layout().cell_bounds(cx, cy);
    let chunk_w = x1 - x0;
    let count = (chunk_w * (y1 - y0)) as u16;

    scratch.clear();
    scratch.extend(0..count);
    rng.shuffle(scratch);

    let mut updated = 0;
    for &local in scratch.iter() {
        let x = x0 + local as u32 % chunk_w;
        let y = y0 + local as u32 / chunk_w;
        let idx = grid.index_unchecked(x, y);

        let id = grid.get_index(idx);
        if id == 0 || grid.is_stamped(idx) {
            continue;
        }
        let sleepy = registry.can_sleep(id);
        if sleepy && grid.sleep_timer(idx) >= SLEEP_THRESHOLD {
            continue;
        }

        let mut ctx = UpdateContext {
            grid: &mut *grid,
            registry,
            rng: &mut *rng,
            x: x as i32,
            y: y as i32,
            frame,
            gravity: *gravity,
            terminal_velocity: *terminal_velocity,
        };
        let moved = update_cell(registry.kind(id), &mut ctx);
        updated += 1;

        if !moved && sleepy {
            grid.bump_sleep(idx);
        }
    }
    updated
}

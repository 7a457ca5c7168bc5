use crate::core::constants::TEMP_WAKE_THRESHOLD;
use crate::domain::registry::MaterialRegistry;
use crate::spatial::chunks::{ChunkAssignment, ChunkBitmap};
use crate::spatial::grid::{Grid, BOUNDARY_ID};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConductionStats {
    pub cells: u32,
    pub woken: u32,
}

/// Conduct heat in every assigned chunk that is set in `active`.
pub fn conduct_chunks(
    grid: &mut Grid,
    registry: &MaterialRegistry,
    chunks: &[ChunkAssignment],
    active: &ChunkBitmap,
) -> ConductionStats {
    let layout = *grid.shared().layout();
    let mut stats = ConductionStats::default();
    for chunk in chunks {
        if !active.check(layout.chunk_idx_from_coords(chunk.cx, chunk.cy)) {
            continue;
        }
        let s = conduct_chunk(grid, registry, chunk.cx, chunk.cy);
        stats.cells += s.cells;
        stats.woken += s.woken;
    }
    stats
}

/// Relax each non-empty cell toward the conductivity-weighted mean of itself
/// and its non-empty cardinal neighbours:
///
/// `avg = (T + sum(Tn * sqrt(k * kn))) / (1 + sum(sqrt(k * kn)))`,
/// `T' = T + (avg - T) * k`.
///
/// The outermost ring of the world is skipped. Neighbour temperatures may be
/// read mid-update by the worker that owns them; that race is tolerated.
pub fn conduct_chunk(grid: &mut Grid, registry: &MaterialRegistry, cx: u32, cy: u32) -> ConductionStats {
    let (x0, y0, x1, y1) = grid.shared().layout().cell_bounds(cx, cy);
    let (w, h) = (grid.width(), grid.height());
    let (x0, y0) = (x0.max(1), y0.max(1));
    let (x1, y1) = (x1.min(w.saturating_sub(1)), y1.min(h.saturating_sub(1)));

    let width = w as usize;
    let mut stats = ConductionStats::default();

    for y in y0..y1 {
        for x in x0..x1 {
            let idx = grid.index_unchecked(x, y);
            let id = grid.get_index(idx);
            if id == 0 {
                continue;
            }
            stats.cells += 1;

            let k = registry.conductivity(id);
            let current = grid.get_temp_index(idx);
            let neighbours = [idx - width, idx + width, idx - 1, idx + 1];

            let mut weighted = current;
            let mut total = 1.0f32;
            for n in neighbours {
                let nid = grid.get_index(n);
                if nid == 0 || nid == BOUNDARY_ID {
                    continue;
                }
                let blend = (k * registry.conductivity(nid)).sqrt();
                weighted += grid.get_temp_index(n) * blend;
                total += blend;
            }
            if total <= 1.0 {
                continue;
            }

            let next = current + (weighted / total - current) * k;
            grid.set_temp_index(idx, next);

            if (next - current).abs() > TEMP_WAKE_THRESHOLD {
                grid.reset_sleep(idx);
                for n in neighbours {
                    grid.reset_sleep(n);
                }
                stats.woken += 1;
            }
        }
    }
    stats
}

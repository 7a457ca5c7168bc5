use crate::domain::materials::MaterialId;
use crate::domain::registry::MaterialRegistry;
use crate::spatial::grid::Grid;

/// Put `id` into an empty in-bounds cell. Unregistered ids are refused.
pub(super) fn place_cell(grid: &mut Grid, registry: &MaterialRegistry, x: i32, y: i32, id: MaterialId) -> bool {
    if id == 0 || !registry.is_registered(id) {
        return false;
    }
    if !grid.in_bounds(x, y) || !grid.is_empty(x, y) {
        return false;
    }
    grid.set(x, y, id);
    true
}

/// Overwrite every in-bounds cell of the rectangle with `id` (0 erases).
/// Returns the number of cells written.
pub(super) fn fill_rect(
    grid: &mut Grid,
    registry: &MaterialRegistry,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    id: MaterialId,
) -> usize {
    if id != 0 && !registry.is_registered(id) {
        return 0;
    }
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = x.saturating_add(width as i32).min(grid.width() as i32);
    let y1 = y.saturating_add(height as i32).min(grid.height() as i32);

    let mut written = 0;
    for cy in y0..y1 {
        for cx in x0..x1 {
            grid.set(cx, cy, id);
            written += 1;
        }
    }
    written
}

/// Fill the empty cells of a disc with `id`; with `id == 0` clear the disc instead.
pub(super) fn fill_circle(
    grid: &mut Grid,
    registry: &MaterialRegistry,
    cx: i32,
    cy: i32,
    radius: i32,
    id: MaterialId,
) -> usize {
    let r2 = radius * radius;
    let mut written = 0;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy > r2 {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if id == 0 {
                if grid.in_bounds(x, y) && !grid.is_empty(x, y) {
                    grid.set(x, y, 0);
                    written += 1;
                }
            } else if place_cell(grid, registry, x, y, id) {
                written += 1;
            }
        }
    }
    written
}

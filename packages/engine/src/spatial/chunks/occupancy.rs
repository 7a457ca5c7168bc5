use crate::core::shared_memory::SharedMemory;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Neighbours woken alongside an occupied chunk: itself, the one below, the
/// ones beside and above, and the two diagonals below (falling matter spills there).
const WAKE_OFFSETS: [(i32, i32); 7] = [(0, 0), (0, 1), (-1, 0), (1, 0), (0, -1), (-1, 1), (1, 1)];

fn chunk_is_occupied(mem: &SharedMemory, chunk_idx: usize) -> bool {
    let layout = mem.layout();
    let (cx, cy) = layout.coords_of(chunk_idx);
    let (x0, y0, x1, y1) = layout.cell_bounds(cx, cy);
    let width = mem.width() as usize;
    (y0..y1).any(|y| {
        let row = y as usize * width;
        (x0..x1).any(|x| mem.cell(row + x as usize) != 0)
    })
}

/// Scan every chunk and mark occupied ones (plus spill neighbours) in the
/// active-next-frame bitmap. Returns the number of occupied chunks.
///
/// Run once per frame before the bitmap is snapshotted, so chunks that only
/// hold matter resting after a load or an edit still get an update.
pub fn wake_occupied_chunks(mem: &SharedMemory) -> usize {
    let total = mem.layout().total_chunks();

    // Occupancy scan is read-only, chunks are independent
    #[cfg(feature = "parallel")]
    let occupied: Vec<usize> = (0..total)
        .into_par_iter()
        .filter(|&idx| chunk_is_occupied(mem, idx))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let occupied: Vec<usize> = (0..total)
        .filter(|&idx| chunk_is_occupied(mem, idx))
        .collect();

    let layout = *mem.layout();
    for &idx in &occupied {
        let (cx, cy) = layout.coords_of(idx);
        for (dx, dy) in WAKE_OFFSETS {
            let nx = cx as i32 + dx;
            let ny = cy as i32 + dy;
            if layout.chunk_in_bounds(nx, ny) {
                mem.mark_chunk(layout.chunk_idx_from_coords(nx as u32, ny as u32));
            }
        }
    }
    occupied.len()
}

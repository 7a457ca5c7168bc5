use super::*;

use crate::core::constants::CHUNK_SIZE;

impl Grid {
    /// Mark the chunk holding `(x, y)` active next frame. Cells on a chunk
    /// edge also mark the chunk across that edge, and corner cells the
    /// diagonal chunk, since their neighbours live there.
    pub fn wake(&self, x: i32, y: i32) {
        if !self.in_bounds(x, y) {
            return;
        }
        let layout = self.mem.layout();
        let (cx, cy) = (x / CHUNK_SIZE as i32, y / CHUNK_SIZE as i32);
        self.mem.mark_chunk(layout.chunk_idx_from_coords(cx as u32, cy as u32));

        let last = CHUNK_SIZE as i32 - 1;
        let lx = x % CHUNK_SIZE as i32;
        let ly = y % CHUNK_SIZE as i32;
        let dx = if lx == 0 { -1 } else if lx == last { 1 } else { 0 };
        let dy = if ly == 0 { -1 } else if ly == last { 1 } else { 0 };

        let mark = |ncx: i32, ncy: i32| {
            if layout.chunk_in_bounds(ncx, ncy) {
                self.mem
                    .mark_chunk(layout.chunk_idx_from_coords(ncx as u32, ncy as u32));
            }
        };
        if dx != 0 {
            mark(cx + dx, cy);
        }
        if dy != 0 {
            mark(cx, cy + dy);
        }
        if dx != 0 && dy != 0 {
            mark(cx + dx, cy + dy);
        }
    }

    /// Wake `(x, y)` and reset sleep timers of its 3x3 neighbourhood.
    /// The edge handling in `wake` already covers every chunk the 3x3 block touches.
    pub fn wake_neighborhood(&self, x: i32, y: i32) {
        self.wake(x, y);
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                if let Some(idx) = self.index(nx, ny) {
                    self.mem.store_sleep_timer(idx, 0);
                }
            }
        }
    }
}

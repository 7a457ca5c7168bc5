//! Chunk System - fixed-size chunk grid for activity tracking and scheduling.

use crate::core::constants::CHUNK_SIZE;

mod assignment;
mod bitset;
mod occupancy;
mod phase;

pub use assignment::{assign_round_robin, ChunkAssignment};
pub use bitset::{AtomicChunkBits, ChunkBitmap};
pub use occupancy::wake_occupied_chunks;
pub use phase::PhaseColor;

/// Chunk layout of a world. Partial chunks on the right/bottom edge are kept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkGrid {
    width: u32,
    height: u32,
    chunks_x: u32,
    chunks_y: u32,
    chunk_count: usize,
}

impl ChunkGrid {
    /// Create chunk grid for given world dimensions
    pub fn new(world_width: u32, world_height: u32) -> Self {
        let chunks_x = world_width.div_ceil(CHUNK_SIZE);
        let chunks_y = world_height.div_ceil(CHUNK_SIZE);
        let chunk_count = (chunks_x * chunks_y) as usize;

        Self {
            width: world_width,
            height: world_height,
            chunks_x,
            chunks_y,
            chunk_count,
        }
    }

    /// Get chunk dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.chunks_x, self.chunks_y)
    }

    /// Get total chunk count.
    pub fn total_chunks(&self) -> usize {
        self.chunk_count
    }

    /// Get chunk index from world coordinates
    #[inline]
    pub fn chunk_index(&self, x: u32, y: u32) -> usize {
        let cx = x / CHUNK_SIZE;
        let cy = y / CHUNK_SIZE;
        (cy * self.chunks_x + cx) as usize
    }

    /// Get chunk coordinates from world coordinates
    #[inline]
    pub fn chunk_coords(&self, x: u32, y: u32) -> (u32, u32) {
        (x / CHUNK_SIZE, y / CHUNK_SIZE)
    }

    /// Get chunk index from chunk coordinates
    #[inline]
    pub fn chunk_idx_from_coords(&self, cx: u32, cy: u32) -> usize {
        (cy * self.chunks_x + cx) as usize
    }

    /// Chunk coordinates of a chunk index
    #[inline]
    pub fn coords_of(&self, idx: usize) -> (u32, u32) {
        let idx = idx as u32;
        (idx % self.chunks_x, idx / self.chunks_x)
    }

    /// Check if chunk coordinates are valid
    #[inline]
    pub fn chunk_in_bounds(&self, cx: i32, cy: i32) -> bool {
        cx >= 0 && cx < self.chunks_x as i32 && cy >= 0 && cy < self.chunks_y as i32
    }

    /// Cell rectangle `[x0, x1) x [y0, y1)` covered by a chunk, clamped to the world.
    #[inline]
    pub fn cell_bounds(&self, cx: u32, cy: u32) -> (u32, u32, u32, u32) {
        let x0 = (cx * CHUNK_SIZE).min(self.width);
        let y0 = (cy * CHUNK_SIZE).min(self.height);
        let x1 = ((cx + 1) * CHUNK_SIZE).min(self.width);
        let y1 = ((cy + 1) * CHUNK_SIZE).min(self.height);
        (x0, y0, x1, y1)
    }
}

//! Grid - per-thread view over the shared cell buffers
//!
//! Every thread (coordinator and workers) owns its own `Grid`; all of them
//! point at the same `SharedMemory`. Mutators take `&mut self` because they
//! touch view-local state (the spawn queue), even though the cell storage
//! itself is atomic.
//!
//! Coordinates are `i32` everywhere. Out-of-bounds reads return the boundary
//! sentinel / defaults, out-of-bounds writes are ignored.

use std::sync::Arc;

use crate::core::shared_memory::SharedMemory;
use crate::systems::offgrid::OffGridParticle;

mod accessors;
mod indexing;
mod moves;
mod wake;

/// Material id returned for reads outside the world.
pub const BOUNDARY_ID: u8 = 255;

pub struct Grid {
    mem: Arc<SharedMemory>,
    width: u32,
    height: u32,
    size: usize,

    /// Stamp written by mutations; 0 outside a frame.
    tag: u8,
    frame: u64,

    /// Off-grid spawns requested by rules during the current frame.
    queued: Vec<OffGridParticle>,
}

impl Grid {
    pub fn new(mem: Arc<SharedMemory>) -> Self {
        Self {
            width: mem.width(),
            height: mem.height(),
            size: mem.size(),
            mem,
            tag: 0,
            frame: 0,
            queued: Vec::new(),
        }
    }

    #[inline]
    pub fn shared(&self) -> &Arc<SharedMemory> {
        &self.mem
    }

    /// Enter `frame`: later mutations are stamped with this frame's tag.
    pub fn begin_frame(&mut self, frame: u64) {
        self.frame = frame;
        self.tag = Self::tag_for(frame);
    }

    /// Leave the frame; mutations made afterwards (edits, loads) are unstamped.
    pub fn end_frame(&mut self) {
        self.tag = 0;
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn tag_for(frame: u64) -> u8 {
        (frame % 255) as u8 + 1
    }

    /// True if the cell was produced by a mutation during the current frame.
    #[inline]
    pub fn is_stamped(&self, idx: usize) -> bool {
        self.tag != 0 && self.mem.stamp(idx) == self.tag
    }

    // === Off-grid spawn queue ===

    pub fn queue_particle(&mut self, particle: OffGridParticle) {
        self.queued.push(particle);
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    pub fn take_queued(&mut self) -> Vec<OffGridParticle> {
        std::mem::take(&mut self.queued)
    }

    /// Empty the whole world (all buffers, counter, activity) and the local queue.
    pub fn clear(&mut self) {
        self.mem.reset();
        self.queued.clear();
    }

    /// Live (non-empty) cell count from the shared counter.
    #[inline]
    pub fn particle_count(&self) -> u32 {
        self.mem.particle_count()
    }
}

#[cfg(test)]
mod tests;

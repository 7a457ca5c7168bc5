//! Shared Memory - cross-thread buffers backing every Grid view
//!
//! All per-cell arrays are arrays of atomics accessed with `Relaxed`
//! ordering. Workers never touch the same cell concurrently inside a phase
//! (checkerboard exclusion); the channel round-trip that ends each phase
//! publishes their writes to the next one. The only read-modify-write users
//! are the particle counter and the chunk bitmap (several chunks share a word).

use std::sync::atomic::{AtomicI32, AtomicU32, AtomicU8, Ordering};

use crate::core::constants::DEFAULT_TEMPERATURE;
use crate::core::error::EngineError;
use crate::spatial::chunks::{AtomicChunkBits, ChunkBitmap, ChunkGrid};

const MAX_SIDE: u32 = u16::MAX as u32;

pub struct SharedMemory {
    width: u32,
    height: u32,
    size: usize,
    layout: ChunkGrid,

    cells: Box<[AtomicU8]>,
    /// Multiplexed f32 slot: fall speed, ember heat or firework launch phase.
    velocity: Box<[AtomicU32]>,
    temperature: Box<[AtomicU32]>,
    sleep_timers: Box<[AtomicU8]>,
    /// Frame tag of the last write that produced the cell (0 = never).
    stamps: Box<[AtomicU8]>,

    /// Active-next-frame bitmap.
    chunk_state: AtomicChunkBits,
    particle_count: AtomicI32,
}

impl SharedMemory {
    /// Allocate buffers for a fixed world size. Never resized afterwards.
    pub fn new(width: u32, height: u32) -> Result<Self, EngineError> {
        if width == 0 || height == 0 || width > MAX_SIDE || height > MAX_SIDE {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        let size = width as usize * height as usize;
        let layout = ChunkGrid::new(width, height);
        let default_temp = DEFAULT_TEMPERATURE.to_bits();

        let cells = alloc_atomic("cells", size, || AtomicU8::new(0))?;
        let velocity = alloc_atomic("velocity", size, || AtomicU32::new(0))?;
        let temperature = alloc_atomic("temperature", size, || AtomicU32::new(default_temp))?;
        let sleep_timers = alloc_atomic("sleep_timers", size, || AtomicU8::new(0))?;
        let stamps = alloc_atomic("stamps", size, || AtomicU8::new(0))?;
        let words = ChunkBitmap::words_for(layout.total_chunks());
        let chunk_words = alloc_atomic("chunk_state", words, || Default::default())?;

        log::debug!(
            "shared memory: {}x{} cells, {} chunks ({} bytes)",
            width,
            height,
            layout.total_chunks(),
            size * 11
        );

        Ok(Self {
            width,
            height,
            size,
            chunk_state: AtomicChunkBits::from_words(chunk_words, layout.total_chunks()),
            layout,
            cells,
            velocity,
            temperature,
            sleep_timers,
            stamps,
            particle_count: AtomicI32::new(0),
        })
    }

    #[inline]
    pub fn width(&self) -> u32 { self.width }

    #[inline]
    pub fn height(&self) -> u32 { self.height }

    #[inline]
    pub fn size(&self) -> usize { self.size }

    #[inline]
    pub fn layout(&self) -> &ChunkGrid { &self.layout }

    // === Cells ===

    #[inline]
    pub fn cell(&self, idx: usize) -> u8 {
        self.cells[idx].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn store_cell(&self, idx: usize, id: u8) {
        self.cells[idx].store(id, Ordering::Relaxed);
    }

    /// Write `new` only if the cell still holds `current`.
    #[inline]
    pub fn compare_exchange_cell(&self, idx: usize, current: u8, new: u8) -> bool {
        self.cells[idx]
            .compare_exchange(current, new, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
    }

    #[inline]
    pub fn velocity(&self, idx: usize) -> f32 {
        f32::from_bits(self.velocity[idx].load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store_velocity(&self, idx: usize, v: f32) {
        self.velocity[idx].store(v.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn temperature(&self, idx: usize) -> f32 {
        f32::from_bits(self.temperature[idx].load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store_temperature(&self, idx: usize, t: f32) {
        self.temperature[idx].store(t.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn sleep_timer(&self, idx: usize) -> u8 {
        self.sleep_timers[idx].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn store_sleep_timer(&self, idx: usize, value: u8) {
        self.sleep_timers[idx].store(value, Ordering::Relaxed);
    }

    #[inline]
    pub fn stamp(&self, idx: usize) -> u8 {
        self.stamps[idx].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn store_stamp(&self, idx: usize, tag: u8) {
        self.stamps[idx].store(tag, Ordering::Relaxed);
    }

    /// Forget stamps carrying `tag` so a tag reused 255 frames later does not
    /// mark cells the new frame never touched.
    pub fn retire_stamps(&self, tag: u8) {
        for stamp in self.stamps.iter() {
            if stamp.load(Ordering::Relaxed) == tag {
                stamp.store(0, Ordering::Relaxed);
            }
        }
    }

    // === Chunk activity ===

    #[inline]
    pub fn mark_chunk(&self, chunk_idx: usize) {
        self.chunk_state.set(chunk_idx);
    }

    #[inline]
    pub fn is_chunk_marked(&self, chunk_idx: usize) -> bool {
        self.chunk_state.check(chunk_idx)
    }

    /// Copy active-next-frame into `snapshot` and clear it for the new frame.
    pub fn take_chunk_state(&self, snapshot: &mut ChunkBitmap) {
        self.chunk_state.drain_into(snapshot);
    }

    /// Number of chunks currently marked active-next-frame.
    pub fn marked_chunk_count(&self) -> usize {
        self.chunk_state.count()
    }

    // === Particle counter ===

    #[inline]
    pub fn particle_count(&self) -> u32 {
        self.particle_count.load(Ordering::Relaxed).max(0) as u32
    }

    #[inline]
    pub fn adjust_particle_count(&self, delta: i32) {
        self.particle_count.fetch_add(delta, Ordering::Relaxed);
    }

    #[inline]
    pub fn store_particle_count(&self, count: u32) {
        self.particle_count
            .store(count.min(i32::MAX as u32) as i32, Ordering::Relaxed);
    }

    // === Bulk ===

    /// Empty every cell, restore default temperature and forget all activity.
    pub fn reset(&self) {
        let default_temp = DEFAULT_TEMPERATURE.to_bits();
        for idx in 0..self.size {
            self.cells[idx].store(0, Ordering::Relaxed);
            self.velocity[idx].store(0, Ordering::Relaxed);
            self.temperature[idx].store(default_temp, Ordering::Relaxed);
            self.sleep_timers[idx].store(0, Ordering::Relaxed);
            self.stamps[idx].store(0, Ordering::Relaxed);
        }
        self.chunk_state.clear();
        self.particle_count.store(0, Ordering::Relaxed);
    }

    pub fn cells_to_vec(&self) -> Vec<u8> {
        self.cells.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    pub fn velocities_to_vec(&self) -> Vec<f32> {
        self.velocity
            .iter()
            .map(|v| f32::from_bits(v.load(Ordering::Relaxed)))
            .collect()
    }

    pub fn temperatures_to_vec(&self) -> Vec<f32> {
        self.temperature
            .iter()
            .map(|t| f32::from_bits(t.load(Ordering::Relaxed)))
            .collect()
    }

    /// Count non-empty cells by scanning (the counter is the fast path).
    pub fn count_non_empty(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.load(Ordering::Relaxed) != 0)
            .count()
    }
}

fn alloc_atomic<T>(
    buffer: &'static str,
    len: usize,
    init: impl FnMut() -> T,
) -> Result<Box<[T]>, EngineError> {
    let mut v: Vec<T> = Vec::new();
    v.try_reserve_exact(len).map_err(|_| EngineError::SharedMemoryAlloc {
        buffer,
        bytes: len.saturating_mul(std::mem::size_of::<T>()),
    })?;
    v.resize_with(len, init);
    Ok(v.into_boxed_slice())
}

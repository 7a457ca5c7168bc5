//! One bit per chunk. `ChunkBitmap` is the plain snapshot handed to workers;
//! `AtomicChunkBits` lives in shared memory and collects wakes.

use std::sync::atomic::{AtomicU64, Ordering};

#[inline(always)]
fn split(idx: usize) -> (usize, u64) {
    (idx >> 6, 1u64 << (idx & 63))
}

/// Active-this-frame snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkBitmap {
    words: Vec<u64>,
    len: usize,
}

impl ChunkBitmap {
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; Self::words_for(len)],
            len,
        }
    }

    /// A bitmap with every chunk set.
    pub fn all(len: usize) -> Self {
        let mut bits = Self::new(len);
        for idx in 0..len {
            bits.set(idx);
        }
        bits
    }

    #[inline]
    pub fn words_for(len: usize) -> usize {
        len.div_ceil(64)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn set(&mut self, idx: usize) {
        let (word, mask) = split(idx);
        if idx < self.len {
            self.words[word] |= mask;
        }
    }

    #[inline(always)]
    pub fn clear_bit(&mut self, idx: usize) {
        let (word, mask) = split(idx);
        if idx < self.len {
            self.words[word] &= !mask;
        }
    }

    #[inline(always)]
    pub fn check(&self, idx: usize) -> bool {
        let (word, mask) = split(idx);
        idx < self.len && (self.words[word] & mask) != 0
    }

    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Indices of set bits in ascending order.
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(w * 64 + bit)
            })
        })
    }

    pub(crate) fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }
}

/// Active-next-frame bits shared by all threads.
pub struct AtomicChunkBits {
    words: Box<[AtomicU64]>,
    len: usize,
}

impl AtomicChunkBits {
    pub(crate) fn from_words(words: Box<[AtomicU64]>, len: usize) -> Self {
        debug_assert!(words.len() >= ChunkBitmap::words_for(len));
        Self { words, len }
    }

    /// Set a bit. The load first keeps already-awake chunks off the RMW path.
    #[inline(always)]
    pub fn set(&self, idx: usize) {
        if idx >= self.len {
            return;
        }
        let (word, mask) = split(idx);
        let slot = &self.words[word];
        if slot.load(Ordering::Relaxed) & mask == 0 {
            slot.fetch_or(mask, Ordering::Relaxed);
        }
    }

    #[inline(always)]
    pub fn check(&self, idx: usize) -> bool {
        let (word, mask) = split(idx);
        idx < self.len && self.words[word].load(Ordering::Relaxed) & mask != 0
    }

    pub fn count(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }

    pub fn clear(&self) {
        for w in self.words.iter() {
            w.store(0, Ordering::Relaxed);
        }
    }

    /// Move every bit into `out` and zero the shared words.
    pub fn drain_into(&self, out: &mut ChunkBitmap) {
        if out.len() != self.len {
            *out = ChunkBitmap::new(self.len);
        }
        for (dst, src) in out.words_mut().iter_mut().zip(self.words.iter()) {
            *dst = src.swap(0, Ordering::Relaxed);
        }
    }
}

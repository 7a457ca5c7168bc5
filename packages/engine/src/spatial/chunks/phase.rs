//! Checkerboard coloring.
//!
//! Chunks are colored by the parity of their coordinates. Two different chunks
//! of one color differ by at least 2 on some axis, so chunks processed in the
//! same phase never touch each other or share a neighbour on that axis.

use crate::core::rng::SimRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseColor {
    /// (even, even)
    Red,
    /// (odd, even)
    Blue,
    /// (even, odd)
    Green,
    /// (odd, odd)
    Yellow,
}

impl PhaseColor {
    pub const ALL: [PhaseColor; 4] = [
        PhaseColor::Red,
        PhaseColor::Blue,
        PhaseColor::Green,
        PhaseColor::Yellow,
    ];

    #[inline]
    pub fn of_chunk(cx: u32, cy: u32) -> Self {
        match (cx & 1, cy & 1) {
            (0, 0) => PhaseColor::Red,
            (1, 0) => PhaseColor::Blue,
            (0, _) => PhaseColor::Green,
            _ => PhaseColor::Yellow,
        }
    }

    #[inline]
    pub fn matches(self, cx: u32, cy: u32) -> bool {
        Self::of_chunk(cx, cy) == self
    }

    /// Numeric id used on the wire (0..=3).
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// The four colors in a fresh random order.
    pub fn shuffled(rng: &mut SimRng) -> [PhaseColor; 4] {
        let mut order = Self::ALL;
        rng.shuffle(&mut order);
        order
    }
}

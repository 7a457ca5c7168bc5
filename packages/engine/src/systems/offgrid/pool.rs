use crate::core::constants::PARTICLE_STRIDE;
use crate::domain::materials::MaterialId;

/// One flying particle. Position in cell units, velocity in cells/frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OffGridParticle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub id: MaterialId,
    /// 0xRRGGBB; fits the f32 mantissa exactly in transfer buffers.
    pub color: u32,
}

impl OffGridParticle {
    pub fn new(x: f32, y: f32, vx: f32, vy: f32, id: MaterialId, color: u32) -> Self {
        Self { x, y, vx, vy, id, color }
    }
}

/// Struct-of-arrays particle storage with O(1) swap-remove.
#[derive(Default)]
pub struct ParticlePool {
    xs: Vec<f32>,
    ys: Vec<f32>,
    vxs: Vec<f32>,
    vys: Vec<f32>,
    ids: Vec<MaterialId>,
    colors: Vec<u32>,
}

impl ParticlePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
            ys: Vec::with_capacity(capacity),
            vxs: Vec::with_capacity(capacity),
            vys: Vec::with_capacity(capacity),
            ids: Vec::with_capacity(capacity),
            colors: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn push(&mut self, p: OffGridParticle) {
        self.xs.push(p.x);
        self.ys.push(p.y);
        self.vxs.push(p.vx);
        self.vys.push(p.vy);
        self.ids.push(p.id);
        self.colors.push(p.color);
    }

    pub fn extend(&mut self, particles: impl IntoIterator<Item = OffGridParticle>) {
        for p in particles {
            self.push(p);
        }
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<OffGridParticle> {
        (i < self.len()).then(|| OffGridParticle {
            x: self.xs[i],
            y: self.ys[i],
            vx: self.vxs[i],
            vy: self.vys[i],
            id: self.ids[i],
            color: self.colors[i],
        })
    }

    /// Overwrite the kinematic state of particle `i`.
    #[inline]
    pub(super) fn set_motion(&mut self, i: usize, x: f32, y: f32, vx: f32, vy: f32) {
        self.xs[i] = x;
        self.ys[i] = y;
        self.vxs[i] = vx;
        self.vys[i] = vy;
    }

    /// Remove particle `i`; the last particle takes its slot.
    pub fn swap_remove(&mut self, i: usize) {
        if i >= self.len() {
            return;
        }
        self.xs.swap_remove(i);
        self.ys.swap_remove(i);
        self.vxs.swap_remove(i);
        self.vys.swap_remove(i);
        self.ids.swap_remove(i);
        self.colors.swap_remove(i);
    }

    pub fn clear(&mut self) {
        self.xs.clear();
        self.ys.clear();
        self.vxs.clear();
        self.vys.clear();
        self.ids.clear();
        self.colors.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = OffGridParticle> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Flatten into `[x, y, vx, vy, id, color]` records. `None` when empty.
    pub fn to_buffer(&self) -> Option<Vec<f32>> {
        if self.is_empty() {
            return None;
        }
        let mut out = Vec::with_capacity(self.len() * PARTICLE_STRIDE);
        for i in 0..self.len() {
            out.extend_from_slice(&[
                self.xs[i],
                self.ys[i],
                self.vxs[i],
                self.vys[i],
                self.ids[i] as f32,
                self.colors[i] as f32,
            ]);
        }
        Some(out)
    }

    /// Decode a transfer buffer. A trailing partial record is ignored.
    pub fn particles_from_buffer(buffer: &[f32]) -> impl Iterator<Item = OffGridParticle> + '_ {
        buffer.chunks_exact(PARTICLE_STRIDE).map(|r| OffGridParticle {
            x: r[0],
            y: r[1],
            vx: r[2],
            vy: r[3],
            id: r[4] as MaterialId,
            color: r[5] as u32,
        })
    }
}

use serde::Serialize;

/// Timings and counters of the last frame. All zero while perf metrics are off.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerfStats {
    pub frame_ms: f64,
    /// Occupancy scan, stamp retirement and bitmap snapshot.
    pub prepare_ms: f64,
    /// Wall time of each phase in execution order.
    pub phase_ms: [f64; 4],
    pub cells_updated: u32,
    pub active_chunks: u32,
    pub occupied_chunks: u32,
    pub particle_count: u32,
    pub offgrid_particles: u32,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }

    /// Slowest phase of the frame.
    pub fn slowest_phase_ms(&self) -> f64 {
        self.phase_ms.iter().copied().fold(0.0, f64::max)
    }
}

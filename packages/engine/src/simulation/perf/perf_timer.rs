use std::time::Instant;

#[derive(Clone, Copy)]
pub(crate) struct PerfTimer {
    start: Instant,
}

impl PerfTimer {
    pub(crate) fn start() -> Self {
        PerfTimer { start: Instant::now() }
    }

    pub(crate) fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

use serde::{Deserialize, Serialize};

use crate::core::constants::{DEFAULT_GRAVITY, DEFAULT_TERMINAL_VELOCITY, DEFAULT_WORKER_COUNT};
use crate::core::error::EngineError;

/// Largest worker pool accepted from configuration.
pub const MAX_WORKERS: usize = 64;

/// Engine settings. Every field has a default, so `{}` is a valid config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub width: u32,
    pub height: u32,
    /// Worker threads. 0 picks the platform's available parallelism.
    pub workers: usize,
    /// Base seed; worker `i` uses `seed + i + 1`, the coordinator `seed`.
    pub seed: u64,
    pub gravity: f32,
    pub terminal_velocity: f32,
    /// Per-phase watchdog. `None` waits forever (dead workers are still detected).
    pub phase_timeout_ms: Option<u64>,
    pub enable_perf_metrics: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            workers: 0,
            seed: 0x5A4D,
            gravity: DEFAULT_GRAVITY,
            terminal_velocity: DEFAULT_TERMINAL_VELOCITY,
            phase_timeout_ms: None,
            enable_perf_metrics: false,
        }
    }
}

impl SimulationConfig {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.width == 0 || self.height == 0 || self.width > u16::MAX as u32 || self.height > u16::MAX as u32 {
            return Err(EngineError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.workers > MAX_WORKERS {
            return Err(EngineError::Config(format!(
                "workers must be at most {MAX_WORKERS}, got {}",
                self.workers
            )));
        }
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(EngineError::Config(format!("gravity must be finite and >= 0, got {}", self.gravity)));
        }
        // fall steps are bounded by the terminal velocity and must stay inside the effect reach
        if !self.terminal_velocity.is_finite() || !(1.0..=16.0).contains(&self.terminal_velocity) {
            return Err(EngineError::Config(format!(
                "terminalVelocity must be within 1..=16, got {}",
                self.terminal_velocity
            )));
        }
        if self.phase_timeout_ms == Some(0) {
            return Err(EngineError::Config("phaseTimeoutMs must be positive".into()));
        }
        Ok(())
    }

    /// Worker count after resolving 0 to the available parallelism.
    pub fn resolved_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(DEFAULT_WORKER_COUNT)
            .min(MAX_WORKERS)
    }
}

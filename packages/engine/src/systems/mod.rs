//! Systems - per-frame work on the grid: material rules, heat and off-grid particles

pub mod behaviors;
pub mod offgrid;
pub mod temperature;

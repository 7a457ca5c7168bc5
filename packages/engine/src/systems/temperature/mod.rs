//! Temperature System - heat conduction between touching materials
//!
//! Runs once per frame on every worker over its own active chunks, after the
//! rule updates of the frame's first phase. Empty cells neither hold nor pass heat.

mod conduction;

pub use conduction::{conduct_chunk, conduct_chunks, ConductionStats};

//! Domain - materials and the registry that resolves ids to rules and constants.

pub mod materials;
pub mod registry;

pub use materials::*;
pub use registry::MaterialRegistry;

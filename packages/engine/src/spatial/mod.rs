//! Spatial - chunk layout, activity bitmaps and the grid view

pub mod chunks;
pub mod grid;

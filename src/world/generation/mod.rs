//! Procedural map generation
//!
//! Random maps for the viewer, benchmarks and property tests.

pub mod caves;

pub use caves::{generate_caves, pick_open_cell};

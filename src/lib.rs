//! Shadowsight - field of view for grid maps
//!
//! Restrictive precise angle shadowcasting: which cells of a map can be seen
//! from an observer cell, given which cells let light through.

pub mod error;
pub mod world;
pub mod fov;
pub mod config;
pub mod ui;

// Re-export commonly used types
pub use error::{FovError, MapError};
pub use fov::{compute_fov, FovSettings};
pub use world::map::Map;

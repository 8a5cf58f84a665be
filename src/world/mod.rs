//! World module
//!
//! Contains the map grid, cells, text layouts, and procedural generation.

pub mod cell;
pub mod map;
pub mod layout;
pub mod generation;

pub use cell::{Cell, CellKind};
pub use map::Map;
pub use layout::{render_fov, render_map, Layout};

//! Error types
//!
//! Failures reported by the grid container and the field of view engine.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors returned by [`crate::fov::compute_fov`].
///
/// The grid is never modified when one of these is returned.
#[derive(Debug, Error)]
pub enum FovError {
    /// Observer coordinates lie outside the grid.
    #[error("Origin ({x}, {y}) is outside the {width}x{height} map")]
    InvalidOrigin {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    /// The obstacle buffer could not be allocated.
    #[error("Out of memory while reserving the obstacle buffer")]
    OutOfMemory(#[from] TryReserveError),
}

/// Errors from building or editing a [`crate::world::Map`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("Invalid map dimensions {width}x{height} (both must be > 0, at most i32::MAX cells)")]
    InvalidDimensions { width: i32, height: i32 },

    /// The cell buffer could not be allocated.
    #[error("Out of memory allocating a {width}x{height} map")]
    OutOfMemory { width: i32, height: i32 },

    #[error("Cell ({x}, {y}) is outside the {width}x{height} map")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    #[error("Cannot copy a {src_width}x{src_height} map into a {width}x{height} map")]
    SizeMismatch {
        width: i32,
        height: i32,
        src_width: i32,
        src_height: i32,
    },

    #[error("Map of {width}x{height} needs {expected} cells, found {found}")]
    CellCount {
        width: i32,
        height: i32,
        expected: usize,
        found: usize,
    },

    /// Layout text has no rows.
    #[error("Layout is empty")]
    EmptyLayout,

    #[error("Layout row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph { glyph: char, column: usize, row: usize },

    #[error("Layout marks more than one observer")]
    MultipleObservers,
}

/// Result type for map operations.
pub type MapResult<T> = std::result::Result<T, MapError>;

//! Field of view
//!
//! Restrictive precise angle shadowcasting over a [`Map`].

pub mod restrictive;

pub use restrictive::compute_fov;

use serde::{Deserialize, Serialize};

use crate::error::FovError;
use crate::world::Map;

/// Options for a field of view computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FovSettings {
    /// Ring count limit; 0 means unlimited
    pub max_radius: u32,
    /// Mark the walls bordering the view as visible
    pub light_walls: bool,
}

impl Default for FovSettings {
    fn default() -> Self {
        Self {
            max_radius: 0,
            light_walls: true,
        }
    }
}

/// [`compute_fov`] taking the observer as a position and the options as a struct
pub fn compute_with(map: &mut Map, origin: (i32, i32), settings: FovSettings) -> Result<(), FovError> {
    compute_fov(map, origin.0, origin.1, settings.max_radius, settings.light_walls)
}

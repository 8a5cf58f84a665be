//! Restrictive precise angle shadowcasting
//!
//! Each octant is swept ring by ring outward from the observer. Inside a ring
//! every cell covers an equal share of the octant's `[0, 1]` slope range;
//! walls found on nearer rings are kept as obstacle intervals and each cell is
//! tested against the intervals recorded before its ring started.

use super::FovSettings;
use crate::error::FovError;
use crate::world::Map;

/// Obstacle buffer reservation per cell count. An estimate only, the buffer grows past it.
const CELLS_PER_OBSTACLE: usize = 7;

/// Quadrant signs, in sweep order. Later quadrants read visibility written by
/// earlier ones, so the order is part of the result.
const QUADRANTS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Which axis a sweep advances rings along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    /// Rings are rows, cells are scanned along x.
    VerticalEdge,
    /// Rings are columns, cells are scanned along y.
    HorizontalEdge,
}

/// One of the eight sweeps: a quadrant plus an orientation
#[derive(Debug, Clone, Copy)]
struct Octant {
    dx: i32,
    dy: i32,
    orientation: Orientation,
}

impl Octant {
    fn ring_step(&self) -> i32 {
        match self.orientation {
            Orientation::VerticalEdge => self.dy,
            Orientation::HorizontalEdge => self.dx,
        }
    }

    fn scan_step(&self) -> i32 {
        match self.orientation {
            Orientation::VerticalEdge => self.dx,
            Orientation::HorizontalEdge => self.dy,
        }
    }

    /// Split map coordinates into (ring, scan) coordinates
    fn split(&self, x: i32, y: i32) -> (i32, i32) {
        match self.orientation {
            Orientation::VerticalEdge => (y, x),
            Orientation::HorizontalEdge => (x, y),
        }
    }

    /// Join (ring, scan) coordinates back into map coordinates
    fn join(&self, ring: i32, scan: i32) -> (i32, i32) {
        match self.orientation {
            Orientation::VerticalEdge => (scan, ring),
            Orientation::HorizontalEdge => (ring, scan),
        }
    }

    /// Map extents along the (ring, scan) axes
    fn extents(&self, map: &Map) -> (i32, i32) {
        self.split(map.width(), map.height())
    }
}

/// A slope range blocked by a wall on a nearer ring
#[derive(Debug, Clone, Copy, PartialEq)]
struct Obstacle {
    start: f64,
    end: f64,
}

impl Obstacle {
    fn overlaps(&self, start: f64, end: f64) -> bool {
        start <= self.end && end >= self.start
    }

    fn contains_centre(&self, centre: f64) -> bool {
        centre > self.start && centre < self.end
    }

    fn covers(&self, start: f64, end: f64) -> bool {
        start >= self.start && end <= self.end
    }

    fn extend(&mut self, start: f64, end: f64) {
        self.start = self.start.min(start);
        self.end = self.end.max(end);
    }
}

/// Per-octant progress
#[derive(Debug, Clone, Copy)]
struct SweepState {
    /// Ring index, starting at 1
    iteration: i32,
    /// Slopes below this are blocked for the rest of the octant
    min_angle: f64,
    /// Obstacles recorded before the current ring; only these are tested
    obstacles_in_last_line: usize,
}

impl SweepState {
    fn new() -> Self {
        Self {
            iteration: 1,
            min_angle: 0.0,
            obstacles_in_last_line: 0,
        }
    }
}

/// Slopes of one cell within its ring
#[derive(Debug, Clone, Copy)]
struct CellSlopes {
    start: f64,
    centre: f64,
    end: f64,
}

impl CellSlopes {
    fn new(processed_cell: i32, iteration: i32) -> Self {
        let slopes_per_cell = 1.0 / f64::from(iteration);
        let half_slopes = slopes_per_cell * 0.5;
        let centre = f64::from(processed_cell) * slopes_per_cell;
        Self {
            start: centre - half_slopes,
            centre,
            end: centre + half_slopes,
        }
    }
}

/// Light has been seen passing through this cell
fn lets_light_through(map: &Map, (x, y): (i32, i32)) -> bool {
    map.index(x, y).map_or(false, |idx| {
        let cell = map.cell_at(idx);
        cell.visible && cell.transparent
    })
}

/// Compute the field of view from `(origin_x, origin_y)`, overwriting every
/// cell's visibility flag.
///
/// `max_radius` of 0 means the sweep is only bounded by the map. Otherwise
/// no cell further than `max_radius` rings (Chebyshev distance) is visible.
/// With `light_walls` off, opaque cells are never marked visible, though they
/// still block sight. The origin is always visible.
///
/// On error the map is left exactly as it was.
pub fn compute_fov(
    map: &mut Map,
    origin_x: i32,
    origin_y: i32,
    max_radius: u32,
    light_walls: bool,
) -> Result<(), FovError> {
    let Some(origin_idx) = map.index(origin_x, origin_y) else {
        return Err(FovError::InvalidOrigin {
            x: origin_x,
            y: origin_y,
            width: map.width(),
            height: map.height(),
        });
    };

    let mut obstacles: Vec<Obstacle> = Vec::new();
    obstacles.try_reserve(map.len() / CELLS_PER_OBSTACLE)?;

    map.clear_fov();
    map.set_visible_at(origin_idx, true);

    let settings = FovSettings {
        max_radius,
        light_walls,
    };
    let mut high_water = 0;
    for (dx, dy) in QUADRANTS {
        for orientation in [Orientation::VerticalEdge, Orientation::HorizontalEdge] {
            let octant = Octant { dx, dy, orientation };
            sweep_octant(map, (origin_x, origin_y), settings, octant, &mut obstacles);
            high_water = high_water.max(obstacles.len());
        }
    }

    log::trace!(
        "FOV from ({}, {}) radius {}: {} cells visible, {} obstacles max",
        origin_x,
        origin_y,
        max_radius,
        map.visible_count(),
        high_water
    );

    Ok(())
}

/// Sweep a single octant. `obstacles` is scratch space shared between sweeps.
fn sweep_octant(
    map: &mut Map,
    origin: (i32, i32),
    settings: FovSettings,
    octant: Octant,
    obstacles: &mut Vec<Obstacle>,
) {
    obstacles.clear();

    let (ring_origin, scan_origin) = octant.split(origin.0, origin.1);
    let (ring_len, scan_len) = octant.extents(map);
    let ring_step = octant.ring_step();
    let scan_step = octant.scan_step();

    let mut ring = ring_origin + ring_step;
    if ring < 0 || ring >= ring_len {
        return;
    }

    let mut state = SweepState::new();
    loop {
        let slopes_per_cell = 1.0 / f64::from(state.iteration);
        let half_slopes = slopes_per_cell * 0.5;
        let mut processed_cell = ((state.min_angle + half_slopes) / slopes_per_cell) as i32;
        let scan_min = (scan_origin - state.iteration).max(0);
        let scan_max = (scan_origin + state.iteration).min(scan_len - 1);

        let mut done = true;
        let mut scan = scan_origin + processed_cell * scan_step;
        while scan >= scan_min && scan <= scan_max {
            let (x, y) = octant.join(ring, scan);
            let Some(idx) = map.index(x, y) else {
                break;
            };
            let transparent = map.cell_at(idx).transparent;
            let slopes = CellSlopes::new(processed_cell, state.iteration);

            let mut visible = true;
            let mut extended = false;
            if state.obstacles_in_last_line > 0 {
                // Can't see past a corner neither of whose nearer neighbours is lit.
                let behind = octant.join(ring - ring_step, scan);
                let behind_diagonal = octant.join(ring - ring_step, scan - scan_step);
                if !lets_light_through(map, behind) && !lets_light_through(map, behind_diagonal) {
                    visible = false;
                } else {
                    for obstacle in &mut obstacles[..state.obstacles_in_last_line] {
                        if !obstacle.overlaps(slopes.start, slopes.end) {
                            continue;
                        }
                        if transparent {
                            if obstacle.contains_centre(slopes.centre) {
                                visible = false;
                                break;
                            }
                        } else if obstacle.covers(slopes.start, slopes.end) {
                            visible = false;
                            break;
                        } else {
                            obstacle.extend(slopes.start, slopes.end);
                            extended = true;
                        }
                    }
                }
            }

            if visible {
                done = false;
                map.set_visible_at(idx, true);
                if !transparent {
                    if state.min_angle >= slopes.start {
                        state.min_angle = slopes.end;
                        // Blocked up to the ring's edge.
                        if processed_cell == state.iteration {
                            done = true;
                        }
                    } else if !extended {
                        obstacles.push(Obstacle {
                            start: slopes.start,
                            end: slopes.end,
                        });
                    }
                    if !settings.light_walls {
                        map.set_visible_at(idx, false);
                    }
                }
            }

            processed_cell += 1;
            scan += scan_step;
        }

        if settings.max_radius > 0 && state.iteration as u32 == settings.max_radius {
            done = true;
        }
        state.iteration += 1;
        state.obstacles_in_last_line = obstacles.len();
        ring += ring_step;
        if ring < 0 || ring >= ring_len {
            done = true;
        }
        if done {
            break;
        }
    }
}

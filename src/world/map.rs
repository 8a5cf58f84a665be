//! Map data structure
//!
//! The 2D grid the field of view engine reads transparency from and writes
//! visibility to.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, CellKind};
use crate::error::{FovError, MapError, MapResult};

/// A rectangular grid of cells stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMap")]
pub struct Map {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

/// Unvalidated form used while deserializing.
#[derive(Deserialize)]
struct RawMap {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl TryFrom<RawMap> for Map {
    type Error = MapError;

    fn try_from(raw: RawMap) -> MapResult<Self> {
        let expected = cell_count(raw.width, raw.height)?;
        if raw.cells.len() != expected {
            return Err(MapError::CellCount {
                width: raw.width,
                height: raw.height,
                expected,
                found: raw.cells.len(),
            });
        }
        Ok(Self {
            width: raw.width,
            height: raw.height,
            cells: raw.cells,
        })
    }
}

/// Cell count for a size. Row-major indices must fit in an `i32`.
fn cell_count(width: i32, height: i32) -> MapResult<usize> {
    match width.checked_mul(height) {
        Some(len) if width > 0 && height > 0 => Ok(len as usize),
        _ => Err(MapError::InvalidDimensions { width, height }),
    }
}

impl Map {
    /// Create a new map filled with opaque, non-walkable cells
    pub fn new(width: i32, height: i32) -> MapResult<Self> {
        let len = cell_count(width, height)?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| MapError::OutOfMemory { width, height })?;
        cells.resize(len, Cell::default());
        Ok(Self { width, height, cells })
    }

    /// Create a map where every cell has the same properties
    pub fn filled(width: i32, height: i32, kind: CellKind) -> MapResult<Self> {
        let mut map = Self::new(width, height)?;
        map.clear(kind.is_transparent(), kind.is_walkable());
        Ok(map)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false, a map has at least one cell. Kept as the partner of `len`.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Convert 2D coordinates to a row-major index, `None` when out of bounds.
    /// `width * height` fits in an `i32`, so this cannot overflow.
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    /// Convert a row-major index back to 2D coordinates
    #[inline]
    pub fn idx_to_xy(&self, idx: usize) -> (i32, i32) {
        let idx = idx as i32;
        (idx % self.width, idx / self.width)
    }

    /// Get the cell at a position
    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|idx| &self.cells[idx])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn out_of_bounds(&self, x: i32, y: i32) -> MapError {
        MapError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    /// Set the transparency and walkability of a cell
    pub fn set_properties(&mut self, x: i32, y: i32, transparent: bool, walkable: bool) -> MapResult<()> {
        let idx = self.index(x, y).ok_or_else(|| self.out_of_bounds(x, y))?;
        let cell = &mut self.cells[idx];
        cell.transparent = transparent;
        cell.walkable = walkable;
        Ok(())
    }

    /// Set a cell from a layout kind
    pub fn set_kind(&mut self, x: i32, y: i32, kind: CellKind) -> MapResult<()> {
        self.set_properties(x, y, kind.is_transparent(), kind.is_walkable())
    }

    /// Reset every cell to the given properties and clear visibility
    pub fn clear(&mut self, transparent: bool, walkable: bool) {
        self.cells.fill(Cell::new(transparent, walkable));
    }

    /// Copy every cell, visibility included, from a map of the same size
    pub fn copy_from(&mut self, other: &Map) -> MapResult<()> {
        if self.size() != other.size() {
            return Err(MapError::SizeMismatch {
                width: self.width,
                height: self.height,
                src_width: other.width,
                src_height: other.height,
            });
        }
        self.cells.copy_from_slice(&other.cells);
        Ok(())
    }

    /// Check if a position lets light through. Out of bounds is opaque.
    pub fn is_transparent(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).map_or(false, |c| c.transparent)
    }

    /// Check if a position is walkable
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).map_or(false, |c| c.walkable)
    }

    /// Check if a position was visible in the last field of view computation
    pub fn is_in_fov(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).map_or(false, |c| c.visible)
    }

    /// Clear all visibility flags
    pub fn clear_fov(&mut self) {
        for cell in &mut self.cells {
            cell.visible = false;
        }
    }

    #[inline]
    pub(crate) fn set_visible_at(&mut self, idx: usize, visible: bool) {
        self.cells[idx].visible = visible;
    }

    #[inline]
    pub(crate) fn cell_at(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    /// Number of cells currently visible
    pub fn visible_count(&self) -> usize {
        self.cells.iter().filter(|c| c.visible).count()
    }

    /// All visible positions in row-major order
    pub fn visible_positions(&self) -> Vec<(i32, i32)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.visible)
            .map(|(idx, _)| self.idx_to_xy(idx))
            .collect()
    }

    /// Get all walkable positions
    pub fn walkable_positions(&self) -> Vec<(i32, i32)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.walkable)
            .map(|(idx, _)| self.idx_to_xy(idx))
            .collect()
    }

    /// Recompute the visibility flags from an observer position.
    ///
    /// See [`crate::fov::compute_fov`].
    pub fn compute_fov(
        &mut self,
        origin_x: i32,
        origin_y: i32,
        max_radius: u32,
        light_walls: bool,
    ) -> Result<(), FovError> {
        crate::fov::compute_fov(self, origin_x, origin_y, max_radius, light_walls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty_dimensions() {
        assert_eq!(
            Map::new(0, 5),
            Err(MapError::InvalidDimensions { width: 0, height: 5 })
        );
        assert!(Map::new(3, -1).is_err());
    }

    #[test]
    fn test_new_rejects_sizes_past_index_range() {
        assert_eq!(
            Map::new(i32::MAX, i32::MAX),
            Err(MapError::InvalidDimensions { width: i32::MAX, height: i32::MAX })
        );
        assert!(Map::new(65536, 65536).is_err());
        assert!(Map::new(-2, -3).is_err());
    }

    #[test]
    fn test_deserialize_rejects_huge_dimensions() {
        let text = "(width: 2147483647, height: 2147483647, cells: [])";
        assert!(ron::from_str::<Map>(text).is_err());

        let text = "(width: 2147483647, height: 1, cells: [])";
        assert!(ron::from_str::<Map>(text).is_err());
    }

    #[test]
    fn test_index_is_row_major_and_bounds_checked() {
        let map = Map::new(4, 3).unwrap();
        assert_eq!(map.len(), 12);
        assert!(!map.is_empty());
        assert_eq!(map.index(0, 0), Some(0));
        assert_eq!(map.index(3, 0), Some(3));
        assert_eq!(map.index(0, 1), Some(4));
        assert_eq!(map.index(3, 2), Some(11));
        assert_eq!(map.index(4, 0), None);
        assert_eq!(map.index(-1, 0), None);
        assert_eq!(map.index(0, 3), None);
        assert_eq!(map.idx_to_xy(6), (2, 1));
    }

    #[test]
    fn test_set_properties() {
        let mut map = Map::new(3, 3).unwrap();
        assert!(!map.is_transparent(1, 1));

        map.set_properties(1, 1, true, false).unwrap();
        assert!(map.is_transparent(1, 1));
        assert!(!map.is_walkable(1, 1));

        map.set_kind(2, 2, CellKind::Door).unwrap();
        assert!(!map.is_transparent(2, 2));
        assert!(map.is_walkable(2, 2));

        assert_eq!(
            map.set_properties(3, 0, true, true),
            Err(MapError::OutOfBounds { x: 3, y: 0, width: 3, height: 3 })
        );
    }

    #[test]
    fn test_out_of_bounds_queries_are_false() {
        let map = Map::filled(2, 2, CellKind::Floor).unwrap();
        assert!(!map.is_transparent(-1, 0));
        assert!(!map.is_walkable(0, 2));
        assert!(!map.is_in_fov(5, 5));
        assert!(map.cell(2, 0).is_none());
    }

    #[test]
    fn test_clear_resets_visibility() {
        let mut map = Map::filled(3, 3, CellKind::Floor).unwrap();
        map.compute_fov(1, 1, 0, true).unwrap();
        assert_eq!(map.visible_count(), 9);

        map.clear(false, false);
        assert_eq!(map.visible_count(), 0);
        assert!(!map.is_transparent(0, 0));
    }

    #[test]
    fn test_copy_from() {
        let mut src = Map::new(3, 2).unwrap();
        src.set_kind(1, 1, CellKind::Window).unwrap();

        let mut dst = Map::filled(3, 2, CellKind::Floor).unwrap();
        dst.copy_from(&src).unwrap();
        assert_eq!(dst, src);

        let mut wrong = Map::new(2, 3).unwrap();
        assert!(matches!(wrong.copy_from(&src), Err(MapError::SizeMismatch { .. })));
    }

    #[test]
    fn test_serde_round_trip_skips_visibility() {
        let mut map = Map::filled(3, 2, CellKind::Floor).unwrap();
        map.set_kind(0, 0, CellKind::Wall).unwrap();
        map.compute_fov(1, 1, 0, true).unwrap();

        let text = ron::to_string(&map).unwrap();
        let loaded: Map = ron::from_str(&text).unwrap();
        assert_eq!(loaded.size(), (3, 2));
        assert!(!loaded.is_transparent(0, 0));
        assert!(loaded.is_transparent(1, 0));
        assert_eq!(loaded.visible_count(), 0);
    }

    #[test]
    fn test_deserialize_rejects_wrong_cell_count() {
        let text = "(width: 2, height: 2, cells: [(transparent: true, walkable: true)])";
        assert!(ron::from_str::<Map>(text).is_err());
    }
}

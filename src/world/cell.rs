//! Cell definitions
//!
//! Per-cell properties and the glyph vocabulary used by text layouts.

use serde::{Deserialize, Serialize};

/// A single cell in the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Light passes through this cell.
    pub transparent: bool,
    /// Not used by field of view, stored for pathfinding callers.
    pub walkable: bool,
    /// Output of the last field of view computation.
    #[serde(skip)]
    pub(crate) visible: bool,
}

impl Cell {
    pub fn new(transparent: bool, walkable: bool) -> Self {
        Self {
            transparent,
            walkable,
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The layout kind matching these properties.
    pub fn kind(&self) -> CellKind {
        match (self.transparent, self.walkable) {
            (true, true) => CellKind::Floor,
            (false, false) => CellKind::Wall,
            (true, false) => CellKind::Window,
            (false, true) => CellKind::Door,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        CellKind::Wall.into()
    }
}

impl From<CellKind> for Cell {
    fn from(kind: CellKind) -> Self {
        Cell::new(kind.is_transparent(), kind.is_walkable())
    }
}

/// Kinds of cells a layout can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Floor,
    Wall,
    /// See-through but blocks movement.
    Window,
    /// Closed door: blocks sight, can be walked through.
    Door,
}

impl CellKind {
    pub fn is_walkable(&self) -> bool {
        matches!(self, CellKind::Floor | CellKind::Door)
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, CellKind::Floor | CellKind::Window)
    }

    pub fn glyph(&self) -> char {
        match self {
            CellKind::Floor => '.',
            CellKind::Wall => '#',
            CellKind::Window => '=',
            CellKind::Door => '+',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(CellKind::Floor),
            '#' => Some(CellKind::Wall),
            '=' => Some(CellKind::Window),
            '+' => Some(CellKind::Door),
            _ => None,
        }
    }

    pub fn fg_color(&self) -> (u8, u8, u8) {
        match self {
            CellKind::Floor => (80, 80, 80),
            CellKind::Wall => (130, 110, 90),
            CellKind::Window => (120, 170, 200),
            CellKind::Door => (139, 90, 43),
        }
    }

    pub fn bg_color(&self) -> (u8, u8, u8) {
        match self {
            CellKind::Floor => (20, 18, 15),
            CellKind::Wall => (40, 35, 30),
            CellKind::Window => (15, 20, 30),
            CellKind::Door => (30, 25, 20),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_round_trip() {
        for kind in [CellKind::Floor, CellKind::Wall, CellKind::Window, CellKind::Door] {
            assert_eq!(CellKind::from_glyph(kind.glyph()), Some(kind));
            assert_eq!(Cell::from(kind).kind(), kind);
        }
        assert_eq!(CellKind::from_glyph('?'), None);
    }

    #[test]
    fn test_default_cell_is_wall() {
        let cell = Cell::default();
        assert!(!cell.transparent);
        assert!(!cell.walkable);
        assert!(!cell.is_visible());
    }
}

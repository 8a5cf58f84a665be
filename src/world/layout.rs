//! Text layouts
//!
//! Maps drawn as ASCII art, one glyph per cell. Used for hand-made test
//! rooms and for layout files opened by the viewer.

use super::cell::CellKind;
use super::map::Map;
use crate::error::{MapError, MapResult};

/// Glyph marking the observer. The cell underneath is floor.
pub const OBSERVER_GLYPH: char = '@';

/// A parsed layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub map: Map,
    /// Position of the `@` glyph, if any
    pub observer: Option<(i32, i32)>,
}

impl Layout {
    /// Parse a layout. Blank lines before and after the rows are ignored,
    /// trailing whitespace on each row is not.
    pub fn parse(text: &str) -> MapResult<Self> {
        let rows: Vec<&str> = text
            .lines()
            .skip_while(|line| line.trim().is_empty())
            .collect();
        let rows = match rows.iter().rposition(|line| !line.trim().is_empty()) {
            Some(last) => &rows[..=last],
            None => return Err(MapError::EmptyLayout),
        };

        let width = rows[0].chars().count();
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MapError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
        }

        let mut map = Map::new(width as i32, rows.len() as i32)?;
        let mut observer = None;

        for (row, line) in rows.iter().enumerate() {
            for (column, glyph) in line.chars().enumerate() {
                let (x, y) = (column as i32, row as i32);
                let kind = if glyph == OBSERVER_GLYPH {
                    if observer.replace((x, y)).is_some() {
                        return Err(MapError::MultipleObservers);
                    }
                    CellKind::Floor
                } else {
                    CellKind::from_glyph(glyph).ok_or(MapError::UnknownGlyph { glyph, column, row })?
                };
                map.set_kind(x, y, kind)?;
            }
        }

        log::debug!(
            "Parsed {}x{} layout (observer: {:?})",
            map.width(),
            map.height(),
            observer
        );

        Ok(Self { map, observer })
    }
}

/// Draw the map's cells as layout glyphs, ignoring visibility
pub fn render_map(map: &Map) -> String {
    render_with(map, None, |_, _| true)
}

/// Draw only the cells in the current field of view; everything else is a
/// space. The observer, when given, is drawn as `@`.
pub fn render_fov(map: &Map, observer: Option<(i32, i32)>) -> String {
    render_with(map, observer, |x, y| map.is_in_fov(x, y))
}

fn render_with(map: &Map, observer: Option<(i32, i32)>, shown: impl Fn(i32, i32) -> bool) -> String {
    let mut out = String::with_capacity(map.len() + map.height() as usize);
    for y in 0..map.height() {
        for x in 0..map.width() {
            let glyph = if observer == Some((x, y)) {
                OBSERVER_GLYPH
            } else if shown(x, y) {
                map.cell(x, y).map_or(' ', |c| c.kind().glyph())
            } else {
                ' '
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layout() {
        let layout = Layout::parse(
            "
#####
#.@=#
#+..#
#####
",
        )
        .unwrap();

        assert_eq!(layout.map.size(), (5, 4));
        assert_eq!(layout.observer, Some((2, 1)));
        assert!(layout.map.is_transparent(2, 1));
        assert!(layout.map.is_transparent(3, 1));
        assert!(!layout.map.is_walkable(3, 1));
        assert!(!layout.map.is_transparent(1, 2));
        assert!(layout.map.is_walkable(1, 2));
        assert!(!layout.map.is_transparent(0, 0));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Layout::parse("\n  \n"), Err(MapError::EmptyLayout));
        assert_eq!(
            Layout::parse("###\n##\n"),
            Err(MapError::RaggedRow { row: 1, expected: 3, found: 2 })
        );
        assert_eq!(
            Layout::parse("#.?\n"),
            Err(MapError::UnknownGlyph { glyph: '?', column: 2, row: 0 })
        );
        assert_eq!(Layout::parse("@.@\n"), Err(MapError::MultipleObservers));
    }

    #[test]
    fn test_render_map_round_trips() {
        let text = "#.=\n+..\n";
        let layout = Layout::parse(text).unwrap();
        assert_eq!(render_map(&layout.map), text);
    }

    #[test]
    fn test_render_fov_hides_unseen_cells() {
        let layout = Layout::parse("...\n...\n").unwrap();
        let mut map = layout.map;
        map.compute_fov(0, 0, 1, true).unwrap();
        assert_eq!(render_fov(&map, Some((0, 0))), "@. \n.. \n");
    }
}

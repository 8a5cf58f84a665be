//! Viewer application
//!
//! Walks an observer around a map and draws what it can see.

use anyhow::{anyhow, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{
    layout::{Constraint, Direction, Layout as Split, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::config::ViewerConfig;
use crate::fov::{compute_with, FovSettings};
use crate::world::generation::{generate_caves, pick_open_cell};
use crate::world::{Layout, Map};

/// Where the current map came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapSource {
    /// Loaded from a layout file
    File(String),
    /// Generated cave, with the seed used
    Cave(u64),
}

/// Interactive field of view viewer
pub struct App {
    map: Map,
    observer: (i32, i32),
    settings: FovSettings,
    /// Radius restored when unlimited sight is toggled off
    last_radius: u32,
    /// Cells seen at some point since the map was loaded
    explored: Vec<bool>,
    source: MapSource,
    config: ViewerConfig,
    rng: StdRng,
}

impl App {
    /// Open a parsed layout. Without an `@` the observer starts on the first walkable cell.
    pub fn from_layout(name: impl Into<String>, layout: Layout, config: ViewerConfig) -> Result<Self> {
        let observer = match layout.observer {
            Some(pos) => pos,
            None => layout
                .map
                .walkable_positions()
                .first()
                .copied()
                .ok_or_else(|| anyhow!("Layout has no walkable cell to stand on"))?,
        };
        let rng = seeded_rng(&config);
        Self::with_map(layout.map, observer, MapSource::File(name.into()), config, rng)
    }

    /// Start in a freshly generated cave
    pub fn from_cave(config: ViewerConfig) -> Result<Self> {
        let mut rng = seeded_rng(&config);
        let (map, observer, seed) = make_cave(&mut rng, &config)?;
        Self::with_map(map, observer, MapSource::Cave(seed), config, rng)
    }

    fn with_map(map: Map, observer: (i32, i32), source: MapSource, config: ViewerConfig, rng: StdRng) -> Result<Self> {
        let settings = config.fov_settings();
        let mut app = Self {
            explored: vec![false; map.len()],
            map,
            observer,
            last_radius: if settings.max_radius > 0 { settings.max_radius } else { 10 },
            settings,
            source,
            config,
            rng,
        };
        app.refresh()?;
        log::info!("Viewing {:?} from {:?}", app.source, app.observer);
        Ok(app)
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn observer(&self) -> (i32, i32) {
        self.observer
    }

    pub fn settings(&self) -> FovSettings {
        self.settings
    }

    pub fn is_explored(&self, x: i32, y: i32) -> bool {
        self.map.index(x, y).map_or(false, |idx| self.explored[idx])
    }

    /// Recompute the field of view and remember what is seen
    fn refresh(&mut self) -> Result<()> {
        compute_with(&mut self.map, self.observer, self.settings)?;
        for (seen, cell) in self.explored.iter_mut().zip(self.map.cells()) {
            *seen |= cell.is_visible();
        }
        Ok(())
    }

    /// Handle keyboard input, returns true if should quit
    pub fn handle_input(&mut self, key: KeyEvent) -> Result<bool> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Up | KeyCode::Char('k') => self.step(0, -1)?,
            KeyCode::Down | KeyCode::Char('j') => self.step(0, 1)?,
            KeyCode::Left | KeyCode::Char('h') => self.step(-1, 0)?,
            KeyCode::Right | KeyCode::Char('l') => self.step(1, 0)?,
            KeyCode::Char('y') => self.step(-1, -1)?,
            KeyCode::Char('u') => self.step(1, -1)?,
            KeyCode::Char('b') => self.step(-1, 1)?,
            KeyCode::Char('n') => self.step(1, 1)?,
            KeyCode::Char('+') | KeyCode::Char('=') => {
                // From unlimited, go back to the last bounded radius
                self.settings.max_radius = match self.settings.max_radius {
                    0 => self.last_radius,
                    radius => radius.saturating_add(1),
                };
                self.last_radius = self.settings.max_radius;
                self.refresh()?;
            }
            KeyCode::Char('-') => {
                if self.settings.max_radius > 1 {
                    self.settings.max_radius -= 1;
                    self.last_radius = self.settings.max_radius;
                    self.refresh()?;
                }
            }
            KeyCode::Char('0') => {
                self.settings.max_radius = if self.settings.max_radius == 0 { self.last_radius } else { 0 };
                self.refresh()?;
            }
            KeyCode::Char('w') => {
                self.settings.light_walls = !self.settings.light_walls;
                log::debug!("Light walls: {}", self.settings.light_walls);
                self.refresh()?;
            }
            KeyCode::Char('g') => self.regenerate()?,
            _ => {}
        }

        Ok(false)
    }

    /// Move the observer, refusing cells that can't be walked on
    fn step(&mut self, dx: i32, dy: i32) -> Result<()> {
        let (x, y) = (self.observer.0 + dx, self.observer.1 + dy);
        if self.map.is_walkable(x, y) {
            self.observer = (x, y);
            self.refresh()?;
        }
        Ok(())
    }

    /// Replace the map with a new cave
    fn regenerate(&mut self) -> Result<()> {
        let (map, observer, seed) = make_cave(&mut self.rng, &self.config)?;
        self.explored = vec![false; map.len()];
        self.map = map;
        self.observer = observer;
        self.source = MapSource::Cave(seed);
        log::info!("Regenerated cave with seed {}", seed);
        self.refresh()
    }

    pub fn render(&self, frame: &mut Frame) {
        let chunks = Split::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(frame.area());

        self.render_map(frame, chunks[0]);
        self.render_status(frame, chunks[1]);
    }

    fn render_map(&self, frame: &mut Frame, area: Rect) {
        let title = match &self.source {
            MapSource::File(name) => format!(" {} ", name),
            MapSource::Cave(seed) => format!(" Cave #{} ", seed),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Rgb(104, 88, 72)));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let view_width = inner.width as i32;
        let view_height = inner.height as i32;
        let cam_x = self.observer.0 - view_width / 2;
        let cam_y = self.observer.1 - view_height / 2;

        let buf = frame.buffer_mut();
        for screen_y in 0..view_height {
            for screen_x in 0..view_width {
                let (map_x, map_y) = (cam_x + screen_x, cam_y + screen_y);
                let cell_x = inner.x + screen_x as u16;
                let cell_y = inner.y + screen_y as u16;

                let Some(cell) = self.map.cell(map_x, map_y) else {
                    buf[(cell_x, cell_y)].set_char(' ');
                    continue;
                };

                if (map_x, map_y) == self.observer {
                    buf[(cell_x, cell_y)]
                        .set_char('@')
                        .set_fg(Color::Rgb(255, 220, 120))
                        .set_bg(Color::Rgb(20, 18, 15));
                } else if cell.is_visible() || self.is_explored(map_x, map_y) {
                    let kind = cell.kind();
                    let dim = if cell.is_visible() { 1 } else { 3 };
                    let (fr, fg, fb) = kind.fg_color();
                    let (br, bg, bb) = kind.bg_color();
                    buf[(cell_x, cell_y)]
                        .set_char(kind.glyph())
                        .set_fg(Color::Rgb(fr / dim, fg / dim, fb / dim))
                        .set_bg(Color::Rgb(br / dim, bg / dim, bb / dim));
                } else {
                    buf[(cell_x, cell_y)].set_char(' ');
                }
            }
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let radius = match self.settings.max_radius {
            0 => "unlimited".to_string(),
            r => r.to_string(),
        };
        let label = Style::default().fg(Color::Gray);
        let value = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

        let line = Line::from(vec![
            Span::styled("Pos ", label),
            Span::styled(format!("{},{}", self.observer.0, self.observer.1), value),
            Span::styled("  Radius ", label),
            Span::styled(radius, value),
            Span::styled("  Walls ", label),
            Span::styled(if self.settings.light_walls { "lit" } else { "dark" }, value),
            Span::styled("  Seen ", label),
            Span::styled(self.map.visible_count().to_string(), value),
            Span::styled("  [hjklyubn] move [+/-/0] radius [w] walls [g] new cave [q] quit", label),
        ]);

        let status = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(status, area);
    }
}

fn seeded_rng(config: &ViewerConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Generate a cave and a spot to stand on
fn make_cave(rng: &mut StdRng, config: &ViewerConfig) -> Result<(Map, (i32, i32), u64)> {
    use rand::Rng;

    let seed: u64 = rng.gen();
    let mut cave_rng = StdRng::seed_from_u64(seed);
    let map = generate_caves(&mut cave_rng, config.cave_width, config.cave_height, config.cave_fill)?;
    let observer = pick_open_cell(&mut cave_rng, &map).ok_or_else(|| anyhow!("Generated cave has no open cell"))?;
    Ok((map, observer, seed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn corridor_app() -> App {
        let layout = Layout::parse(
            "
#######
#@..#.#
#######
",
        )
        .unwrap();
        let config = ViewerConfig { radius: 2, seed: Some(5), ..ViewerConfig::default() };
        App::from_layout("corridor", layout, config).unwrap()
    }

    #[test]
    fn test_initial_view() {
        let app = corridor_app();
        assert_eq!(app.observer(), (1, 1));
        assert!(app.map().is_in_fov(3, 1));
        assert!(!app.map().is_in_fov(4, 1));
    }

    #[test]
    fn test_movement_blocked_by_walls() {
        let mut app = corridor_app();
        assert!(!app.handle_input(key(KeyCode::Up)).unwrap());
        assert_eq!(app.observer(), (1, 1));

        app.handle_input(key(KeyCode::Char('l'))).unwrap();
        app.handle_input(key(KeyCode::Right)).unwrap();
        app.handle_input(key(KeyCode::Right)).unwrap();
        assert_eq!(app.observer(), (3, 1));
        assert!(app.map().is_in_fov(4, 1));
    }

    #[test]
    fn test_explored_cells_are_remembered() {
        let mut app = corridor_app();
        assert!(app.is_explored(3, 1));
        app.handle_input(key(KeyCode::Char('-'))).unwrap();
        assert_eq!(app.settings().max_radius, 1);
        assert!(!app.map().is_in_fov(3, 1));
        assert!(app.is_explored(3, 1));
    }

    #[test]
    fn test_toggles() {
        let mut app = corridor_app();
        app.handle_input(key(KeyCode::Char('0'))).unwrap();
        assert_eq!(app.settings().max_radius, 0);
        app.handle_input(key(KeyCode::Char('0'))).unwrap();
        assert_eq!(app.settings().max_radius, 2);

        app.handle_input(key(KeyCode::Char('w'))).unwrap();
        assert!(!app.settings().light_walls);
        assert!(!app.map().is_in_fov(1, 0));
    }

    #[test]
    fn test_grow_radius_from_unlimited_restores_last_radius() {
        let mut app = corridor_app();
        app.handle_input(key(KeyCode::Char('0'))).unwrap();
        assert!(app.map().is_in_fov(4, 1));

        app.handle_input(key(KeyCode::Char('+'))).unwrap();
        assert_eq!(app.settings().max_radius, 2);
        assert!(app.map().is_in_fov(3, 1));
        assert!(!app.map().is_in_fov(4, 1));

        app.handle_input(key(KeyCode::Char('+'))).unwrap();
        assert_eq!(app.settings().max_radius, 3);
        assert!(app.map().is_in_fov(4, 1));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = corridor_app();
        assert!(app.handle_input(key(KeyCode::Char('q'))).unwrap());
        assert!(app.handle_input(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)).unwrap());
    }

    #[test]
    fn test_cave_regeneration() {
        let config = ViewerConfig { cave_width: 30, cave_height: 20, seed: Some(9), ..ViewerConfig::default() };
        let mut app = App::from_cave(config).unwrap();
        let first = app.source.clone();
        let (x, y) = app.observer();
        assert!(app.map().is_in_fov(x, y));

        app.handle_input(key(KeyCode::Char('g'))).unwrap();
        assert_ne!(app.source, first);
        let (x, y) = app.observer();
        assert!(app.map().is_walkable(x, y));
    }

    #[test]
    fn test_layout_without_walkable_cell() {
        let layout = Layout::parse("###\n").unwrap();
        assert!(App::from_layout("walls", layout, ViewerConfig::default()).is_err());
    }
}

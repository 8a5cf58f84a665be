//! Shadowsight - Entry Point
//!
//! Opens a layout file (or generates a cave), then runs the interactive
//! field of view viewer in the terminal.

use std::fs::{self, OpenOptions};
use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use shadowsight::config::ViewerConfig;
use shadowsight::ui::App;
use shadowsight::world::Layout;

/// How long to wait for input before redrawing
const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn main() -> Result<()> {
    // Log to a file so the TUI stays clean
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("shadowsight.log")
        .context("Failed to open shadowsight.log")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    log::info!("Starting Shadowsight v{}", env!("CARGO_PKG_VERSION"));

    let config = ViewerConfig::load();
    let mut app = match std::env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;
            let layout = Layout::parse(&text).with_context(|| format!("Failed to parse {}", path))?;
            App::from_layout(path, layout, config)?
        }
        None => App::from_cave(config)?,
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Viewer exited with error: {}", e);
        eprintln!("Error: {}", e);
    }

    log::info!("Shadowsight shut down cleanly");
    result
}

/// Draw, then wait for a key
fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events, not releases
                if key.kind == KeyEventKind::Press && app.handle_input(key)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

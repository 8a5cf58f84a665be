//! User Interface module
//!
//! Terminal viewer built on ratatui.

pub mod app;

pub use app::{App, MapSource};

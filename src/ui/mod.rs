//! UI rendering module for the weather dashboard
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components. Rendering only reads [`App`].

pub mod charts;
pub mod dashboard;
pub mod help_overlay;

use ratatui::Frame;

use crate::app::App;

pub use help_overlay::render as render_help_overlay;

/// Draws the whole screen for the current application state
pub fn render(frame: &mut Frame, app: &App) {
    dashboard::render(frame, app);

    if app.show_help {
        render_help_overlay(frame);
    }
}

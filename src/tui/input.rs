//! Input handling for the TUI.
//!
//! Processes keyboard events and updates application state.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::AppMode;
use crate::App;

/// Handle keyboard events.
pub fn handle_events(key: KeyEvent, app: &mut App) {
    // Ctrl+C quits from anywhere
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode {
        AppMode::Help => handle_help_mode(key, app),
        AppMode::Normal => handle_normal_mode(key, app),
    }
}

/// Handle input in help mode.
fn handle_help_mode(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('?' | 'q') | KeyCode::Enter => app.dismiss_help(),
        _ => {}
    }
}

/// Handle input while walking the key.
fn handle_normal_mode(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.quit(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => app.select_next(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.choose_selected(),
        KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h' | 'b') => app.go_back(),
        KeyCode::Char('r') => app.restart(),
        KeyCode::Char('?') => app.show_help(),
        KeyCode::Char(c @ '1'..='9') => {
            app.choose_number(c.to_digit(10).map_or(0, |d| d as usize));
        }
        _ => {}
    }
}

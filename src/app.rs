//! Application state for the terminal navigator.
//!
//! The `App` struct wraps a [`Navigator`] with everything the TUI needs on
//! top of it: the highlighted option, the current screen and status line.

use std::sync::Arc;

use crate::core::UiConfig;
use crate::key::KeyStore;
use crate::navigator::{NavState, Navigator};
use crate::tui::Theme;

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// The walk in progress
    pub navigator: Navigator,

    /// Name shown in the header (genus or file name)
    pub title: String,

    /// Highlighted option (index into the current options)
    pub selected: usize,

    /// Highlight positions to restore when going back
    selection_history: Vec<usize>,

    /// Current mode of the application
    pub mode: AppMode,

    /// Whether the application should quit
    pub should_quit: bool,

    /// Status message to display (if any)
    pub status_message: Option<String>,

    /// Current UI theme
    pub theme: Theme,

    /// Whether options are prefixed with their step id
    pub show_ids: bool,
}

/// Application modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Walking the key
    #[default]
    Normal,

    /// Showing help screen
    Help,
}

impl App {
    /// Create a navigator app over a loaded key.
    pub fn new(store: impl Into<Arc<KeyStore>>, title: impl Into<String>, ui: &UiConfig) -> Self {
        Self {
            navigator: Navigator::new(store),
            title: title.into(),
            selected: 0,
            selection_history: Vec::new(),
            mode: AppMode::Normal,
            should_quit: false,
            status_message: None,
            theme: Theme::by_name(&ui.theme),
            show_ids: ui.show_ids,
        }
    }

    pub fn state(&self) -> &NavState {
        self.navigator.state()
    }

    pub fn option_count(&self) -> usize {
        self.navigator.options().len()
    }

    pub fn select_next(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    pub fn select_previous(&mut self) {
        let count = self.option_count();
        if count > 0 {
            self.selected = self.selected.checked_sub(1).unwrap_or(count - 1);
        }
    }

    /// Follow the highlighted option.
    pub fn choose_selected(&mut self) {
        self.choose(self.selected);
    }

    /// Follow option `number` as displayed (1-based).
    pub fn choose_number(&mut self, number: usize) {
        if let Some(index) = number.checked_sub(1) {
            self.choose(index);
        }
    }

    fn choose(&mut self, index: usize) {
        match self.navigator.select(index) {
            Ok(state) => {
                self.status_message = match state {
                    NavState::MissingStep { target, .. } => {
                        Some(format!("Step {target} is missing from this key"))
                    }
                    NavState::GotoCycle { id } => Some(format!("Steps loop back to {id}")),
                    _ => None,
                };
                self.selection_history.push(index);
                self.selected = 0;
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// Go back one step. Ignored when there is nowhere to go back to.
    pub fn go_back(&mut self) {
        if self.navigator.back() {
            self.selected = self.selection_history.pop().unwrap_or(0);
            self.status_message = None;
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.navigator.can_go_back()
    }

    pub fn restart(&mut self) {
        self.navigator.restart();
        self.selection_history.clear();
        self.selected = 0;
        self.status_message = Some("Restarted from the first step".to_string());
    }

    pub fn show_help(&mut self) {
        self.mode = AppMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.mode = AppMode::Normal;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{build, parse_document, StepId};

    fn app(text: &str) -> App {
        App::new(build(parse_document(text)).store, "Test", &UiConfig::default())
    }

    fn id(s: &str) -> StepId {
        StepId::parse(s).unwrap()
    }

    const KEY: &str = "1. A\n1'. B\n2'. C\n2''. D 9\n";

    #[test]
    fn test_selection_wraps() {
        let mut app = app(KEY);
        assert_eq!(app.option_count(), 2);
        app.select_previous();
        assert_eq!(app.selected, 1);
        app.select_next();
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_choose_and_go_back_restores_highlight() {
        let mut app = app(KEY);
        app.select_next();
        app.choose_selected();
        assert_eq!(app.state(), &NavState::Browsing { id: id("2'") });
        assert_eq!(app.selected, 0);

        app.go_back();
        assert_eq!(app.state(), &NavState::Browsing { id: id("1") });
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn test_missing_step_sets_status() {
        let mut app = app(KEY);
        app.choose_number(2);
        app.choose_number(1);
        assert!(app.state().is_degraded());
        assert!(app.status_message.as_deref().unwrap().contains('9'));
    }

    #[test]
    fn test_invalid_number_is_reported() {
        let mut app = app(KEY);
        app.choose_number(7);
        assert!(app.status_message.is_some());
        assert_eq!(app.state(), &NavState::Browsing { id: id("1") });
        app.choose_number(0);
        assert_eq!(app.state(), &NavState::Browsing { id: id("1") });
    }

    #[test]
    fn test_back_without_history_is_noop() {
        let mut app = app(KEY);
        assert!(!app.can_go_back());
        app.go_back();
        assert_eq!(app.state(), &NavState::Browsing { id: id("1") });
    }

    #[test]
    fn test_restart() {
        let mut app = app(KEY);
        app.choose_number(2);
        app.restart();
        assert!(!app.can_go_back());
        assert_eq!(app.selected, 0);
    }
}

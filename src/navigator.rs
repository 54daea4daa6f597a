//! Interactive key walker.
//!
//! A [`Navigator`] starts at the entry root of a key and moves through it one
//! selection at a time, keeping its own back-history. Presentation layers
//! (the terminal UI, scripted walks) only read its state and call
//! [`Navigator::select`] and [`Navigator::back`].

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use crate::key::{Goto, KeyStore, Node, StepId};

/// Where the walk currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    /// At a step with child options
    Browsing { id: StepId },
    /// Reached a concluding step; its text is the identification
    Terminal { id: StepId },
    /// A goto led to a step that is not in the key
    MissingStep { from: StepId, target: StepId },
    /// A chain of gotos came back to a step it already passed through
    GotoCycle { id: StepId },
    /// The key has no root to start from
    Empty,
}

impl NavState {
    /// True for every state that ends the walk, degraded or not.
    pub fn is_final(&self) -> bool {
        !matches!(self, Self::Browsing { .. })
    }

    /// True for states that must not be shown as a normal result.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::MissingStep { .. } | Self::GotoCycle { .. } | Self::Empty)
    }

    /// The step the state refers to, if any.
    pub fn id(&self) -> Option<&StepId> {
        match self {
            Self::Browsing { id } | Self::Terminal { id } | Self::GotoCycle { id } => Some(id),
            Self::MissingStep { from, .. } => Some(from),
            Self::Empty => None,
        }
    }
}

/// Navigation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("No options to choose from here")]
    NotBrowsing,

    #[error("Option {index} does not exist ({available} available)")]
    NoSuchOption { index: usize, available: usize },

    #[error("Step {0} is not an option here")]
    NotAnOption(StepId),
}

/// Stateful walker over one key.
#[derive(Debug, Clone)]
pub struct Navigator {
    store: Arc<KeyStore>,
    state: NavState,
    history: Vec<StepId>,
}

impl Navigator {
    /// Start a walk at the key's entry root.
    pub fn new(store: impl Into<Arc<KeyStore>>) -> Self {
        let store = store.into();
        let state = match store.entry_root() {
            Some(root) => resolve(&store, &root.id, false),
            None => NavState::Empty,
        };
        Self { store, state, history: Vec::new() }
    }

    pub fn store(&self) -> &KeyStore {
        &self.store
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    /// The node the walk stands on, if it exists.
    pub fn current(&self) -> Option<&Node> {
        match &self.state {
            NavState::Browsing { id } | NavState::Terminal { id } => self.store.get(id),
            _ => None,
        }
    }

    /// Child options of the current step, in document order. Empty outside
    /// the Browsing state.
    pub fn options(&self) -> Vec<&Node> {
        match &self.state {
            NavState::Browsing { id } => self.store.children(id).collect(),
            _ => Vec::new(),
        }
    }

    /// Identification text once a Terminal state is reached.
    pub fn result(&self) -> Option<&str> {
        match &self.state {
            NavState::Terminal { id } => self.store.get(id).map(|n| n.text.as_str()),
            _ => None,
        }
    }

    /// Choose the option at `index` (0-based).
    pub fn select(&mut self, index: usize) -> Result<&NavState, NavError> {
        let NavState::Browsing { id } = &self.state else {
            return Err(NavError::NotBrowsing);
        };

        let options: Vec<_> = self.store.children(id).map(|n| n.id.clone()).collect();
        let chosen = options
            .get(index)
            .cloned()
            .ok_or(NavError::NoSuchOption { index, available: options.len() })?;

        Ok(self.enter(chosen))
    }

    /// Choose the option with the given id.
    pub fn select_id(&mut self, option: &StepId) -> Result<&NavState, NavError> {
        let NavState::Browsing { id } = &self.state else {
            return Err(NavError::NotBrowsing);
        };
        if !self.store.children(id).any(|n| &n.id == option) {
            return Err(NavError::NotAnOption(option.clone()));
        }
        Ok(self.enter(option.clone()))
    }

    fn enter(&mut self, chosen: StepId) -> &NavState {
        if let NavState::Browsing { id } = &self.state {
            self.history.push(id.clone());
        }
        self.state = resolve(&self.store, &chosen, true);
        tracing::debug!(chosen = %chosen, state = ?self.state, "Selected option");
        &self.state
    }

    /// Return to the previous step. Does nothing when there is no history.
    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.state = NavState::Browsing { id: previous };
                true
            }
            None => false,
        }
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Drop the history and start over at the entry root.
    pub fn restart(&mut self) {
        self.history.clear();
        self.state = match self.store.entry_root() {
            Some(root) => resolve(&self.store, &root.id, false),
            None => NavState::Empty,
        };
    }

    /// Steps visited so far followed by the current one.
    pub fn path(&self) -> Vec<&StepId> {
        self.history.iter().chain(self.state.id()).collect()
    }

    pub fn history(&self) -> &[StepId] {
        &self.history
    }
}

/// State of arriving at `id`. A chosen step that names a successor jumps to
/// it even when it has children of its own. Where the walk lands, a step with
/// children is browsed, a concluding step is a result, and a childless step
/// with a goto is jumped through.
fn resolve(store: &KeyStore, id: &StepId, chosen: bool) -> NavState {
    let mut seen = HashSet::new();
    let mut from = id.clone();
    let mut current = id.clone();
    let mut jump_first = chosen;

    loop {
        let Some(node) = store.get(&current) else {
            return NavState::MissingStep { from, target: current };
        };
        let has_children = store.has_children(&node.id);
        let next = node.goto.step().filter(|_| jump_first || !has_children).cloned();
        jump_first = false;

        match next {
            None if has_children => return NavState::Browsing { id: current },
            None => return NavState::Terminal { id: current },
            Some(next) => {
                if !seen.insert(current.clone()) {
                    return NavState::GotoCycle { id: current };
                }
                from = current;
                current = next;
            }
        }
    }
}

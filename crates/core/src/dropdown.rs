//! Dropdown overlay state machine.
//!
//! The overlay is either closed or showing one of two mutually exclusive
//! views in the same slot: hot recommendations (blank query) or suggestions.
//! The visible mode is derived, never stored.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DropdownMode {
    Closed,
    Hot,
    Suggest,
}

impl DropdownMode {
    /// Pure mapping from focus and query emptiness to the visible view.
    pub fn derive(has_focus: bool, query_is_empty: bool) -> Self {
        match (has_focus, query_is_empty) {
            (false, _) => DropdownMode::Closed,
            (true, true) => DropdownMode::Hot,
            (true, false) => DropdownMode::Suggest,
        }
    }
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownEffect {
    /// Make sure hot recommendations are loaded.
    LoadHot,
    /// Make sure suggestions exist for the current query (reuse allowed).
    EnsureSuggestions,
    /// Start a fresh suggestion request for the settled query.
    RequestSuggestions,
}

#[derive(Debug)]
pub struct DropdownMachine {
    open: bool,
    query_is_empty: bool,
}

impl DropdownMachine {
    pub fn new() -> Self {
        Self {
            open: false,
            query_is_empty: true,
        }
    }

    pub fn mode(&self) -> DropdownMode {
        DropdownMode::derive(self.open, self.query_is_empty)
    }

    pub fn on_focus(&mut self, query: &str) -> DropdownEffect {
        self.open = true;
        self.query_is_empty = query.trim().is_empty();
        if self.query_is_empty {
            DropdownEffect::LoadHot
        } else {
            DropdownEffect::EnsureSuggestions
        }
    }

    /// Debounced query arrived. A closed overlay stays closed and asks for nothing.
    pub fn on_query_settled(&mut self, query: &str) -> Option<DropdownEffect> {
        self.query_is_empty = query.trim().is_empty();
        match (self.open, self.query_is_empty) {
            (false, _) => None,
            (true, true) => Some(DropdownEffect::LoadHot),
            (true, false) => Some(DropdownEffect::RequestSuggestions),
        }
    }

    /// Escape or pointer-down outside input and overlay.
    pub fn on_dismiss(&mut self) {
        self.open = false;
    }

    /// Enter, submit, or any pick. The caller runs the search afterwards.
    pub fn on_commit(&mut self, query: &str) {
        self.open = false;
        self.query_is_empty = query.trim().is_empty();
    }

    /// Explicit clear: the query is now blank.
    pub fn on_clear(&mut self) -> Option<DropdownEffect> {
        self.query_is_empty = true;
        self.open.then_some(DropdownEffect::LoadHot)
    }
}

impl Default for DropdownMachine {
    fn default() -> Self {
        Self::new()
    }
}

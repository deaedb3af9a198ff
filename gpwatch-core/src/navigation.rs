//! Selection cursor over the ordered symbol list.
//!
//! Movement wraps in both directions. The list is fixed for the lifetime of a
//! session, and an empty list is rejected up front so movement never has to
//! deal with it.

use crate::domain::Symbol;

#[derive(Debug, Clone)]
pub struct NavigationState {
    symbols: Vec<Symbol>,
    selected: usize,
}

impl NavigationState {
    /// Cursor at the first symbol. Returns `None` for an empty list.
    pub fn new(symbols: Vec<Symbol>) -> Option<Self> {
        if symbols.is_empty() {
            return None;
        }
        Some(Self {
            symbols,
            selected: 0,
        })
    }

    pub fn move_up(&mut self) {
        let len = self.symbols.len();
        self.selected = (self.selected + len - 1) % len;
    }

    pub fn move_down(&mut self) {
        self.selected = (self.selected + 1) % self.symbols.len();
    }

    pub fn selected(&self) -> &Symbol {
        &self.symbols[self.selected]
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn is_selected(&self, index: usize) -> bool {
        index == self.selected
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

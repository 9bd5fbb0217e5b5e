//! Page history with back/forward navigation.

use crate::id::ClassName;
use crate::sync::lock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Mutex;

/// Default maximum number of history entries.
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// One shown page and the arguments it was shown with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The page class.
    pub class: ClassName,
    /// Arguments passed to `showPage`.
    pub args: Value,
}

#[derive(Debug, Default)]
struct HistoryState {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
}

/// Bounded, cursor-based page history.
///
/// A push that adds an entry drops everything ahead of the cursor and
/// leaves the cursor on the new entry. Pushing the entry the cursor already
/// points at is ignored entirely: the forward entries survive, which is what
/// lets back/forward navigation re-show pages without losing its place.
#[derive(Debug)]
pub struct PageHistory {
    state: Mutex<HistoryState>,
    limit: usize,
}

impl PageHistory {
    /// A history holding at most [`DEFAULT_HISTORY_LIMIT`] entries.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// A history holding at most `limit` entries (at least one).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            state: Mutex::new(HistoryState::default()),
            limit: limit.max(1),
        }
    }

    /// Record that `class` was shown with `args`. Returns whether an entry
    /// was added.
    pub fn push(&self, class: &ClassName, args: Value) -> bool {
        let entry = HistoryEntry {
            class: class.clone(),
            args,
        };
        let mut state = lock(&self.state);
        if let Some(cursor) = state.cursor {
            if state.entries[cursor] == entry {
                return false;
            }
            state.entries.truncate(cursor + 1);
        }
        state.entries.push(entry);
        if state.entries.len() > self.limit {
            let overflow = state.entries.len() - self.limit;
            state.entries.drain(..overflow);
        }
        state.cursor = Some(state.entries.len() - 1);
        true
    }

    /// Step back and return the entry now under the cursor.
    pub fn back(&self) -> Option<HistoryEntry> {
        let mut state = lock(&self.state);
        let cursor = state.cursor.filter(|c| *c > 0)? - 1;
        state.cursor = Some(cursor);
        Some(state.entries[cursor].clone())
    }

    /// Step forward and return the entry now under the cursor.
    pub fn forward(&self) -> Option<HistoryEntry> {
        let mut state = lock(&self.state);
        let cursor = state.cursor.filter(|c| c + 1 < state.entries.len())? + 1;
        state.cursor = Some(cursor);
        Some(state.entries[cursor].clone())
    }

    /// Whether [`back`](Self::back) would move.
    pub fn can_go_back(&self) -> bool {
        lock(&self.state).cursor.is_some_and(|c| c > 0)
    }

    /// Whether [`forward`](Self::forward) would move.
    pub fn can_go_forward(&self) -> bool {
        let state = lock(&self.state);
        state.cursor.is_some_and(|c| c + 1 < state.entries.len())
    }

    /// The entry under the cursor.
    pub fn current(&self) -> Option<HistoryEntry> {
        let state = lock(&self.state);
        state.cursor.map(|c| state.entries[c].clone())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    /// True if nothing was ever shown.
    pub fn is_empty(&self) -> bool {
        lock(&self.state).entries.is_empty()
    }

    /// Forget everything.
    pub fn clear(&self) {
        *lock(&self.state) = HistoryState::default();
    }
}

impl Default for PageHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Undo/redo history
///
/// A bounded linear history of before/after snapshots with a single cursor.
/// Entries at or before the cursor can be undone, entries after it redone.
/// Recording after an undo discards the redoable tail.

pub mod snapshot;

pub use snapshot::{CollectionKind, HistoryAction, Snapshot};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of retained history entries
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One recorded mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry<S> {
    pub action: HistoryAction,
    pub prev_state: S,
    pub new_state: S,
    pub timestamp: DateTime<Utc>,
}

impl<S> HistoryEntry<S> {
    pub fn new(action: HistoryAction, prev_state: S, new_state: S) -> Self {
        Self {
            action,
            prev_state,
            new_state,
            timestamp: Utc::now(),
        }
    }
}

/// Outcome of an undo or redo request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    Undone(HistoryAction),
    Redone(HistoryAction),
    NothingToUndo,
    NothingToRedo,
}

impl HistoryOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, HistoryOutcome::Undone(_) | HistoryOutcome::Redone(_))
    }

    /// Short user-facing notice
    pub fn message(&self) -> String {
        match self {
            HistoryOutcome::Undone(action) => format!("Undid {}", action),
            HistoryOutcome::Redone(action) => format!("Redid {}", action),
            HistoryOutcome::NothingToUndo => "Nothing to undo".to_string(),
            HistoryOutcome::NothingToRedo => "Nothing to redo".to_string(),
        }
    }
}

/// Bounded undo/redo stack
#[derive(Debug, Clone)]
pub struct HistoryManager<S> {
    entries: VecDeque<HistoryEntry<S>>,
    /// Index of the last applied entry; -1 when nothing can be undone
    cursor: isize,
    limit: usize,
    applying: bool,
}

impl<S> Default for HistoryManager<S> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl<S> HistoryManager<S> {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            cursor: -1,
            limit: limit.max(1),
            applying: false,
        }
    }

    /// Record a mutation
    ///
    /// Returns false (and records nothing) while a snapshot is being applied.
    pub fn record(&mut self, entry: HistoryEntry<S>) -> bool {
        if self.applying {
            return false;
        }

        self.entries.truncate((self.cursor + 1) as usize);
        self.entries.push_back(entry);
        self.cursor += 1;

        while self.entries.len() > self.limit {
            self.entries.pop_front();
            self.cursor -= 1;
        }
        self.cursor = self.cursor.max(-1);

        true
    }

    /// Hand the previous snapshot of the entry under the cursor to `apply`
    pub fn undo<F>(&mut self, apply: F) -> HistoryOutcome
    where
        F: FnOnce(&S),
    {
        if self.cursor < 0 {
            return HistoryOutcome::NothingToUndo;
        }

        let index = self.cursor as usize;
        self.applying = true;
        let action = {
            let entry = &self.entries[index];
            apply(&entry.prev_state);
            entry.action
        };
        self.applying = false;
        self.cursor -= 1;

        HistoryOutcome::Undone(action)
    }

    /// Hand the new snapshot of the entry after the cursor to `apply`
    pub fn redo<F>(&mut self, apply: F) -> HistoryOutcome
    where
        F: FnOnce(&S),
    {
        if !self.can_redo() {
            return HistoryOutcome::NothingToRedo;
        }

        let index = (self.cursor + 1) as usize;
        self.applying = true;
        let action = {
            let entry = &self.entries[index];
            apply(&entry.new_state);
            entry.action
        };
        self.applying = false;
        self.cursor += 1;

        HistoryOutcome::Redone(action)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len() as isize
    }

    pub fn is_applying(&self) -> bool {
        self.applying
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry<S>> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = -1;
    }
}

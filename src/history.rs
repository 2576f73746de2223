//! Linear undo/redo stack of full-model snapshots.

use std::time::SystemTime;

use tracing::{debug, warn};

use crate::error::HistoryError;
use crate::model::{ChangeEvent, ModelDoc};

/// One recorded state: the action that produced it and the model after it.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub action: String,
    pub snapshot: ModelDoc,
    pub timestamp: SystemTime,
}

/// Linear history. Recording after an undo discards the redo branch.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    limit: Option<usize>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A history that keeps at most `limit` entries, evicting the oldest.
    #[must_use]
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit: limit.filter(|&n| n > 0),
            ..Self::default()
        }
    }

    /// Appends an entry after the cursor and moves the cursor onto it.
    ///
    /// Returns `false` (and records nothing) for an empty action label.
    pub fn record(&mut self, action: impl Into<String>, snapshot: ModelDoc) -> bool {
        let action = action.into();
        if action.is_empty() {
            warn!("ignoring history record without an action label");
            return false;
        }
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        debug!(%action, index = self.entries.len(), "history record");
        self.entries.push(HistoryEntry {
            action,
            snapshot,
            timestamp: SystemTime::now(),
        });
        if let Some(limit) = self.limit {
            let excess = self.entries.len().saturating_sub(limit);
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
        true
    }

    /// Records a model change notification.
    pub fn record_change(&mut self, change: &ChangeEvent) -> bool {
        self.record(change.action.clone(), change.snapshot.clone())
    }

    /// Steps the cursor back and returns the entry to restore.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Empty`] or [`HistoryError::NothingToUndo`];
    /// the cursor is unchanged.
    pub fn undo(&mut self) -> Result<&HistoryEntry, HistoryError> {
        if self.entries.is_empty() {
            return Err(HistoryError::Empty);
        }
        if self.cursor == 0 {
            return Err(HistoryError::NothingToUndo);
        }
        self.cursor -= 1;
        Ok(&self.entries[self.cursor])
    }

    /// Steps the cursor forward and returns the entry to restore.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Empty`] or [`HistoryError::NothingToRedo`];
    /// the cursor is unchanged.
    pub fn redo(&mut self) -> Result<&HistoryEntry, HistoryError> {
        if self.entries.is_empty() {
            return Err(HistoryError::Empty);
        }
        if self.cursor + 1 >= self.entries.len() {
            return Err(HistoryError::NothingToRedo);
        }
        self.cursor += 1;
        Ok(&self.entries[self.cursor])
    }

    /// Moves the cursor to `index` and returns that entry.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::IndexOutOfRange`] unless `index < len()`.
    pub fn jump_to(&mut self, index: usize) -> Result<&HistoryEntry, HistoryError> {
        if index >= self.entries.len() {
            return Err(HistoryError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        self.cursor = index;
        Ok(&self.entries[index])
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Index of the current entry, `None` while empty.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    #[must_use]
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    #[must_use]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn doc(name: &str) -> ModelDoc {
        ModelDoc {
            name: name.into(),
            ..ModelDoc::default()
        }
    }

    fn actions(history: &History) -> Vec<&str> {
        history.entries().iter().map(|e| e.action.as_str()).collect()
    }

    #[test]
    fn record_after_undo_discards_redo_branch() {
        let mut history = History::new();
        history.record("A", doc("a"));
        history.record("B", doc("b"));
        history.undo().unwrap();
        history.record("C", doc("c"));

        assert_eq!(actions(&history), vec!["A", "C"]);
        assert_eq!(history.cursor(), Some(1));
        assert_eq!(history.current().unwrap().action, "C");
        assert!(!history.can_redo());
    }

    #[test]
    fn undo_and_redo_return_the_restored_entry() {
        let mut history = History::new();
        history.record("A", doc("a"));
        history.record("B", doc("b"));
        history.record("C", doc("c"));

        assert_eq!(history.undo().unwrap().snapshot.name, "b");
        assert_eq!(history.undo().unwrap().snapshot.name, "a");
        assert_eq!(history.redo().unwrap().snapshot.name, "b");
        assert_eq!(history.cursor(), Some(1));
    }

    #[test]
    fn boundaries_are_no_ops() {
        let mut history = History::new();
        assert_eq!(history.undo().unwrap_err(), HistoryError::Empty);
        assert_eq!(history.redo().unwrap_err(), HistoryError::Empty);

        history.record("A", doc("a"));
        history.record("B", doc("b"));
        assert_eq!(history.redo().unwrap_err(), HistoryError::NothingToRedo);
        assert_eq!(history.cursor(), Some(1));

        history.undo().unwrap();
        assert_eq!(history.undo().unwrap_err(), HistoryError::NothingToUndo);
        assert_eq!(history.cursor(), Some(0));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn jump_to_checks_range() {
        let mut history = History::new();
        history.record("A", doc("a"));
        history.record("B", doc("b"));
        history.record("C", doc("c"));

        assert_eq!(history.jump_to(0).unwrap().action, "A");
        assert_eq!(
            history.jump_to(3).unwrap_err(),
            HistoryError::IndexOutOfRange { index: 3, len: 3 }
        );
        assert_eq!(history.cursor(), Some(0));
        assert!(history.can_redo());
        assert!(!history.can_undo());
    }

    #[test]
    fn limit_evicts_oldest() {
        let mut history = History::with_limit(Some(2));
        history.record("A", doc("a"));
        history.record("B", doc("b"));
        history.record("C", doc("c"));

        assert_eq!(actions(&history), vec!["B", "C"]);
        assert_eq!(history.cursor(), Some(1));
        assert_eq!(history.limit(), Some(2));
    }

    #[test]
    fn empty_label_is_not_recorded() {
        let mut history = History::new();
        assert!(!history.record("", doc("x")));
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
    }

    #[test]
    fn record_change_copies_event() {
        let mut history = History::new();
        let change = ChangeEvent {
            action: "vertex added".into(),
            snapshot: doc("m"),
        };
        assert!(history.record_change(&change));
        assert_eq!(history.entries()[0].snapshot, doc("m"));
    }
}

// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Bounded snapshot-based undo/redo.
//!
//! Coarse whole-state snapshotting, not operation diffing: every recorded
//! mutation stores deep copies of the state before and after. Simple and
//! adequate for small annotation sets; memory cost is snapshot size times
//! the 30-entry cap.

/// Maximum number of undoable entries kept.
pub const MAX_HISTORY: usize = 30;

/// A recorded mutation: the state before (`old`) and after (`cur`).
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<T> {
    pub old: T,
    pub cur: T,
}

/// A bounded cancel stack of `{old, cur}` pairs plus an independent redo
/// stack. Pushing past capacity silently evicts the oldest entry; popping
/// an empty stack is a no-op.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack<T: Clone> {
    cancel: Vec<HistoryEntry<T>>,
    redo: Vec<HistoryEntry<T>>,
}

impl<T: Clone> HistoryStack<T> {
    pub fn new() -> Self {
        Self {
            cancel: Vec::new(),
            redo: Vec::new(),
        }
    }

    /// Snapshot `state`, run the mutation, snapshot again, and record the
    /// pair. Any new action invalidates forward history.
    pub fn record(&mut self, state: &mut T, mutate: impl FnOnce(&mut T)) {
        let old = state.clone();
        mutate(state);
        self.push(HistoryEntry {
            old,
            cur: state.clone(),
        });
    }

    /// Record an already-performed mutation.
    pub fn push(&mut self, entry: HistoryEntry<T>) {
        if self.cancel.len() >= MAX_HISTORY {
            self.cancel.remove(0);
        }
        self.cancel.push(entry);
        self.redo.clear();
    }

    /// Pop the latest entry and return the state to restore. The entry
    /// moves to the redo stack.
    pub fn undo(&mut self) -> Option<T> {
        let entry = self.cancel.pop()?;
        let restored = entry.old.clone();
        self.redo.push(entry);
        Some(restored)
    }

    /// Pop the redo stack and return the state to restore. The entry moves
    /// back onto the cancel stack.
    pub fn redo(&mut self) -> Option<T> {
        let entry = self.redo.pop()?;
        let restored = entry.cur.clone();
        self.cancel.push(entry);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.cancel.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undoable entries.
    pub fn len(&self) -> usize {
        self.cancel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cancel.is_empty()
    }

    pub fn clear(&mut self) {
        self.cancel.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_redo_is_lifo() {
        let mut history = HistoryStack::new();
        let mut state = 0;
        for i in 1..=5 {
            history.record(&mut state, |s| *s = i);
        }
        assert_eq!(state, 5);

        for _ in 0..5 {
            state = history.undo().unwrap();
        }
        assert_eq!(state, 0);
        assert!(history.undo().is_none());

        for _ in 0..5 {
            state = history.redo().unwrap();
        }
        assert_eq!(state, 5);
        assert!(history.redo().is_none());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut history = HistoryStack::new();
        let mut state = 0;
        for i in 1..=35 {
            history.record(&mut state, |s| *s = i);
        }
        assert_eq!(history.len(), MAX_HISTORY);

        let mut restored = state;
        while let Some(s) = history.undo() {
            restored = s;
        }
        // The oldest five entries are unrecoverable.
        assert_eq!(restored, 5);
    }

    #[test]
    fn new_record_clears_redo() {
        let mut history = HistoryStack::new();
        let mut state = 0;
        history.record(&mut state, |s| *s = 1);
        history.record(&mut state, |s| *s = 2);
        state = history.undo().unwrap();
        assert!(history.can_redo());

        history.record(&mut state, |s| *s = 7);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(1));
    }

    #[test]
    fn empty_pops_are_noops() {
        let mut history: HistoryStack<i32> = HistoryStack::new();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}

//! Bounded undo/redo history of reversible actions.

use crate::config::HISTORY_LIMIT;
use std::collections::VecDeque;
use std::fmt;

/// A pair of functions applying and reverting some change to a context `C`,
/// described by data `D`.
///
/// `forward` and `backward` must be exact inverses with respect to everything
/// observable on `C`. The stack does not check this.
pub struct Action<C, D> {
    pub forward: fn(&mut C, &D),
    pub backward: fn(&mut C, &D),
}

impl<C, D> Clone for Action<C, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, D> Copy for Action<C, D> {}

impl<C, D> fmt::Debug for Action<C, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").finish_non_exhaustive()
    }
}

struct Entry<C, D> {
    action: Action<C, D>,
    data: D,
}

/// Undo stack capped at `limit` entries, plus a redo stack that is cleared by
/// every new push.
pub struct ActionStack<C, D> {
    undo: VecDeque<Entry<C, D>>,
    redo: Vec<Entry<C, D>>,
    limit: usize,
}

impl<C, D> Default for ActionStack<C, D> {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl<C, D> ActionStack<C, D> {
    /// Create an empty stack keeping at most `limit` undo entries.
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::with_capacity(limit.min(HISTORY_LIMIT)),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Maximum number of undo entries kept.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Apply `action` to `ctx` immediately and record it.
    ///
    /// The oldest entry is dropped when the stack is full. Redo history is
    /// discarded.
    pub fn push(&mut self, ctx: &mut C, action: Action<C, D>, data: D) {
        if self.undo.len() >= self.limit {
            self.undo.pop_front();
            log::trace!("undo history full, dropped oldest entry");
        }
        (action.forward)(ctx, &data);
        self.undo.push_back(Entry { action, data });
        self.redo.clear();
    }

    /// Revert the most recent action. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self, ctx: &mut C) -> bool {
        let Some(entry) = self.undo.pop_back() else {
            return false;
        };
        (entry.action.backward)(ctx, &entry.data);
        self.redo.push(entry);
        true
    }

    /// Reapply the most recently undone action. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self, ctx: &mut C) -> bool {
        let Some(entry) = self.redo.pop() else {
            return false;
        };
        (entry.action.forward)(ctx, &entry.data);
        self.undo.push_back(entry);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of entries that can be undone.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of entries that can be redone.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Data of the undo entries, oldest first.
    pub fn undo_data(&self) -> impl Iterator<Item = &D> {
        self.undo.iter().map(|entry| &entry.data)
    }

    /// Forget all history without touching the context.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl<C, D> fmt::Debug for ActionStack<C, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionStack")
            .field("undo", &self.undo.len())
            .field("redo", &self.redo.len())
            .field("limit", &self.limit)
            .finish()
    }
}

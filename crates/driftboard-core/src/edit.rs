//! Reversible board edits recorded in the undo history.

use crate::board::Board;
use crate::history::Action;
use crate::items::{Item, ItemId, ItemStyle, Shape};
use crate::render::DrawingSurface;
use kurbo::{Point, Vec2};

/// One undoable change to a [`Board`].
///
/// Each variant carries enough data to apply it in either direction.
/// Geometry edits keep the shapes they started from, so reverting restores
/// them bit for bit instead of applying the inverse transform.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardEdit {
    /// Items added to the board. `replaced` holds the items that had the same
    /// ids beforehand.
    Add { items: Vec<Item>, replaced: Vec<Item> },
    /// Items removed from the board, as they were before removal.
    Remove(Vec<Item>),
    /// `before` holds one shape per id.
    Move {
        ids: Vec<ItemId>,
        delta: Vec2,
        before: Vec<Shape>,
    },
    /// Scale about `origin`. `before` holds one shape per id.
    Scale {
        ids: Vec<ItemId>,
        origin: Point,
        sx: f64,
        sy: f64,
        before: Vec<Shape>,
    },
    /// `before` holds one style per id.
    Restyle {
        ids: Vec<ItemId>,
        before: Vec<ItemStyle>,
        after: ItemStyle,
    },
    /// Only ids whose flag actually changes belong here.
    Lock { ids: Vec<ItemId>, locked: bool },
    Relabel {
        id: ItemId,
        before: Option<String>,
        after: Option<String>,
    },
}

impl BoardEdit {
    /// Apply the edit to `board`.
    pub fn apply<S: DrawingSurface>(&self, board: &mut Board<S>) {
        match self {
            BoardEdit::Add { items, .. } => board.add(items.iter().cloned()),
            BoardEdit::Remove(items) => {
                let ids: Vec<ItemId> = items.iter().map(Item::id).collect();
                board.remove(&ids);
            }
            BoardEdit::Move { ids, delta, .. } => {
                board.move_items(ids, *delta);
            }
            BoardEdit::Scale {
                ids, origin, sx, sy, ..
            } => {
                board.scale_items(ids, *origin, *sx, *sy);
            }
            BoardEdit::Restyle { ids, after, .. } => {
                for id in ids {
                    board.set_style(*id, *after);
                }
            }
            BoardEdit::Lock { ids, locked } => {
                board.set_locked(ids, *locked);
            }
            BoardEdit::Relabel { id, after, .. } => {
                board.set_label(*id, after.clone());
            }
        }
    }

    /// Undo the edit on `board`.
    pub fn revert<S: DrawingSurface>(&self, board: &mut Board<S>) {
        match self {
            BoardEdit::Add { items, replaced } => {
                let ids: Vec<ItemId> = items.iter().map(Item::id).collect();
                board.remove(&ids);
                board.add(replaced.iter().cloned());
            }
            BoardEdit::Remove(items) => board.add(items.iter().cloned()),
            BoardEdit::Move { ids, before, .. } | BoardEdit::Scale { ids, before, .. } => {
                restore_shapes(board, ids, before);
            }
            BoardEdit::Restyle { ids, before, .. } => {
                for (id, style) in ids.iter().zip(before) {
                    board.set_style(*id, *style);
                }
            }
            BoardEdit::Lock { ids, locked } => {
                board.set_locked(ids, !*locked);
            }
            BoardEdit::Relabel { id, before, .. } => {
                board.set_label(*id, before.clone());
            }
        }
    }

    /// Ids the edit touches.
    pub fn ids(&self) -> Vec<ItemId> {
        match self {
            BoardEdit::Add { items, .. } | BoardEdit::Remove(items) => {
                items.iter().map(Item::id).collect()
            }
            BoardEdit::Move { ids, .. }
            | BoardEdit::Scale { ids, .. }
            | BoardEdit::Restyle { ids, .. }
            | BoardEdit::Lock { ids, .. } => ids.clone(),
            BoardEdit::Relabel { id, .. } => vec![*id],
        }
    }
}

fn restore_shapes<S: DrawingSurface>(board: &mut Board<S>, ids: &[ItemId], shapes: &[Shape]) {
    for (id, shape) in ids.iter().zip(shapes) {
        if board.get(*id).is_some_and(|item| item.shape != *shape) {
            board.set_shape(*id, shape.clone());
        }
    }
}

/// The history action that applies and reverts [`BoardEdit`]s.
pub fn board_edit_action<S: DrawingSurface>() -> Action<Board<S>, BoardEdit> {
    Action {
        forward: |board, edit| edit.apply(board),
        backward: |board, edit| edit.revert(board),
    }
}

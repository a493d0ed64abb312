//! Edits received from collaborating peers.
//!
//! The transport itself lives outside the core. It hands over decoded
//! [`RemoteBatch`]es, which are applied straight to the board with no undo
//! history. Concurrent edits to the same item resolve last-write-wins.

use crate::board::Board;
use crate::items::{Item, ItemId};
use crate::render::DrawingSurface;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Identifies the peer that produced an edit.
pub type AuthorId = u64;

/// A single remote edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RemoteAction {
    Add { items: Vec<Item> },
    Remove { ids: Vec<ItemId> },
    Move { ids: Vec<ItemId>, delta: Vec2 },
    Scale {
        ids: Vec<ItemId>,
        origin: Point,
        sx: f64,
        sy: f64,
    },
}

impl RemoteAction {
    /// Perform the edit on `board`.
    pub fn apply<S: DrawingSurface>(&self, board: &mut Board<S>) {
        match self {
            RemoteAction::Add { items } => board.add(items.iter().cloned()),
            RemoteAction::Remove { ids } => {
                let removed = board.remove(ids);
                if removed.len() < ids.len() {
                    log::warn!(
                        "remote remove named {} unknown item(s)",
                        ids.len() - removed.len()
                    );
                }
            }
            RemoteAction::Move { ids, delta } => {
                board.move_items(ids, *delta);
            }
            RemoteAction::Scale { ids, origin, sx, sy } => {
                board.scale_items(ids, *origin, *sx, *sy);
            }
        }
    }
}

/// Edits from one peer, applied in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteBatch {
    pub by: AuthorId,
    pub actions: Vec<RemoteAction>,
}

impl RemoteBatch {
    pub fn new(by: AuthorId, actions: Vec<RemoteAction>) -> Self {
        Self { by, actions }
    }

    /// Decode a batch received from the transport.
    pub fn from_json(json: &str) -> crate::error::BoardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the batch for the transport.
    pub fn to_json(&self) -> crate::error::BoardResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

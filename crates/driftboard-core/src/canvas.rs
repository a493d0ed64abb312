//! Canvas: the context object tying a board to its view, history and peers.

use crate::board::Board;
use crate::config::BoardConfig;
use crate::edit::{BoardEdit, board_edit_action};
use crate::error::{BoardError, BoardResult};
use crate::history::ActionStack;
use crate::items::{Item, ItemId, ItemStyle, Shape};
use crate::remote::{AuthorId, RemoteAction, RemoteBatch};
use crate::render::{self, DrawingSurface, FrameStats, RecordingSurface};
use crate::tools::{ToolKind, ToolManager};
use crate::viewport::Viewport;
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Version tag written by [`Canvas::serialize`].
const SAVE_VERSION: u32 = 1;

/// Padding in screen pixels used by [`Canvas::fit_to_content`].
const FIT_PADDING: f64 = 50.0;

#[derive(Serialize, Deserialize)]
struct SavedBoard {
    version: u32,
    offset: Vec2,
    scale: f64,
    items: Vec<Item>,
}

/// One open board: items, view, local undo history and drawing tools.
///
/// Local edits go through the history so they can be undone. Remote edits
/// are applied straight to the board and are never undoable here.
pub struct Canvas<S = RecordingSurface> {
    board: Board<S>,
    viewport: Viewport,
    history: ActionStack<Board<S>, BoardEdit>,
    author: AuthorId,
    screen: Size,
    /// Tool manager.
    pub tools: ToolManager,
}

impl<S: DrawingSurface + Default + 'static> Canvas<S> {
    /// Create an empty canvas for the local peer `author`.
    pub fn new(config: BoardConfig, author: AuthorId) -> BoardResult<Self> {
        config.validate()?;
        Ok(Self::from_board(Board::new(config), author))
    }
}

impl<S: DrawingSurface + Default + 'static> Default for Canvas<S> {
    fn default() -> Self {
        Self::from_board(Board::default(), Uuid::new_v4().as_u128() as AuthorId)
    }
}

impl<S: DrawingSurface> Canvas<S> {
    /// Create an empty canvas whose chunk caches come from `factory`.
    pub fn with_surface_factory(
        config: BoardConfig,
        author: AuthorId,
        factory: impl Fn(f64) -> S + 'static,
    ) -> BoardResult<Self> {
        config.validate()?;
        Ok(Self::from_board(
            Board::with_surface_factory(config, factory),
            author,
        ))
    }

    fn from_board(board: Board<S>, author: AuthorId) -> Self {
        let config = board.config();
        let viewport = Viewport::with_bounds(config.min_scale, config.max_scale);
        let history = ActionStack::new(config.history_limit);
        let mut tools = ToolManager::new();
        tools.simplify_threshold = config.simplify_threshold;
        Self {
            board,
            viewport,
            history,
            author,
            screen: Size::new(800.0, 600.0),
            tools,
        }
    }

    /// The board and its chunk index.
    pub fn board(&self) -> &Board<S> {
        &self.board
    }

    /// Current pan and zoom.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Peer id stamped on batches produced here.
    pub fn author(&self) -> AuthorId {
        self.author
    }

    /// Size of the frame target in pixels.
    pub fn screen_size(&self) -> Size {
        self.screen
    }

    /// Resize the frame target.
    pub fn set_screen_size(&mut self, width: f64, height: f64) {
        self.screen = Size::new(width, height);
    }

    // --- View ---

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.pan(dx, dy);
    }

    /// Zoom about a screen point. The index is rebuilt before this returns.
    ///
    /// Returns `false` if the new scale would leave the configured bounds.
    pub fn zoom(&mut self, center: Point, delta: f64) -> bool {
        if !self.viewport.zoom(center, delta) {
            return false;
        }
        self.sync_scale();
        true
    }

    /// Back to the origin at scale 1.
    pub fn reset_view(&mut self) {
        self.viewport.reset();
        self.sync_scale();
    }

    /// Fit the view around every item on the board.
    pub fn fit_to_content(&mut self) {
        if let Some(bounds) = self.board.bounds() {
            self.viewport.fit_to_bounds(bounds, self.screen, FIT_PADDING);
            self.sync_scale();
        }
    }

    fn sync_scale(&mut self) {
        self.board.set_scale(self.viewport.scale);
    }

    /// Convert a screen point to item coordinates.
    pub fn screen_to_viewport(&self, point: Point) -> Point {
        self.viewport.screen_to_viewport(point)
    }

    /// Topmost item under a screen point.
    pub fn item_at(&self, screen_point: Point) -> Option<ItemId> {
        let point = self.viewport.screen_to_viewport(screen_point);
        let tolerance = self.board.config().hit_tolerance / self.viewport.scale;
        self.board.items_at_point(point, tolerance).first().copied()
    }

    // --- Local edits ---

    /// Add items on top of everything else. Returns their ids.
    ///
    /// An item whose id is already on the board replaces it; undo brings the
    /// old one back.
    pub fn add_items(&mut self, items: Vec<Item>) -> Vec<ItemId> {
        if items.is_empty() {
            return Vec::new();
        }
        let base = self.board.next_z_index();
        let items: Vec<Item> = items
            .into_iter()
            .zip(base..)
            .map(|(item, z)| item.with_z_index(z))
            .collect();
        let ids: Vec<ItemId> = items.iter().map(Item::id).collect();
        let replaced: Vec<Item> = unique(&ids)
            .into_iter()
            .filter_map(|id| self.board.get(id))
            .cloned()
            .collect();
        if !replaced.is_empty() {
            log::debug!("add replaces {} existing item(s)", replaced.len());
        }
        self.record(BoardEdit::Add { items, replaced });
        ids
    }

    /// Remove items. Returns how many were present.
    pub fn remove_items(&mut self, ids: &[ItemId]) -> usize {
        let items: Vec<Item> = unique(ids)
            .into_iter()
            .filter_map(|id| self.board.get(id))
            .cloned()
            .collect();
        let count = items.len();
        if count > 0 {
            self.record(BoardEdit::Remove(items));
        }
        count
    }

    /// Move unlocked items by a viewport-space delta. Returns the ids moved.
    pub fn move_items(&mut self, ids: &[ItemId], delta: Vec2) -> Vec<ItemId> {
        let ids = self.unlocked(ids);
        if ids.is_empty() || delta == Vec2::ZERO {
            return Vec::new();
        }
        let before = self.shapes(&ids);
        self.record(BoardEdit::Move {
            ids: ids.clone(),
            delta,
            before,
        });
        ids
    }

    /// Scale unlocked items about `origin`. Degenerate factors are ignored.
    pub fn scale_items(&mut self, ids: &[ItemId], origin: Point, sx: f64, sy: f64) -> Vec<ItemId> {
        let invertible = |f: f64| f.is_finite() && f != 0.0;
        if !(invertible(sx) && invertible(sy)) {
            log::trace!("ignoring non-invertible scale ({sx}, {sy})");
            return Vec::new();
        }
        let ids = self.unlocked(ids);
        if ids.is_empty() || (sx == 1.0 && sy == 1.0) {
            return Vec::new();
        }
        let before = self.shapes(&ids);
        self.record(BoardEdit::Scale {
            ids: ids.clone(),
            origin,
            sx,
            sy,
            before,
        });
        ids
    }

    /// Restyle items. Returns how many changed.
    pub fn set_style(&mut self, ids: &[ItemId], style: ItemStyle) -> usize {
        let (ids, before): (Vec<ItemId>, Vec<ItemStyle>) = unique(ids)
            .into_iter()
            .filter_map(|id| self.board.get(id))
            .filter(|item| item.style != style)
            .map(|item| (item.id(), item.style))
            .unzip();
        let count = ids.len();
        if count > 0 {
            self.record(BoardEdit::Restyle {
                ids,
                before,
                after: style,
            });
        }
        count
    }

    /// Lock or unlock items. Returns how many changed.
    pub fn set_locked(&mut self, ids: &[ItemId], locked: bool) -> usize {
        let ids: Vec<ItemId> = unique(ids)
            .into_iter()
            .filter_map(|id| self.board.get(id))
            .filter(|item| item.locked != locked)
            .map(Item::id)
            .collect();
        let count = ids.len();
        if count > 0 {
            self.record(BoardEdit::Lock { ids, locked });
        }
        count
    }

    /// Set or clear an item's label. Returns `false` if nothing changed.
    pub fn set_label(&mut self, id: ItemId, label: Option<String>) -> bool {
        let Some(item) = self.board.get(id) else {
            return false;
        };
        if item.label == label {
            return false;
        }
        let before = item.label.clone();
        self.record(BoardEdit::Relabel {
            id,
            before,
            after: label,
        });
        true
    }

    /// Erase unlocked items crossed by a screen-space segment. Returns the ids erased.
    pub fn erase_along(&mut self, from: Point, to: Point) -> Vec<ItemId> {
        let a = self.viewport.screen_to_viewport(from);
        let b = self.viewport.screen_to_viewport(to);
        let tolerance = self.board.config().hit_tolerance / self.viewport.scale;
        let hits = self.board.items_on_segment(a, b, tolerance);
        let ids = self.unlocked(&hits);
        self.remove_items(&ids);
        ids
    }

    /// Present, unlocked ids, each once.
    fn unlocked(&self, ids: &[ItemId]) -> Vec<ItemId> {
        unique(ids)
            .into_iter()
            .filter(|id| self.board.get(*id).is_some_and(|item| !item.locked))
            .collect()
    }

    fn shapes(&self, ids: &[ItemId]) -> Vec<Shape> {
        ids.iter()
            .filter_map(|id| self.board.get(*id))
            .map(|item| item.shape.clone())
            .collect()
    }

    fn record(&mut self, edit: BoardEdit) {
        self.history.push(&mut self.board, board_edit_action(), edit);
    }

    /// Revert the latest local edit. Returns `false` when there is none.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.board)
    }

    /// Reapply the latest undone edit.
    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.board)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The local undo history.
    pub fn history(&self) -> &ActionStack<Board<S>, BoardEdit> {
        &self.history
    }

    // --- Tools ---

    /// Switch tools, dropping any gesture in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
    }

    /// Start a gesture at a screen point.
    pub fn pointer_down(&mut self, screen_point: Point, pressure: Option<f64>) {
        let point = self.viewport.screen_to_viewport(screen_point);
        self.tools.begin(point, pressure);
    }

    /// Extend the gesture in progress.
    pub fn pointer_move(&mut self, screen_point: Point, pressure: Option<f64>) {
        let point = self.viewport.screen_to_viewport(screen_point);
        self.tools.update(point, pressure);
    }

    /// Finish the current gesture, adding whatever it produced.
    pub fn pointer_up(&mut self, screen_point: Point, pressure: Option<f64>) -> Option<ItemId> {
        let point = self.viewport.screen_to_viewport(screen_point);
        let item = self.tools.finish(point, pressure)?;
        self.add_items(vec![item]).first().copied()
    }

    // --- Collaboration ---

    /// Apply a batch from a peer. Batches authored locally were already
    /// applied and are skipped. Returns whether the batch was applied.
    pub fn apply_remote_batch(&mut self, batch: &RemoteBatch) -> bool {
        if batch.by == self.author {
            log::debug!("skipping own batch of {} action(s)", batch.actions.len());
            return false;
        }
        log::debug!(
            "applying {} remote action(s) from {}",
            batch.actions.len(),
            batch.by
        );
        for action in &batch.actions {
            self.apply_remote_action(action);
        }
        true
    }

    /// Apply one remote action directly to the board, bypassing history.
    pub fn apply_remote_action(&mut self, action: &RemoteAction) {
        action.apply(&mut self.board);
    }

    // --- Persistence ---

    /// Encode the board and view as opaque bytes.
    pub fn serialize(&self) -> BoardResult<Vec<u8>> {
        let saved = SavedBoard {
            version: SAVE_VERSION,
            offset: self.viewport.offset,
            scale: self.viewport.scale,
            items: self.board.ordered_items().into_iter().cloned().collect(),
        };
        Ok(serde_json::to_vec(&saved)?)
    }

    /// Replace the board and view with previously serialized bytes.
    ///
    /// History is cleared. On error the canvas is left untouched.
    pub fn load_from_bytes(&mut self, bytes: &[u8]) -> BoardResult<()> {
        let saved: SavedBoard = serde_json::from_slice(bytes)?;
        if saved.version != SAVE_VERSION {
            return Err(BoardError::Serialization(format!(
                "unsupported board version {}",
                saved.version
            )));
        }
        let scale = if (self.viewport.min_scale..=self.viewport.max_scale).contains(&saved.scale) {
            saved.scale
        } else {
            log::warn!("saved scale {} out of range, resetting", saved.scale);
            1.0
        };

        log::debug!("loading {} items", saved.items.len());
        self.tools.cancel();
        self.history.clear();
        self.board.clear();
        self.viewport.offset = saved.offset;
        self.viewport.scale = scale;
        self.board.set_scale(scale);
        self.board.add(saved.items);
        Ok(())
    }

    // --- Rendering ---

    /// Render one frame onto `target`.
    pub fn render(&mut self, target: &mut S) -> FrameStats {
        render::render_frame(&mut self.board, &self.viewport, self.screen, target)
    }
}

/// `ids` in order with repeats dropped.
fn unique(ids: &[ItemId]) -> Vec<ItemId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ChunkKey;
    use kurbo::Rect;

    fn canvas() -> Canvas {
        Canvas::new(BoardConfig::default(), 1).unwrap()
    }

    fn rect_item(x: f64, y: f64) -> Item {
        Item::rectangle(Rect::new(x, y, x + 10.0, y + 10.0))
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = BoardConfig {
            chunk_size: -1.0,
            ..BoardConfig::default()
        };
        assert!(Canvas::<RecordingSurface>::new(config, 1).is_err());
    }

    #[test]
    fn test_add_assigns_z_on_top() {
        let mut canvas = canvas();
        let first = canvas.add_items(vec![rect_item(0.0, 0.0)]);
        let second = canvas.add_items(vec![rect_item(0.0, 0.0), rect_item(5.0, 5.0)]);
        let z = |id| canvas.board().get(id).unwrap().z_index;
        assert_eq!(z(first[0]), 0);
        assert_eq!(z(second[0]), 1);
        assert_eq!(z(second[1]), 2);
    }

    #[test]
    fn test_undo_redo_add_remove() {
        let mut canvas = canvas();
        let ids = canvas.add_items(vec![rect_item(0.0, 0.0)]);
        assert_eq!(canvas.remove_items(&ids), 1);
        assert!(canvas.board().is_empty());

        assert!(canvas.undo());
        assert!(canvas.board().contains(ids[0]));
        assert!(canvas.undo());
        assert!(canvas.board().is_empty());
        assert!(!canvas.undo());

        assert!(canvas.redo());
        assert!(canvas.redo());
        assert!(canvas.board().is_empty());
        assert!(!canvas.redo());
    }

    #[test]
    fn test_readding_an_id_undoes_to_the_original() {
        let mut canvas = canvas();
        let item = rect_item(0.0, 0.0);
        let id = item.id();
        canvas.add_items(vec![item.clone()]);
        let original = canvas.board().get(id).cloned().unwrap();

        let mut moved = item;
        moved.transform(kurbo::Affine::translate((40.0, 0.0)));
        canvas.add_items(vec![moved]);
        assert_eq!(canvas.board().len(), 1);

        assert!(canvas.undo());
        assert_eq!(canvas.board().get(id), Some(&original));
        assert!(canvas.undo());
        assert!(canvas.board().is_empty());
    }

    #[test]
    fn test_repeated_ids_act_once() {
        let mut canvas = canvas();
        let ids = canvas.add_items(vec![rect_item(5.0, 0.0)]);
        let id = ids[0];

        assert_eq!(canvas.move_items(&[id, id], Vec2::new(5.0, 0.0)), vec![id]);
        assert_eq!(canvas.board().get(id).unwrap().shape.bounds().x0, 10.0);

        assert_eq!(canvas.scale_items(&[id, id], Point::ZERO, 2.0, 1.0), vec![id]);
        assert_eq!(canvas.board().get(id).unwrap().shape.bounds().x0, 20.0);

        assert_eq!(canvas.set_locked(&[id, id], true), 1);
        assert_eq!(canvas.set_locked(&[id, id], false), 1);
        assert_eq!(canvas.remove_items(&[id, id]), 1);
    }

    #[test]
    fn test_undo_move_is_exact() {
        let mut canvas = canvas();
        let ids = canvas.add_items(vec![Item::rectangle(Rect::new(0.3, 0.0, 10.0, 10.0))]);
        let before = canvas.board().get(ids[0]).cloned().unwrap();

        canvas.move_items(&ids, Vec2::new(0.1, 0.0));
        canvas.scale_items(&ids, Point::new(0.7, 0.0), 1.1, 0.3);
        canvas.undo();
        canvas.undo();
        assert_eq!(canvas.board().get(ids[0]), Some(&before));
    }

    #[test]
    fn test_noop_edits_not_recorded() {
        let mut canvas = canvas();
        assert_eq!(canvas.remove_items(&[42]), 0);
        let ids = canvas.add_items(vec![rect_item(0.0, 0.0)]);
        assert!(canvas.move_items(&ids, Vec2::ZERO).is_empty());
        assert!(canvas.scale_items(&ids, Point::ZERO, 0.0, 1.0).is_empty());
        assert_eq!(canvas.set_locked(&ids, false), 0);
        assert!(!canvas.set_label(ids[0], None));
        assert_eq!(canvas.history().undo_len(), 1);
    }

    #[test]
    fn test_locked_items_stay_put() {
        let mut canvas = canvas();
        let ids = canvas.add_items(vec![rect_item(0.0, 0.0), rect_item(20.0, 0.0)]);
        canvas.set_locked(&ids[..1], true);

        let moved = canvas.move_items(&ids, Vec2::new(100.0, 0.0));
        assert_eq!(moved, vec![ids[1]]);
        assert_eq!(
            canvas.board().get(ids[0]).unwrap().shape.bounds(),
            Rect::new(0.0, 0.0, 10.0, 10.0)
        );

        assert!(canvas.scale_items(&ids[..1], Point::ZERO, 2.0, 2.0).is_empty());
        let erased = canvas.erase_along(Point::new(5.0, -20.0), Point::new(5.0, 20.0));
        assert!(erased.is_empty());
        assert!(canvas.board().contains(ids[0]));
    }

    #[test]
    fn test_erase_along() {
        let mut canvas = canvas();
        let ids = canvas.add_items(vec![rect_item(0.0, 0.0), rect_item(500.0, 0.0)]);
        let erased = canvas.erase_along(Point::new(-20.0, 5.0), Point::new(30.0, 5.0));
        assert_eq!(erased, vec![ids[0]]);
        assert_eq!(canvas.board().len(), 1);
        canvas.undo();
        assert_eq!(canvas.board().len(), 2);
    }

    #[test]
    fn test_style_and_label_undo() {
        let mut canvas = canvas();
        let ids = canvas.add_items(vec![rect_item(0.0, 0.0)]);
        let style = ItemStyle {
            weight: 8.0,
            filled: true,
            ..ItemStyle::default()
        };
        assert_eq!(canvas.set_style(&ids, style), 1);
        assert!(canvas.set_label(ids[0], Some("hello".into())));
        canvas.undo();
        canvas.undo();
        let item = canvas.board().get(ids[0]).unwrap();
        assert_eq!(item.style, ItemStyle::default());
        assert_eq!(item.label, None);
    }

    #[test]
    fn test_zoom_rebuilds_index() {
        let mut canvas = canvas();
        let ids = canvas.add_items(vec![Item::rectangle(Rect::new(1500.0, 0.0, 1600.0, 10.0))]);
        assert!(canvas.zoom(Point::new(400.0, 300.0), -1.0));
        assert!((canvas.board().scale() - 2.0).abs() < f64::EPSILON);
        assert_eq!(canvas.board().chunks_holding(ids[0]), vec![ChunkKey::new(1, 0)]);

        assert!(!canvas.zoom(Point::new(400.0, 300.0), -3.0));
        assert!((canvas.board().scale() - 2.0).abs() < f64::EPSILON);

        canvas.reset_view();
        assert_eq!(canvas.board().chunks_holding(ids[0]), vec![ChunkKey::new(0, 0)]);
    }

    #[test]
    fn test_pointer_draws_rectangle() {
        let mut canvas = canvas();
        canvas.pan(100.0, 100.0);
        canvas.set_tool(ToolKind::Rectangle);
        canvas.pointer_down(Point::new(100.0, 100.0), None);
        canvas.pointer_move(Point::new(120.0, 120.0), None);
        let id = canvas.pointer_up(Point::new(150.0, 130.0), None).unwrap();
        assert_eq!(
            canvas.board().get(id).unwrap().shape.bounds(),
            Rect::new(0.0, 0.0, 50.0, 30.0)
        );
        assert_eq!(canvas.item_at(Point::new(100.0, 100.0)), Some(id));
        assert!(canvas.can_undo());
    }

    #[test]
    fn test_remote_batches() {
        let mut canvas = canvas();
        let item = rect_item(0.0, 0.0);
        let id = item.id();

        let own = RemoteBatch::new(1, vec![RemoteAction::Add { items: vec![item.clone()] }]);
        assert!(!canvas.apply_remote_batch(&own));
        assert!(canvas.board().is_empty());

        let peer = RemoteBatch::new(2, vec![RemoteAction::Add { items: vec![item] }]);
        assert!(canvas.apply_remote_batch(&peer));
        assert!(canvas.board().contains(id));
        assert!(!canvas.can_undo());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut canvas = canvas();
        let ids = canvas.add_items(vec![
            rect_item(0.0, 0.0).with_label("a"),
            Item::ellipse(Rect::new(3000.0, 0.0, 3100.0, 50.0)),
        ]);
        canvas.pan(10.0, 20.0);
        assert!(canvas.zoom(Point::ZERO, -0.5));
        let bytes = canvas.serialize().unwrap();

        let mut loaded = Canvas::<RecordingSurface>::new(BoardConfig::default(), 9).unwrap();
        loaded.add_items(vec![rect_item(-500.0, -500.0)]);
        loaded.load_from_bytes(&bytes).unwrap();

        assert_eq!(loaded.board().len(), 2);
        assert!(!loaded.can_undo());
        assert_eq!(loaded.viewport(), canvas.viewport());
        assert_eq!(loaded.board().get(ids[0]), canvas.board().get(ids[0]));
        assert_eq!(loaded.board().chunk_keys(), canvas.board().chunk_keys());
    }

    #[test]
    fn test_load_garbage_leaves_canvas() {
        let mut canvas = canvas();
        canvas.add_items(vec![rect_item(0.0, 0.0)]);
        assert!(canvas.load_from_bytes(b"not json").is_err());
        assert_eq!(canvas.board().len(), 1);
        assert!(canvas.can_undo());
    }

    #[test]
    fn test_render_composites_visible_chunks() {
        let mut canvas = canvas();
        canvas.set_screen_size(800.0, 600.0);
        // Kept clear of chunk edges so each item lands in exactly one chunk.
        canvas.add_items(vec![rect_item(100.0, 100.0), rect_item(5000.0, 100.0)]);

        let mut target = RecordingSurface::new();
        let stats = canvas.render(&mut target);
        assert_eq!(stats.chunks_redrawn, 1);
        assert_eq!(stats.chunks_composited, 1);

        let stats = canvas.render(&mut target);
        assert_eq!(stats.chunks_redrawn, 0);

        canvas.pan(-4800.0, 0.0);
        let stats = canvas.render(&mut target);
        assert_eq!(stats.chunks_redrawn, 1);
    }
}

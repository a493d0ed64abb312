//! Board registry: the authoritative item table and the chunk index over it.

use crate::config::BoardConfig;
use crate::geometry::{ChunkSpan, MinMaxRect, clamp_min_extent, intersects};
use crate::index::{Chunk, ChunkKey};
use crate::items::{Item, ItemId, ItemStyle, Shape};
use crate::render::{self, DrawingSurface, RecordingSurface, SurfaceFactory};
use kurbo::{Affine, Point, Rect, Vec2};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Owns every item on the board and keeps the chunk index in step with them.
///
/// Items are held here only; chunks refer to them by id. Item geometry lives
/// in viewport space, while chunks tile board space (`viewport * scale`), so
/// changing the scale re-indexes everything.
///
/// A chunk's quadtree holds the items whose geometry box overlaps it. Strokes
/// reach past the geometry, so a chunk also counts the items painting into
/// it; chunks nobody paints into are dropped by [`prune_chunks`](Self::prune_chunks).
pub struct Board<S = RecordingSurface> {
    config: BoardConfig,
    scale: f64,
    items: HashMap<ItemId, Item>,
    chunks: HashMap<ChunkKey, Chunk<S>>,
    factory: SurfaceFactory<S>,
    /// Upper bound on [`Item::stroke_pad`] since the last rebuild, in viewport units.
    stroke_margin: f64,
}

impl<S: DrawingSurface + Default + 'static> Board<S> {
    /// Create an empty board whose chunk caches start as `S::default()`.
    pub fn new(config: BoardConfig) -> Self {
        Self::with_surface_factory(config, |_| S::default())
    }
}

impl<S: DrawingSurface + Default + 'static> Default for Board<S> {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl<S: DrawingSurface> Board<S> {
    /// Create an empty board with a custom chunk cache factory.
    pub fn with_surface_factory(config: BoardConfig, factory: impl Fn(f64) -> S + 'static) -> Self {
        Self {
            config,
            scale: 1.0,
            items: HashMap::new(),
            chunks: HashMap::new(),
            factory: Box::new(factory),
            stroke_margin: 0.0,
        }
    }

    /// Limits the board was created with.
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    /// Zoom scale the index was last built for.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Number of items on the board.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Look up an item by id.
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Every item, in no particular order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Items back to front.
    pub fn ordered_items(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.values().collect();
        items.sort_by_key(|item| (item.z_index, item.id()));
        items
    }

    /// A z index above every current item.
    pub fn next_z_index(&self) -> i64 {
        self.items
            .values()
            .map(|item| item.z_index)
            .max()
            .map_or(0, |z| z + 1)
    }

    /// Union of all item bounds in viewport space.
    pub fn bounds(&self) -> Option<Rect> {
        let mut acc = MinMaxRect::inverted();
        for item in self.items.values() {
            acc.append(&MinMaxRect::from_rect(item.bounds()));
        }
        (!acc.is_empty()).then(|| acc.to_rect())
    }

    /// The chunk at `key`, if it exists.
    pub fn chunk(&self, key: ChunkKey) -> Option<&Chunk<S>> {
        self.chunks.get(&key)
    }

    /// Every live chunk, in no particular order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk<S>> {
        self.chunks.values()
    }

    /// Sorted keys of the live chunks. Chunks emptied since the last
    /// [`prune_chunks`](Self::prune_chunks) are still listed.
    pub fn chunk_keys(&self) -> Vec<ChunkKey> {
        let mut keys: Vec<ChunkKey> = self.chunks.keys().copied().collect();
        keys.sort();
        keys
    }

    /// Keys of the chunks whose quadtree currently holds `id`.
    pub fn chunks_holding(&self, id: ItemId) -> Vec<ChunkKey> {
        let mut keys: Vec<ChunkKey> = self
            .chunks
            .values()
            .filter(|chunk| {
                let mut ids = HashSet::new();
                chunk.get_all(&mut ids);
                ids.contains(&id)
            })
            .map(|chunk| chunk.key())
            .collect();
        keys.sort();
        keys
    }

    /// Board-space box an item is indexed under at the current scale.
    pub fn board_bounds(&self, item: &Item) -> Rect {
        board_bounds(item, self.scale)
    }

    /// Board-space box an item paints at the current scale.
    pub fn paint_bounds(&self, item: &Item) -> Rect {
        paint_bounds(item, self.scale)
    }

    /// Insert items, indexing each into every chunk its box covers.
    ///
    /// An item whose id is already present replaces the existing one.
    pub fn add(&mut self, items: impl IntoIterator<Item = Item>) {
        for mut item in items {
            if let Some(mut previous) = self.items.remove(&item.id()) {
                log::trace!("replacing item {}", previous.id());
                self.unindex(&mut previous);
            }
            self.index(&mut item);
            self.items.insert(item.id(), item);
        }
    }

    /// Remove items by id, returning the ones that were present.
    pub fn remove(&mut self, ids: &[ItemId]) -> Vec<Item> {
        let mut removed = Vec::with_capacity(ids.len());
        for id in ids {
            match self.items.remove(id) {
                Some(mut item) => {
                    self.unindex(&mut item);
                    removed.push(item);
                }
                None => log::trace!("remove of unknown item {id}"),
            }
        }
        removed
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.items.clear();
        self.chunks.clear();
        self.stroke_margin = 0.0;
    }

    /// Drop every chunk and re-index all items at the current scale.
    ///
    /// Chunks are recreated only where items land, so chunks from an earlier
    /// scale do not linger.
    pub fn rebuild(&mut self) {
        log::debug!(
            "rebuilding index: {} items, {} chunks, scale {}",
            self.items.len(),
            self.chunks.len(),
            self.scale
        );
        self.chunks.clear();
        self.stroke_margin = 0.0;
        let mut items = std::mem::take(&mut self.items);
        for item in items.values_mut() {
            item.cell = None;
            self.index(item);
        }
        self.items = items;
    }

    /// Drop chunks nothing paints into. Returns how many were dropped.
    pub fn prune_chunks(&mut self) -> usize {
        let before = self.chunks.len();
        self.chunks.retain(|key, chunk| {
            let keep = !chunk.is_unused();
            if !keep {
                log::trace!("dropping chunk {key}");
            }
            keep
        });
        before - self.chunks.len()
    }

    /// Adopt a new zoom scale, rebuilding the index if it changed.
    pub fn set_scale(&mut self, scale: f64) {
        if self.scale == scale {
            return;
        }
        self.scale = scale;
        self.rebuild();
    }

    /// Ids of items whose indexed box intersects `rect` (viewport space).
    pub fn ids_within_rect(&self, rect: Rect) -> HashSet<ItemId> {
        let region = scale_rect(rect, self.scale);
        let mut out = HashSet::new();
        for chunk in self.chunks.values() {
            if intersects(chunk.boundary(), region) {
                chunk.get(region, &mut out);
            }
        }
        out
    }

    /// Items whose indexed box intersects `rect` (viewport space), back to front.
    pub fn items_within_rect(&self, rect: Rect) -> Vec<&Item> {
        let mut items: Vec<&Item> = self
            .ids_within_rect(rect)
            .into_iter()
            .filter_map(|id| self.items.get(&id))
            .collect();
        items.sort_by_key(|item| (item.z_index, item.id()));
        items
    }

    /// Items hit at `point`, topmost first.
    pub fn items_at_point(&self, point: Point, tolerance: f64) -> Vec<ItemId> {
        let reach = tolerance + self.stroke_margin;
        let query = Rect::from_center_size(point, (0.0, 0.0)).inflate(reach, reach);
        let mut hits: Vec<&Item> = self
            .items_within_rect(query)
            .into_iter()
            .filter(|item| item.hit_test(point, tolerance))
            .collect();
        hits.reverse();
        hits.into_iter().map(Item::id).collect()
    }

    /// Items touched by the segment `a`-`b`, back to front.
    pub fn items_on_segment(&self, a: Point, b: Point, tolerance: f64) -> Vec<ItemId> {
        let reach = tolerance + self.stroke_margin;
        let query = Rect::from_points(a, b).inflate(reach, reach);
        self.items_within_rect(query)
            .into_iter()
            .filter(|item| item.intersects_segment(a, b, tolerance))
            .map(Item::id)
            .collect()
    }

    /// Items whose geometry lies in or crosses `rect`, back to front.
    pub fn items_in_rect(&self, rect: Rect) -> Vec<ItemId> {
        self.items_within_rect(rect)
            .into_iter()
            .filter(|item| item.intersects_rect(rect))
            .map(Item::id)
            .collect()
    }

    /// Apply `affine` to each listed item, keeping the index in step.
    /// Returns the ids that were present.
    pub fn transform_items(&mut self, ids: &[ItemId], affine: Affine) -> Vec<ItemId> {
        self.update_items(ids, |item| item.transform(affine))
    }

    /// Translate items by `delta`.
    pub fn move_items(&mut self, ids: &[ItemId], delta: Vec2) -> Vec<ItemId> {
        self.transform_items(ids, Affine::translate(delta))
    }

    /// Scale items about `origin` by `sx`, `sy`.
    pub fn scale_items(&mut self, ids: &[ItemId], origin: Point, sx: f64, sy: f64) -> Vec<ItemId> {
        self.transform_items(ids, scale_about(origin, sx, sy))
    }

    /// Replace an item's geometry, returning the previous one.
    pub fn set_shape(&mut self, id: ItemId, shape: Shape) -> Option<Shape> {
        let mut previous = None;
        self.update_items(&[id], |item| {
            previous = Some(std::mem::replace(&mut item.shape, shape.clone()));
        });
        previous
    }

    /// Replace an item's style, returning the previous one.
    pub fn set_style(&mut self, id: ItemId, style: ItemStyle) -> Option<ItemStyle> {
        let mut previous = None;
        self.update_items(&[id], |item| {
            previous = Some(std::mem::replace(&mut item.style, style));
        });
        previous
    }

    /// Set the locked flag on items, returning the ids that were present.
    pub fn set_locked(&mut self, ids: &[ItemId], locked: bool) -> Vec<ItemId> {
        let mut touched = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(item) = self.items.get_mut(id) {
                item.locked = locked;
                touched.push(*id);
            }
        }
        touched
    }

    /// Replace an item's label, returning the previous one. `None` if absent.
    pub fn set_label(&mut self, id: ItemId, label: Option<String>) -> Option<Option<String>> {
        self.items
            .get_mut(&id)
            .map(|item| std::mem::replace(&mut item.label, label))
    }

    /// Redraw dirty chunks intersecting `region` (board space). Returns how many were redrawn.
    ///
    /// Unused chunks are pruned first. Each chunk draws every item whose
    /// painted box crosses its dirty region, including strokes that overhang
    /// from items indexed in a neighbouring chunk.
    pub fn redraw_chunks(&mut self, region: Rect) -> usize {
        self.prune_chunks();
        let pending: Vec<(ChunkKey, Vec<ItemId>)> = self
            .chunks
            .values()
            .filter_map(|chunk| {
                let dirty = chunk.dirty().filter(|dirty| intersects(*dirty, region))?;
                Some((chunk.key(), self.ids_painting(dirty)))
            })
            .collect();

        let mut redrawn = 0;
        for (key, ids) in pending {
            let Some(chunk) = self.chunks.get_mut(&key) else {
                continue;
            };
            let visible: Vec<&Item> = ids.iter().filter_map(|id| self.items.get(id)).collect();
            if render::render_chunk(chunk, &visible, self.scale) {
                redrawn += 1;
            }
        }
        redrawn
    }

    /// Ids of items whose painted box crosses `region` (board space), back to front.
    fn ids_painting(&self, region: Rect) -> Vec<ItemId> {
        let margin = self.stroke_margin * self.scale;
        let reach = region.inflate(margin, margin);
        let mut ids = HashSet::new();
        for chunk in self.chunks.values() {
            if intersects(chunk.boundary(), reach) {
                chunk.get(reach, &mut ids);
            }
        }
        let mut items: Vec<&Item> = ids
            .iter()
            .filter_map(|id| self.items.get(id))
            .filter(|item| intersects(paint_bounds(item, self.scale), region))
            .collect();
        items.sort_by_key(|item| (item.z_index, item.id()));
        items.into_iter().map(Item::id).collect()
    }

    /// Take items out of the index, mutate them, and index them again.
    fn update_items(&mut self, ids: &[ItemId], mut update: impl FnMut(&mut Item)) -> Vec<ItemId> {
        let mut touched = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(mut item) = self.items.remove(id) else {
                log::trace!("update of unknown item {id}");
                continue;
            };
            self.unindex(&mut item);
            update(&mut item);
            self.index(&mut item);
            self.items.insert(*id, item);
            touched.push(*id);
        }
        touched
    }

    fn index(&mut self, item: &mut Item) {
        let Self {
            config,
            scale,
            chunks,
            factory,
            stroke_margin,
            ..
        } = self;
        let bbox = board_bounds(item, *scale);
        let paint = paint_bounds(item, *scale);
        let span = ChunkSpan::from_bounds(bbox, config.chunk_size);
        for (cx, cy) in ChunkSpan::from_bounds(paint, config.chunk_size).iter() {
            let key = ChunkKey::new(cx, cy);
            let chunk = chunks.entry(key).or_insert_with(|| {
                log::trace!("creating chunk {key}");
                Chunk::new(key, config, factory(config.chunk_size))
            });
            chunk.add_painter(paint);
            if span.contains(cx, cy) {
                chunk.insert(item.id(), bbox);
            }
        }
        *stroke_margin = stroke_margin.max(item.stroke_pad());
        item.cell = Some(span);
    }

    /// Reverse [`index`](Self::index). The item must be unchanged since it was
    /// indexed so its painted span can be recomputed.
    fn unindex(&mut self, item: &mut Item) {
        let Some(span) = item.cell.take() else {
            return;
        };
        let bbox = board_bounds(item, self.scale);
        let paint = paint_bounds(item, self.scale);
        for (cx, cy) in ChunkSpan::from_bounds(paint, self.config.chunk_size).iter() {
            let Some(chunk) = self.chunks.get_mut(&ChunkKey::new(cx, cy)) else {
                continue;
            };
            if span.contains(cx, cy) {
                chunk.delete(item.id(), bbox);
            }
            chunk.remove_painter(paint);
        }
    }
}

impl<S> fmt::Debug for Board<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("scale", &self.scale)
            .field("items", &self.items.len())
            .field("chunks", &self.chunks.len())
            .finish_non_exhaustive()
    }
}

/// Board-space box for an item: its geometry at `scale`, clamped to a minimum extent.
pub fn board_bounds(item: &Item, scale: f64) -> Rect {
    clamp_min_extent(scale_rect(item.geometry_bounds(), scale))
}

/// Board-space box an item paints, stroke included. Always contains
/// [`board_bounds`].
pub fn paint_bounds(item: &Item, scale: f64) -> Rect {
    clamp_min_extent(scale_rect(item.bounds(), scale)).union(board_bounds(item, scale))
}

/// Affine scaling about `origin`.
pub fn scale_about(origin: Point, sx: f64, sy: f64) -> Affine {
    Affine::translate(origin.to_vec2())
        * Affine::scale_non_uniform(sx, sy)
        * Affine::translate(-origin.to_vec2())
}

fn scale_rect(rect: Rect, scale: f64) -> Rect {
    if scale == 1.0 {
        return rect;
    }
    Rect::new(rect.x0 * scale, rect.y0 * scale, rect.x1 * scale, rect.y1 * scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::infinite;
    use crate::items::Path;
    use crate::stroke::StrokePoint;

    fn board() -> Board {
        Board::new(BoardConfig::default())
    }

    fn thin(item: Item) -> Item {
        item.with_style(ItemStyle {
            weight: 0.0,
            ..ItemStyle::default()
        })
    }

    #[test]
    fn test_add_single_chunk() {
        let mut board = board();
        let item = thin(Item::rectangle(Rect::new(0.0, 0.0, 50.0, 50.0)));
        let id = item.id();
        board.add([item]);

        assert_eq!(board.chunk_keys(), vec![ChunkKey::new(0, 0)]);
        assert_eq!(board.chunks_holding(id), vec![ChunkKey::new(0, 0)]);
        let cell = board.get(id).and_then(Item::cell).unwrap();
        assert_eq!(cell.len(), 1);
    }

    #[test]
    fn test_default_style_indexes_geometry_only() {
        let mut board = board();
        let item = Item::rectangle(Rect::new(0.0, 0.0, 50.0, 50.0));
        let id = item.id();
        board.add([item]);

        assert_eq!(board.chunks_holding(id), vec![ChunkKey::new(0, 0)]);
        assert_eq!(board.get(id).and_then(Item::cell).map(|c| c.len()), Some(1));
        // The stroke still paints across the seam into the neighbours.
        assert_eq!(
            board.chunk_keys(),
            vec![
                ChunkKey::new(-1, -1),
                ChunkKey::new(-1, 0),
                ChunkKey::new(0, -1),
                ChunkKey::new(0, 0),
            ]
        );
        assert!(board.chunk(ChunkKey::new(-1, -1)).unwrap().is_empty());
    }

    #[test]
    fn test_remove_empties_chunk() {
        let mut board = board();
        let item = Item::rectangle(Rect::new(0.0, 0.0, 50.0, 50.0));
        let id = item.id();
        board.add([item]);

        let removed = board.remove(&[id]);
        assert_eq!(removed.len(), 1);
        assert!(removed[0].cell().is_none());

        let mut out = HashSet::new();
        board.chunk(ChunkKey::new(0, 0)).unwrap().get(infinite(), &mut out);
        assert!(out.is_empty());
        assert!(board.is_empty());

        assert_eq!(board.prune_chunks(), 4);
        assert!(board.chunk_keys().is_empty());
    }

    #[test]
    fn test_rebuild_drops_stale_chunks() {
        let mut board = board();
        let item = thin(Item::rectangle(Rect::new(100.0, 100.0, 110.0, 110.0)));
        board.add([item]);
        for step in 1..30 {
            board.set_scale(1.0 + step as f64 * 0.1);
            assert_eq!(board.chunk_keys().len(), 1);
        }
    }

    #[test]
    fn test_spanning_item_in_every_chunk() {
        let mut board = board();
        let item = thin(Item::rectangle(Rect::new(-10.0, 1990.0, 2010.0, 2010.0)));
        let id = item.id();
        board.add([item]);
        assert_eq!(
            board.chunks_holding(id),
            vec![
                ChunkKey::new(-1, 0),
                ChunkKey::new(-1, 1),
                ChunkKey::new(0, 0),
                ChunkKey::new(0, 1),
                ChunkKey::new(1, 0),
                ChunkKey::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_degenerate_item_indexed() {
        let mut board = board();
        let item = thin(Item::path(Path::new(vec![StrokePoint::new(10.0, 10.0)])));
        let id = item.id();
        board.add([item]);
        let hits = board.ids_within_rect(Rect::new(10.5, 10.5, 10.7, 10.7));
        assert!(hits.contains(&id));
    }

    #[test]
    fn test_scale_changes_chunks() {
        let mut board = board();
        let item = thin(Item::rectangle(Rect::new(1500.0, 0.0, 1600.0, 10.0)));
        let id = item.id();
        board.add([item]);
        assert_eq!(board.chunks_holding(id), vec![ChunkKey::new(0, 0)]);

        board.set_scale(2.0);
        assert_eq!(board.chunks_holding(id), vec![ChunkKey::new(1, 0)]);
        assert_eq!(board.get(id).and_then(Item::cell).map(|c| c.min_x), Some(1));

        // Queries stay in viewport space.
        assert!(board.ids_within_rect(Rect::new(1550.0, 0.0, 1560.0, 5.0)).contains(&id));
    }

    #[test]
    fn test_move_refreshes_cell() {
        let mut board = board();
        let item = thin(Item::rectangle(Rect::new(0.0, 0.0, 50.0, 50.0)));
        let id = item.id();
        board.add([item]);
        board.move_items(&[id], Vec2::new(5000.0, 0.0));

        assert_eq!(board.chunks_holding(id), vec![ChunkKey::new(2, 0)]);
        let cell = board.get(id).and_then(Item::cell).unwrap();
        assert_eq!((cell.min_x, cell.max_x), (2, 2));
        assert!(board.ids_within_rect(Rect::new(0.0, 0.0, 60.0, 60.0)).is_empty());
    }

    #[test]
    fn test_scale_items_about_origin() {
        let mut board = board();
        let item = thin(Item::rectangle(Rect::new(10.0, 10.0, 20.0, 20.0)));
        let id = item.id();
        board.add([item]);
        board.scale_items(&[id], Point::new(10.0, 10.0), 3.0, 2.0);
        assert_eq!(board.get(id).unwrap().shape.bounds(), Rect::new(10.0, 10.0, 40.0, 30.0));
    }

    #[test]
    fn test_readd_same_id_replaces() {
        let mut board = board();
        let item = thin(Item::rectangle(Rect::new(0.0, 0.0, 50.0, 50.0)));
        let id = item.id();
        board.add([item.clone()]);

        let mut moved = item;
        moved.transform(Affine::translate((3000.0, 0.0)));
        board.add([moved]);

        assert_eq!(board.len(), 1);
        assert_eq!(board.chunks_holding(id), vec![ChunkKey::new(1, 0)]);
    }

    #[test]
    fn test_items_at_point_topmost_first() {
        let mut board = board();
        let back = Item::rectangle(Rect::new(0.0, 0.0, 100.0, 100.0))
            .with_style(ItemStyle {
                filled: true,
                ..ItemStyle::default()
            })
            .with_z_index(0);
        let front = Item::ellipse(Rect::new(50.0, 50.0, 150.0, 150.0))
            .with_style(ItemStyle {
                filled: true,
                ..ItemStyle::default()
            })
            .with_z_index(1);
        let (back_id, front_id) = (back.id(), front.id());
        board.add([back, front]);

        assert_eq!(board.items_at_point(Point::new(90.0, 90.0), 0.0), vec![front_id, back_id]);
        assert_eq!(board.items_at_point(Point::new(10.0, 10.0), 0.0), vec![back_id]);
    }

    #[test]
    fn test_items_on_segment_and_in_rect() {
        let mut board = board();
        let stroke = Item::path(Path::new(vec![
            StrokePoint::new(0.0, 0.0),
            StrokePoint::new(100.0, 0.0),
        ]));
        let id = stroke.id();
        board.add([stroke]);

        assert_eq!(
            board.items_on_segment(Point::new(50.0, -20.0), Point::new(50.0, 20.0), 0.0),
            vec![id]
        );
        assert!(board.items_in_rect(Rect::new(40.0, 10.0, 60.0, 20.0)).is_empty());
        assert_eq!(board.items_in_rect(Rect::new(40.0, -1.0, 60.0, 1.0)), vec![id]);
    }

    #[test]
    fn test_style_and_flags() {
        let mut board = board();
        let item = Item::rectangle(Rect::new(0.0, 0.0, 10.0, 10.0));
        let id = item.id();
        board.add([item]);

        let old = board.set_style(id, ItemStyle {
            weight: 30.0,
            ..ItemStyle::default()
        });
        assert_eq!(old.map(|s| s.weight), Some(2.0));
        // The index keeps the geometry box; the wider stroke is still hit.
        assert!(board.ids_within_rect(Rect::new(-25.0, -25.0, -21.0, -21.0)).is_empty());
        assert_eq!(board.items_at_point(Point::new(-25.0, 5.0), 0.0), vec![id]);

        assert_eq!(board.set_locked(&[id, 12345], true), vec![id]);
        assert!(board.get(id).unwrap().locked);
        assert_eq!(board.set_label(id, Some("a".into())), Some(None));
        assert_eq!(board.set_label(12345, None), None);
    }

    #[test]
    fn test_bounds_and_z() {
        let mut board = board();
        assert!(board.bounds().is_none());
        assert_eq!(board.next_z_index(), 0);
        board.add([
            thin(Item::rectangle(Rect::new(0.0, 0.0, 10.0, 10.0))).with_z_index(4),
            thin(Item::ellipse(Rect::new(-5.0, 20.0, 5.0, 30.0))),
        ]);
        assert_eq!(board.bounds(), Some(Rect::new(-5.0, 0.0, 10.0, 30.0)));
        assert_eq!(board.next_z_index(), 5);
    }

    #[test]
    fn test_redraw_only_dirty_chunks() {
        let mut board = board();
        board.add([
            Item::rectangle(Rect::new(100.0, 100.0, 110.0, 110.0)),
            Item::rectangle(Rect::new(4100.0, 100.0, 4110.0, 110.0)),
        ]);
        assert_eq!(board.redraw_chunks(infinite()), 2);
        assert_eq!(board.redraw_chunks(infinite()), 0);

        let cache = board.chunk(ChunkKey::new(0, 0)).unwrap().surface();
        assert_eq!(cache.shape_count(), 1);
    }

    #[test]
    fn test_stroke_overhang_redraws_neighbour() {
        let mut board = board();
        let item = Item::rectangle(Rect::new(1995.0, 100.0, 1999.0, 110.0));
        let id = item.id();
        board.add([item]);
        assert_eq!(board.chunks_holding(id), vec![ChunkKey::new(0, 0)]);
        assert_eq!(board.chunk_keys(), vec![ChunkKey::new(0, 0), ChunkKey::new(1, 0)]);

        assert_eq!(board.redraw_chunks(infinite()), 2);
        let neighbour = board.chunk(ChunkKey::new(1, 0)).unwrap();
        assert!(neighbour.is_empty());
        assert_eq!(neighbour.surface().shape_count(), 1);

        board.remove(&[id]);
        assert_eq!(board.redraw_chunks(infinite()), 0);
        assert!(board.chunk_keys().is_empty());
    }

    #[test]
    fn test_set_shape_restores_geometry() {
        let mut board = board();
        let item = thin(Item::rectangle(Rect::new(0.3, 0.0, 10.0, 10.0)));
        let id = item.id();
        let original = item.shape.clone();
        board.add([item]);
        board.move_items(&[id], Vec2::new(3000.1, 0.0));
        assert_eq!(board.chunks_holding(id), vec![ChunkKey::new(1, 0)]);

        board.set_shape(id, original.clone());
        assert_eq!(board.get(id).unwrap().shape, original);
        assert_eq!(board.chunks_holding(id), vec![ChunkKey::new(0, 0)]);
    }
}

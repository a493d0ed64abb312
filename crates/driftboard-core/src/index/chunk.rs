//! Fixed-size tiles of board space.

use super::quadtree::QuadTree;
use crate::config::BoardConfig;
use crate::geometry::intersects;
use crate::items::ItemId;
use crate::render::DrawingSurface;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Integer grid coordinates of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkKey {
    pub cx: i64,
    pub cy: i64,
}

impl ChunkKey {
    pub fn new(cx: i64, cy: i64) -> Self {
        Self { cx, cy }
    }

    /// Board-space rectangle this chunk covers.
    pub fn boundary(&self, chunk_size: f64) -> Rect {
        let x = self.cx as f64 * chunk_size;
        let y = self.cy as f64 * chunk_size;
        Rect::new(x, y, x + chunk_size, y + chunk_size)
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.cx, self.cy)
    }
}

impl From<(i64, i64)> for ChunkKey {
    fn from((cx, cy): (i64, i64)) -> Self {
        Self::new(cx, cy)
    }
}

/// One tile: a quadtree of the items over it and a raster cache of their pixels.
///
/// The cache is drawn in chunk-local coordinates, so board point
/// `boundary.origin()` lands at the surface origin.
pub struct Chunk<S> {
    key: ChunkKey,
    boundary: Rect,
    tree: QuadTree,
    pub(crate) surface: S,
    /// Board-space region whose cached pixels are stale.
    dirty: Option<Rect>,
    /// Items whose stroke reaches into this chunk, indexed here or not.
    painters: usize,
}

impl<S: DrawingSurface> Chunk<S> {
    /// Create an empty chunk with `surface` as its cache.
    pub fn new(key: ChunkKey, config: &BoardConfig, surface: S) -> Self {
        let boundary = key.boundary(config.chunk_size);
        Self {
            key,
            boundary,
            tree: QuadTree::with_limits(boundary, config.max_capacity, config.max_depth),
            surface,
            dirty: None,
            painters: 0,
        }
    }

    /// Grid coordinates of this chunk.
    pub fn key(&self) -> ChunkKey {
        self.key
    }

    /// Board-space rectangle this chunk covers.
    pub fn boundary(&self) -> Rect {
        self.boundary
    }

    /// The quadtree over items indexed here.
    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    /// The raster cache, in chunk-local coordinates.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Stale region awaiting a redraw, if any.
    pub fn dirty(&self) -> Option<Rect> {
        self.dirty
    }

    /// Index an item's box and mark it stale.
    pub fn insert(&mut self, id: ItemId, bbox: Rect) {
        self.tree.insert(id, bbox);
        self.invalidate(bbox);
    }

    /// Drop an item from the index and mark its box stale.
    pub fn delete(&mut self, id: ItemId, bbox: Rect) {
        self.tree.delete(id, bbox);
        self.invalidate(bbox);
    }

    /// Collect ids whose indexed box intersects `region`.
    pub fn get(&self, region: Rect, out: &mut HashSet<ItemId>) {
        self.tree.get(region, out);
    }

    /// Collect every id indexed here.
    pub fn get_all(&self, out: &mut HashSet<ItemId>) {
        self.tree.get_all(out);
    }

    /// True when no item is indexed here. Strokes from neighbours may still
    /// paint into the cache; see [`is_unused`](Self::is_unused).
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Count an item whose painted box `paint` reaches this chunk.
    pub fn add_painter(&mut self, paint: Rect) {
        self.painters += 1;
        self.invalidate(paint);
    }

    /// Release a painter counted by [`add_painter`](Self::add_painter).
    pub fn remove_painter(&mut self, paint: Rect) {
        self.painters = self.painters.saturating_sub(1);
        self.invalidate(paint);
    }

    /// Number of items painting into this chunk.
    pub fn painters(&self) -> usize {
        self.painters
    }

    /// True when nothing paints here and the chunk can be dropped.
    pub fn is_unused(&self) -> bool {
        self.painters == 0
    }

    /// Mark part of the cache stale. Regions outside the chunk are clipped away.
    pub fn invalidate(&mut self, region: Rect) {
        if !intersects(self.boundary, region) {
            return;
        }
        let region = region.intersect(self.boundary);
        self.dirty = Some(match self.dirty {
            Some(dirty) => dirty.union(region),
            None => region,
        });
    }

    /// Take the pending dirty region, leaving the chunk clean.
    pub fn take_dirty(&mut self) -> Option<Rect> {
        self.dirty.take()
    }

    /// Drop every item and wipe the cache.
    pub fn clear(&mut self) {
        self.tree.delete_all();
        self.surface.clear();
        self.dirty = None;
        self.painters = 0;
    }
}

impl<S> fmt::Debug for Chunk<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("key", &self.key)
            .field("boundary", &self.boundary)
            .field("dirty", &self.dirty)
            .field("painters", &self.painters)
            .finish_non_exhaustive()
    }
}

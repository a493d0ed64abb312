//! Quadtree over item bounding boxes, one per chunk.

use crate::config::{DEFAULT_MAX_CAPACITY, DEFAULT_MAX_DEPTH};
use crate::geometry::intersects;
use crate::items::ItemId;
use kurbo::Rect;
use std::collections::HashSet;

/// A quadtree node. Leaves hold items; internal nodes hold exactly four children.
///
/// An item is stored in every leaf its box intersects, so one item may live
/// in several siblings. Identity is the item id; the box is only used to
/// steer traversal.
#[derive(Debug, Clone)]
pub struct QuadTree {
    boundary: Rect,
    depth: u32,
    max_capacity: usize,
    max_depth: u32,
    items: Vec<(ItemId, Rect)>,
    children: Option<Box<[QuadTree; 4]>>,
}

impl QuadTree {
    /// Create a root node with the default capacity and depth limits.
    pub fn new(boundary: Rect) -> Self {
        Self::with_limits(boundary, DEFAULT_MAX_CAPACITY, DEFAULT_MAX_DEPTH)
    }

    /// Create a root node with custom split limits.
    pub fn with_limits(boundary: Rect, max_capacity: usize, max_depth: u32) -> Self {
        Self::node(boundary, 0, max_capacity, max_depth)
    }

    fn node(boundary: Rect, depth: u32, max_capacity: usize, max_depth: u32) -> Self {
        Self {
            boundary,
            depth,
            max_capacity,
            max_depth,
            items: Vec::new(),
            children: None,
        }
    }

    /// Region this node covers.
    pub fn boundary(&self) -> Rect {
        self.boundary
    }

    /// Depth below the root, which is 0.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Items held directly by this node.
    pub fn local_len(&self) -> usize {
        self.items.len()
    }

    /// The four children of an internal node.
    pub fn children(&self) -> Option<&[QuadTree; 4]> {
        self.children.as_deref()
    }

    /// Insert an item. No-op when `bbox` misses this node.
    pub fn insert(&mut self, id: ItemId, bbox: Rect) {
        if !intersects(self.boundary, bbox) {
            return;
        }

        if let Some(children) = self.children.as_deref_mut() {
            for child in children.iter_mut() {
                child.insert(id, bbox);
            }
            return;
        }

        match self.items.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = bbox,
            None => self.items.push((id, bbox)),
        }

        if self.items.len() > self.max_capacity
            && self.depth < self.max_depth
            && self.items.iter().any(|(_, bbox)| !covers(*bbox, self.boundary))
        {
            self.subdivide();
        }
    }

    /// Split into four equal children and push local items down.
    fn subdivide(&mut self) {
        let Rect { x0, y0, x1, y1 } = self.boundary;
        let c = self.boundary.center();
        let depth = self.depth + 1;
        let (cap, max_depth) = (self.max_capacity, self.max_depth);

        let mut children = Box::new([
            QuadTree::node(Rect::new(x0, y0, c.x, c.y), depth, cap, max_depth),
            QuadTree::node(Rect::new(c.x, y0, x1, c.y), depth, cap, max_depth),
            QuadTree::node(Rect::new(x0, c.y, c.x, y1), depth, cap, max_depth),
            QuadTree::node(Rect::new(c.x, c.y, x1, y1), depth, cap, max_depth),
        ]);

        for (id, bbox) in std::mem::take(&mut self.items) {
            for child in children.iter_mut() {
                child.insert(id, bbox);
            }
        }
        self.children = Some(children);
    }

    /// Remove an item from every node its box reaches.
    pub fn delete(&mut self, id: ItemId, bbox: Rect) {
        if !intersects(self.boundary, bbox) {
            return;
        }
        match self.children.as_deref_mut() {
            Some(children) => {
                for child in children.iter_mut() {
                    child.delete(id, bbox);
                }
            }
            None => self.items.retain(|(existing, _)| *existing != id),
        }
    }

    /// Collect every item whose box intersects `region` into `out`.
    pub fn get(&self, region: Rect, out: &mut HashSet<ItemId>) {
        if !intersects(self.boundary, region) {
            return;
        }
        match self.children.as_deref() {
            Some(children) => {
                for child in children {
                    child.get(region, out);
                }
            }
            None => {
                out.extend(
                    self.items
                        .iter()
                        .filter(|(_, bbox)| intersects(*bbox, region))
                        .map(|(id, _)| *id),
                );
            }
        }
    }

    /// Collect every item regardless of position.
    pub fn get_all(&self, out: &mut HashSet<ItemId>) {
        out.extend(self.items.iter().map(|(id, _)| *id));
        if let Some(children) = self.children.as_deref() {
            for child in children {
                child.get_all(out);
            }
        }
    }

    /// Drop every item and collapse back to a single leaf.
    pub fn delete_all(&mut self) {
        self.items.clear();
        self.children = None;
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
            && self
                .children
                .as_deref()
                .is_none_or(|children| children.iter().all(QuadTree::is_empty))
    }

    /// Number of distinct items in the tree.
    pub fn len(&self) -> usize {
        let mut ids = HashSet::new();
        self.get_all(&mut ids);
        ids.len()
    }

    /// Deepest level reached below this node.
    pub fn max_depth_reached(&self) -> u32 {
        match self.children.as_deref() {
            Some(children) => children
                .iter()
                .map(QuadTree::max_depth_reached)
                .max()
                .unwrap_or(self.depth),
            None => self.depth,
        }
    }
}

/// Whether `outer` contains all of `inner`. Items covering a node land in
/// every child, so splitting cannot separate them.
fn covers(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

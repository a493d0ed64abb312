//! Rectangle shape.

use super::{ItemStyle, ShapeTrait, affine_scale};
use crate::geometry::{intersects, segment_intersects_rect};
use crate::render::DrawingSurface;
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub rect: Rect,
}

impl Rectangle {
    pub fn new(rect: Rect) -> Self {
        Self { rect: rect.abs() }
    }

    /// Create a rectangle from two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self::new(Rect::from_points(p1, p2))
    }
}

impl ShapeTrait for Rectangle {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn hit_test(&self, point: Point, tolerance: f64, style: &ItemStyle) -> bool {
        let reach = tolerance + style.weight;
        let outer = self.rect.inflate(reach, reach);
        if style.filled {
            return outer.contains(point);
        }
        let inner = self.rect.inflate(-reach, -reach);
        outer.contains(point) && !(inner.width() > 0.0 && inner.height() > 0.0 && inner.contains(point))
    }

    fn intersects_segment(&self, a: Point, b: Point, tolerance: f64, style: &ItemStyle) -> bool {
        let reach = tolerance + style.weight;
        if !segment_intersects_rect(a, b, self.rect.inflate(reach, reach)) {
            return false;
        }
        if style.filled {
            return true;
        }
        // An outline is only touched if the segment is not wholly inside the hole.
        let inner = self.rect.inflate(-reach, -reach);
        !(inner.width() > 0.0 && inner.height() > 0.0 && inner.contains(a) && inner.contains(b))
    }

    fn intersects_rect(&self, rect: Rect) -> bool {
        intersects(self.rect, rect)
    }

    fn transform(&mut self, affine: Affine) {
        self.rect = affine.transform_rect_bbox(self.rect);
    }

    fn render(&self, surface: &mut dyn DrawingSurface, transform: Affine, style: &ItemStyle) {
        surface.rect(
            transform.transform_rect_bbox(self.rect),
            style.color(),
            style.weight * affine_scale(transform),
            style.filled,
        );
    }
}

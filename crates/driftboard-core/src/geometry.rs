//! Geometry primitives shared by the index, items and viewport.
//!
//! Points and rectangles are plain `kurbo` types. This module adds the
//! sentinel rectangles, the min/max accumulator used for bounding boxes, and
//! the integer chunk span stored on every indexed item.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest width or height an indexed bounding box may have.
pub const MIN_EXTENT: f64 = 1.0;

/// Build a rectangle from an origin and a size.
pub fn rect_from_xywh(x: f64, y: f64, w: f64, h: f64) -> Rect {
    Rect::new(x, y, x + w, y + h)
}

/// A rectangle covering all of space. Identity for intersection tests.
pub fn infinite() -> Rect {
    Rect::new(
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
        f64::INFINITY,
        f64::INFINITY,
    )
}

/// A rectangle covering nothing. Identity for `Rect::union` accumulation.
pub fn inverted_infinite() -> Rect {
    Rect::new(
        f64::INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::NEG_INFINITY,
    )
}

/// Unsigned area of a rectangle, regardless of corner order.
pub fn abs_area(rect: Rect) -> f64 {
    (rect.width() * rect.height()).abs()
}

/// Closed-interval overlap test. Touching edges count as intersecting.
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Normalize corner order and grow degenerate axes to [`MIN_EXTENT`].
pub fn clamp_min_extent(rect: Rect) -> Rect {
    let mut rect = rect.abs();
    if rect.width() < MIN_EXTENT {
        rect.x1 = rect.x0 + MIN_EXTENT;
    }
    if rect.height() < MIN_EXTENT {
        rect.y1 = rect.y0 + MIN_EXTENT;
    }
    rect
}

/// Midpoint of two points.
pub fn midpoint(a: Point, b: Point) -> Point {
    a.midpoint(b)
}

/// Point reflected through the origin.
pub fn invert(p: Point) -> Point {
    Point::new(-p.x, -p.y)
}

/// Unit vector in the direction of `v`, or zero for a zero-length vector.
pub fn unit(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len < f64::EPSILON {
        Vec2::ZERO
    } else {
        v / len
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    (point - (a + seg * t)).hypot()
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [single] => (point - *single).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Test if two line segments (a-b) and (c-d) intersect.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    let on_segment = |p: Point, q: Point, r: Point| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-10 && on_segment(c, d, a))
        || (d2.abs() < 1e-10 && on_segment(c, d, b))
        || (d3.abs() < 1e-10 && on_segment(a, b, c))
        || (d4.abs() < 1e-10 && on_segment(a, b, d))
}

/// Test if a segment lies inside or crosses a rectangle.
pub fn segment_intersects_rect(a: Point, b: Point, rect: Rect) -> bool {
    if rect.contains(a) || rect.contains(b) {
        return true;
    }
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    (0..4).any(|i| segments_intersect(a, b, corners[i], corners[(i + 1) % 4]))
}

/// Min/max corner pair used to accumulate bounding boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxRect {
    pub min: Point,
    pub max: Point,
}

impl Default for MinMaxRect {
    fn default() -> Self {
        Self::inverted()
    }
}

impl MinMaxRect {
    /// An empty accumulator; appending anything yields that thing.
    pub fn inverted() -> Self {
        Self {
            min: Point::new(f64::INFINITY, f64::INFINITY),
            max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn from_rect(rect: Rect) -> Self {
        let rect = rect.abs();
        Self {
            min: Point::new(rect.x0, rect.y0),
            max: Point::new(rect.x1, rect.y1),
        }
    }

    /// True until something has been appended.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Grow to the union of `self` and `other`.
    pub fn append(&mut self, other: &MinMaxRect) {
        self.min.x = self.min.x.min(other.min.x);
        self.min.y = self.min.y.min(other.min.y);
        self.max.x = self.max.x.max(other.max.x);
        self.max.y = self.max.y.max(other.max.y);
    }

    /// Grow to include a point.
    pub fn append_point(&mut self, p: Point) {
        self.append(&MinMaxRect { min: p, max: p });
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min.x, self.min.y, self.max.x, self.max.y)
    }
}

/// Inclusive range of chunk coordinates an item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkSpan {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl ChunkSpan {
    /// Chunks covered by `bounds` (board space) on a grid of `chunk_size`.
    pub fn from_bounds(bounds: Rect, chunk_size: f64) -> Self {
        let bounds = bounds.abs();
        Self {
            min_x: (bounds.x0 / chunk_size).floor() as i64,
            min_y: (bounds.y0 / chunk_size).floor() as i64,
            max_x: (bounds.x1 / chunk_size).floor() as i64,
            max_y: (bounds.y1 / chunk_size).floor() as i64,
        }
    }

    pub fn contains(&self, cx: i64, cy: i64) -> bool {
        cx >= self.min_x && cx <= self.max_x && cy >= self.min_y && cy <= self.max_y
    }

    /// Number of chunks in the span.
    pub fn len(&self) -> usize {
        ((self.max_x - self.min_x + 1) * (self.max_y - self.min_y + 1)) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Iterate chunk coordinates row by row.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        (self.min_y..=self.max_y)
            .flat_map(move |cy| (self.min_x..=self.max_x).map(move |cx| (cx, cy)))
    }
}

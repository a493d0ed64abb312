//! Ellipse shape.

use super::{ItemStyle, ShapeTrait, affine_scale};
use crate::geometry::{intersects, point_to_segment_dist};
use crate::render::DrawingSurface;
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// An axis-aligned ellipse inscribed in `rect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub rect: Rect,
}

impl Ellipse {
    pub fn new(rect: Rect) -> Self {
        Self { rect: rect.abs() }
    }

    /// Create a circle.
    pub fn circle(center: Point, radius: f64) -> Self {
        Self::new(Rect::new(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        ))
    }

    pub fn center(&self) -> Point {
        self.rect.center()
    }

    pub fn radii(&self) -> (f64, f64) {
        (self.rect.width() / 2.0, self.rect.height() / 2.0)
    }

    /// Map a point into the unit-circle space of an ellipse with the given radii.
    fn normalize(&self, p: Point, rx: f64, ry: f64) -> Point {
        let c = self.center();
        Point::new((p.x - c.x) / rx, (p.y - c.y) / ry)
    }

    /// Inner radii of the stroke ring, or `None` when the ring has no hole.
    fn inner_radii(&self, reach: f64) -> Option<(f64, f64)> {
        let (rx, ry) = self.radii();
        let (ix, iy) = (rx - reach, ry - reach);
        (ix > f64::EPSILON && iy > f64::EPSILON).then_some((ix, iy))
    }
}

impl ShapeTrait for Ellipse {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn hit_test(&self, point: Point, tolerance: f64, style: &ItemStyle) -> bool {
        let (rx, ry) = self.radii();
        let reach = tolerance + style.weight;
        let outer = self.normalize(point, rx + reach, ry + reach);
        if outer.to_vec2().hypot2() > 1.0 {
            return false;
        }
        if style.filled {
            return true;
        }
        match self.inner_radii(reach) {
            Some((ix, iy)) => self.normalize(point, ix, iy).to_vec2().hypot2() > 1.0,
            None => true,
        }
    }

    fn intersects_segment(&self, a: Point, b: Point, tolerance: f64, style: &ItemStyle) -> bool {
        let (rx, ry) = self.radii();
        let reach = tolerance + style.weight;
        let (rx, ry) = (rx + reach, ry + reach);
        let (na, nb) = (self.normalize(a, rx, ry), self.normalize(b, rx, ry));
        if point_to_segment_dist(Point::ZERO, na, nb) > 1.0 {
            return false;
        }
        if style.filled {
            return true;
        }
        match self.inner_radii(reach) {
            Some((ix, iy)) => {
                let inside = |p: Point| self.normalize(p, ix, iy).to_vec2().hypot2() < 1.0;
                !(inside(a) && inside(b))
            }
            None => true,
        }
    }

    fn intersects_rect(&self, rect: Rect) -> bool {
        if !intersects(self.rect, rect) {
            return false;
        }
        let (rx, ry) = self.radii();
        if rx <= f64::EPSILON || ry <= f64::EPSILON {
            return true;
        }
        // Closest point of the rect to the centre, tested against the ellipse.
        let c = self.center();
        let rect = rect.abs();
        let nearest = Point::new(c.x.clamp(rect.x0, rect.x1), c.y.clamp(rect.y0, rect.y1));
        self.normalize(nearest, rx, ry).to_vec2().hypot2() <= 1.0
    }

    fn transform(&mut self, affine: Affine) {
        self.rect = affine.transform_rect_bbox(self.rect);
    }

    fn render(&self, surface: &mut dyn DrawingSurface, transform: Affine, style: &ItemStyle) {
        surface.ellipse(
            transform.transform_rect_bbox(self.rect),
            style.color(),
            style.weight * affine_scale(transform),
            style.filled,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disc() -> Ellipse {
        Ellipse::circle(Point::new(50.0, 50.0), 50.0)
    }

    #[test]
    fn test_circle_bounds() {
        assert_eq!(disc().bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(disc().radii(), (50.0, 50.0));
    }

    #[test]
    fn test_hit_test_ring() {
        let style = ItemStyle::default();
        assert!(disc().hit_test(Point::new(100.0, 50.0), 0.0, &style));
        assert!(!disc().hit_test(Point::new(50.0, 50.0), 0.0, &style));
        assert!(!disc().hit_test(Point::new(0.0, 0.0), 0.0, &style));
    }

    #[test]
    fn test_hit_test_filled() {
        let style = ItemStyle {
            filled: true,
            ..ItemStyle::default()
        };
        assert!(disc().hit_test(Point::new(50.0, 50.0), 0.0, &style));
    }

    #[test]
    fn test_intersects_rect_corner_miss() {
        // Overlaps the bounding box corner but not the ellipse itself.
        assert!(!disc().intersects_rect(Rect::new(0.0, 0.0, 5.0, 5.0)));
        assert!(disc().intersects_rect(Rect::new(40.0, 40.0, 60.0, 60.0)));
    }

    #[test]
    fn test_intersects_segment() {
        let style = ItemStyle::default();
        assert!(disc().intersects_segment(Point::new(-10.0, 50.0), Point::new(10.0, 50.0), 0.0, &style));
        assert!(!disc().intersects_segment(Point::new(45.0, 50.0), Point::new(55.0, 50.0), 0.0, &style));
        assert!(!disc().intersects_segment(Point::new(-10.0, -10.0), Point::new(-5.0, 110.0), 0.0, &style));
    }
}

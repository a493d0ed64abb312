//! Freehand path shape.

use super::{ItemStyle, ShapeTrait, affine_scale};
use crate::geometry::{MinMaxRect, point_to_polyline_dist, point_to_segment_dist, segment_intersects_rect, segments_intersect};
use crate::render::DrawingSurface;
use crate::stroke::{self, StrokeOptions, StrokePoint};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

/// A freehand stroke: ordered, pressure-tagged samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<StrokePoint>,
}

impl Path {
    pub fn new(points: Vec<StrokePoint>) -> Self {
        Self { points }
    }

    /// Create from raw samples, simplified with the given threshold.
    pub fn simplified(points: &[StrokePoint], threshold: f64) -> Self {
        Self {
            points: stroke::simplify(points, threshold),
        }
    }

    /// Append a sample.
    pub fn add_point(&mut self, point: StrokePoint) {
        self.points.push(point);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Simplify the samples in place.
    pub fn simplify(&mut self, threshold: f64) {
        self.points = stroke::simplify(&self.points, threshold);
    }

    fn positions(&self) -> Vec<Point> {
        self.points.iter().map(|p| p.point).collect()
    }
}

impl ShapeTrait for Path {
    fn bounds(&self) -> Rect {
        if self.points.is_empty() {
            return Rect::ZERO;
        }
        let mut acc = MinMaxRect::inverted();
        for sample in &self.points {
            acc.append_point(sample.point);
        }
        acc.to_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64, style: &ItemStyle) -> bool {
        point_to_polyline_dist(point, &self.positions()) <= tolerance + style.weight
    }

    fn intersects_segment(&self, a: Point, b: Point, tolerance: f64, style: &ItemStyle) -> bool {
        let reach = tolerance + style.weight;
        let points = self.positions();
        if let [only] = points.as_slice() {
            return point_to_segment_dist(*only, a, b) <= reach;
        }
        points.windows(2).any(|w| {
            segments_intersect(a, b, w[0], w[1])
                || point_to_segment_dist(w[0], a, b) <= reach
                || point_to_segment_dist(w[1], a, b) <= reach
                || point_to_segment_dist(a, w[0], w[1]) <= reach
                || point_to_segment_dist(b, w[0], w[1]) <= reach
        })
    }

    fn intersects_rect(&self, rect: Rect) -> bool {
        let points = self.positions();
        match points.as_slice() {
            [] => false,
            [only] => rect.contains(*only),
            _ => points
                .windows(2)
                .any(|w| segment_intersects_rect(w[0], w[1], rect)),
        }
    }

    fn transform(&mut self, affine: Affine) {
        for sample in &mut self.points {
            sample.point = affine * sample.point;
        }
    }

    fn render(&self, surface: &mut dyn DrawingSurface, transform: Affine, style: &ItemStyle) {
        let samples: Vec<StrokePoint> = self
            .points
            .iter()
            .map(|p| StrokePoint {
                point: transform * p.point,
                pressure: p.pressure,
            })
            .collect();
        let options = StrokeOptions::new(style.weight * affine_scale(transform)).filled(style.filled);
        let geometry = stroke::stroke_path(&samples, options);
        if geometry.is_empty() {
            return;
        }
        if let Some(fill) = &geometry.fill {
            surface.stroke_path(fill, style.color());
        }
        surface.stroke_path(&geometry.outline, style.color());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, RecordingSurface};

    fn line() -> Path {
        Path::new(vec![StrokePoint::new(0.0, 0.0), StrokePoint::new(100.0, 0.0)])
    }

    #[test]
    fn test_bounds() {
        let path = Path::new(vec![
            StrokePoint::new(0.0, 0.0),
            StrokePoint::new(100.0, 50.0),
            StrokePoint::new(50.0, 100.0),
        ]);
        assert_eq!(path.bounds(), Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(Path::default().bounds(), Rect::ZERO);
    }

    #[test]
    fn test_simplified() {
        let raw = vec![
            StrokePoint::new(0.0, 0.0),
            StrokePoint::new(1.0, 0.1),
            StrokePoint::new(2.0, 0.0),
            StrokePoint::new(3.0, 0.1),
            StrokePoint::new(4.0, 0.0),
        ];
        let path = Path::simplified(&raw, 0.5);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_hit_test() {
        let style = ItemStyle::default();
        assert!(line().hit_test(Point::new(50.0, 0.0), 5.0, &style));
        assert!(!line().hit_test(Point::new(50.0, 20.0), 5.0, &style));
    }

    #[test]
    fn test_intersects_segment() {
        let style = ItemStyle::default();
        let path = line();
        assert!(path.intersects_segment(Point::new(50.0, -10.0), Point::new(50.0, 10.0), 0.0, &style));
        assert!(!path.intersects_segment(Point::new(50.0, 10.0), Point::new(60.0, 30.0), 0.0, &style));
    }

    #[test]
    fn test_intersects_rect() {
        let path = line();
        assert!(path.intersects_rect(Rect::new(40.0, -5.0, 60.0, 5.0)));
        assert!(!path.intersects_rect(Rect::new(40.0, 5.0, 60.0, 15.0)));
    }

    #[test]
    fn test_render_emits_outline() {
        let mut surface = RecordingSurface::new();
        line().render(&mut surface, Affine::IDENTITY, &ItemStyle::default());
        assert_eq!(surface.commands().len(), 1);
        assert!(matches!(surface.commands()[0], DrawCommand::Path { .. }));

        let mut surface = RecordingSurface::new();
        Path::default().render(&mut surface, Affine::IDENTITY, &ItemStyle::default());
        assert!(surface.commands().is_empty());
    }
}

//! Stroke geometry: pointer samples to a smooth, variable-width outline.
//!
//! The pipeline is `simplify` → `outline` → `encode`. None of the steps can
//! fail; degenerate input produces an empty path that draws nothing.

use crate::config::SIMPLIFY_THRESHOLD;
use crate::geometry::{midpoint, unit};
use kurbo::{BezPath, Point, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Pressure change rate when pressure is simulated from point spacing.
const PRESSURE_SMOOTHING: f64 = 0.275;

/// Default pressure for samples that carry none.
const DEFAULT_PRESSURE: f64 = 0.5;

/// Polygon steps used for a single-point stroke.
const DOT_STEPS: usize = 8;

/// Fan steps used at sharp direction reversals.
const CORNER_STEPS: usize = 13;

/// A pointer sample with optional pen pressure in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub point: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            point: Point::new(x, y),
            pressure: None,
        }
    }

    pub fn with_pressure(x: f64, y: f64, pressure: f64) -> Self {
        Self {
            point: Point::new(x, y),
            pressure: Some(pressure.clamp(0.0, 1.0)),
        }
    }
}

impl From<Point> for StrokePoint {
    fn from(point: Point) -> Self {
        Self {
            point,
            pressure: None,
        }
    }
}

/// Options for building a stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeOptions {
    /// Half-width of the stroke.
    pub weight: f64,
    /// Also produce a fill path for the closed centreline.
    pub filled: bool,
    /// Simplification threshold (squared distance).
    pub threshold: f64,
}

impl StrokeOptions {
    pub fn new(weight: f64) -> Self {
        Self {
            weight,
            filled: false,
            threshold: SIMPLIFY_THRESHOLD,
        }
    }

    pub fn filled(mut self, filled: bool) -> Self {
        self.filled = filled;
        self
    }
}

/// Output of the stroke pipeline.
#[derive(Debug, Clone, Default)]
pub struct StrokeGeometry {
    /// Simplified samples.
    pub points: Vec<StrokePoint>,
    /// Closed outline of the stroke body.
    pub outline: BezPath,
    /// Closed centreline, present for filled strokes with at least three points.
    pub fill: Option<BezPath>,
}

impl StrokeGeometry {
    pub fn is_empty(&self) -> bool {
        self.outline.elements().is_empty()
    }
}

/// Run the whole pipeline on raw samples.
pub fn stroke_path(points: &[StrokePoint], options: StrokeOptions) -> StrokeGeometry {
    let points = simplify(points, options.threshold);
    let outline_points = outline(&points, options.weight);
    let fill = if options.filled && points.len() >= 3 {
        Some(closed_polyline(&points))
    } else {
        None
    };
    StrokeGeometry {
        outline: encode(&outline_points),
        fill,
        points,
    }
}

/// Adaptive Ramer–Douglas–Peucker simplification.
///
/// The first and last samples always survive. A result of two identical
/// points collapses to one.
pub fn simplify(points: &[StrokePoint], threshold: f64) -> Vec<StrokePoint> {
    let mut out = if points.len() <= 2 {
        points.to_vec()
    } else {
        let mut out = Vec::new();
        simplify_range(points, 0, points.len(), threshold, &mut out);
        out
    };
    if out.len() == 2 && out[0].point == out[1].point {
        out.truncate(1);
    }
    out
}

/// Simplify `points[start..end]`, appending to `out`. Requires `end - start >= 2`.
fn simplify_range(
    points: &[StrokePoint],
    start: usize,
    end: usize,
    threshold: f64,
    out: &mut Vec<StrokePoint>,
) {
    let first = points[start].point;
    let last = points[end - 1].point;

    let mut max_dist = 0.0;
    let mut max_index = start;
    for (i, sample) in points.iter().enumerate().take(end - 1).skip(start + 1) {
        let dist = perpendicular_distance_sq(sample.point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > threshold {
        simplify_range(points, start, max_index + 1, threshold, out);
        // Both halves share the split point.
        out.pop();
        simplify_range(points, max_index, end, threshold, out);
    } else {
        out.push(points[start]);
        out.push(points[end - 1]);
    }
}

/// Squared perpendicular distance from a point to the line through `a` and `b`.
fn perpendicular_distance_sq(point: Point, a: Point, b: Point) -> f64 {
    let chord = b - a;
    let len_sq = chord.hypot2();
    if len_sq < f64::EPSILON {
        return (point - a).hypot2();
    }
    let cross = (point - a).cross(chord);
    cross * cross / len_sq
}

/// Variable-width outline polygon of a simplified stroke.
pub fn outline(points: &[StrokePoint], weight: f64) -> Vec<Point> {
    match points {
        [] => Vec::new(),
        [only] => (0..DOT_STEPS)
            .map(|i| only.point + Vec2::from_angle(TAU * i as f64 / DOT_STEPS as f64) * weight)
            .collect(),
        _ => variable_width_outline(points, weight),
    }
}

fn variable_width_outline(points: &[StrokePoint], weight: f64) -> Vec<Point> {
    let n = points.len();
    let size = weight * 2.0;
    let min_dist_sq = weight * weight;

    let mut left: Vec<Point> = Vec::with_capacity(n);
    let mut right: Vec<Point> = Vec::with_capacity(n);
    let mut prev_pressure = points[0].pressure.unwrap_or(DEFAULT_PRESSURE);

    for i in 0..n {
        let p = points[i].point;
        let incoming = if i > 0 { unit(p - points[i - 1].point) } else { Vec2::ZERO };
        let outgoing = if i + 1 < n { unit(points[i + 1].point - p) } else { Vec2::ZERO };

        let pressure = match points[i].pressure {
            Some(pressure) => pressure,
            None => {
                let spacing = if i > 0 { (p - points[i - 1].point).hypot() } else { 0.0 };
                let target = 1.0 - (spacing / size).min(1.0);
                (prev_pressure + (target - prev_pressure) * PRESSURE_SMOOTHING).clamp(0.0, 1.0)
            }
        };
        prev_pressure = pressure;
        let radius = weight * (0.5 - (0.5 - pressure) / 2.0);

        let sharp = incoming != Vec2::ZERO
            && outgoing != Vec2::ZERO
            && incoming.dot(outgoing) < 0.0;
        if sharp {
            let offset = perpendicular(incoming) * radius;
            for step in 0..=CORNER_STEPS {
                let t = step as f64 / CORNER_STEPS as f64;
                left.push(rotate_around(p - offset, p, PI * t));
                right.push(rotate_around(p + offset, p, -PI * t));
            }
            continue;
        }

        let mut tangent = unit(incoming + outgoing);
        if tangent == Vec2::ZERO {
            tangent = if incoming != Vec2::ZERO { incoming } else { outgoing };
        }
        if tangent == Vec2::ZERO {
            tangent = Vec2::new(1.0, 0.0);
        }
        let offset = perpendicular(tangent) * radius;
        let edge = i == 0 || i == n - 1;

        let tl = p - offset;
        if edge || left.last().is_none_or(|last| (tl - *last).hypot2() > min_dist_sq) {
            left.push(tl);
        }
        let tr = p + offset;
        if edge || right.last().is_none_or(|last| (tr - *last).hypot2() > min_dist_sq) {
            right.push(tr);
        }
    }

    left.extend(right.into_iter().rev());
    left
}

fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

fn rotate_around(p: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let d = p - center;
    Point::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

/// Encode an outline polygon as a closed curve of successive-midpoint quadratics.
pub fn encode(outline: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let n = outline.len();
    if n == 0 {
        return path;
    }

    path.move_to(midpoint(outline[n - 1], outline[0]));
    for i in 0..n {
        let next = outline[(i + 1) % n];
        path.quad_to(outline[i], midpoint(outline[i], next));
    }
    path.close_path();
    path
}

fn closed_polyline(points: &[StrokePoint]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = points.split_first() {
        path.move_to(first.point);
        for sample in rest {
            path.line_to(sample.point);
        }
        path.close_path();
    }
    path
}

//! Viewport module for pan/zoom transforms.
//!
//! Three spaces are in play:
//!
//! - *screen*: pixels of the visible view.
//! - *viewport*: item coordinates, `(screen - offset) / scale`.
//! - *board*: viewport coordinates with the zoom applied but no pan,
//!   `viewport * scale`. Chunks tile this space, so one board unit is one
//!   pixel of a chunk's raster cache.

use crate::config::{MAX_SCALE, MIN_SCALE};
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Pan offset and zoom scale of the visible view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom scale.
    pub scale: f64,
    /// Minimum allowed scale.
    pub min_scale: f64,
    /// Maximum allowed scale.
    pub max_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
        }
    }
}

impl Viewport {
    /// Create a viewport at the origin with scale 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport with custom scale bounds.
    pub fn with_bounds(min_scale: f64, max_scale: f64) -> Self {
        Self {
            min_scale,
            max_scale,
            ..Self::default()
        }
    }

    /// Affine transform from viewport to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Affine transform from screen to viewport coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.scale) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to viewport coordinates.
    pub fn screen_to_viewport(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.scale,
            (p.y - self.offset.y) / self.scale,
        )
    }

    /// Convert a viewport point to screen coordinates.
    pub fn viewport_to_screen(&self, p: Point) -> Point {
        Point::new(
            self.offset.x + p.x * self.scale,
            self.offset.y + p.y * self.scale,
        )
    }

    /// Apply the zoom scale. Identity at scale 1 so unzoomed boards never drift.
    pub fn viewport_to_board(&self, p: Point) -> Point {
        if self.scale == 1.0 {
            return p;
        }
        Point::new(p.x * self.scale, p.y * self.scale)
    }

    /// Undo the zoom scale. Identity at scale 1.
    pub fn board_to_viewport(&self, p: Point) -> Point {
        if self.scale == 1.0 {
            return p;
        }
        Point::new(p.x / self.scale, p.y / self.scale)
    }

    /// Rectangle form of [`viewport_to_board`](Self::viewport_to_board).
    pub fn viewport_to_board_rect(&self, rect: Rect) -> Rect {
        scale_rect(rect, self.scale)
    }

    /// Rectangle form of [`board_to_viewport`](Self::board_to_viewport).
    pub fn board_to_viewport_rect(&self, rect: Rect) -> Rect {
        if self.scale == 1.0 {
            return rect;
        }
        scale_rect(rect, 1.0 / self.scale)
    }

    /// Board rectangle as it appears on screen.
    pub fn board_to_screen_rect(&self, rect: Rect) -> Rect {
        rect + self.offset
    }

    /// Screen rectangle in board space; only the pan is removed.
    pub fn screen_to_board_rect(&self, rect: Rect) -> Rect {
        rect - self.offset
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset += Vec2::new(dx, dy);
    }

    /// Zoom to `scale - delta`, keeping the screen point `center` anchored.
    ///
    /// Returns `false` without touching any state when the new scale would
    /// leave `[min_scale, max_scale]`.
    pub fn zoom(&mut self, center: Point, delta: f64) -> bool {
        let new_scale = self.scale - delta;
        if !(self.min_scale..=self.max_scale).contains(&new_scale) || delta == 0.0 {
            log::trace!("zoom to {new_scale} rejected");
            return false;
        }

        // Keep (center - offset) / scale constant across the scale change.
        let ratio = new_scale / self.scale;
        self.offset = Vec2::new(
            center.x - (center.x - self.offset.x) * ratio,
            center.y - (center.y - self.offset.y) * ratio,
        );
        self.scale = new_scale;
        true
    }

    /// Viewport-space rectangle visible on a screen of the given size.
    pub fn visible_rect(&self, screen: Size) -> Rect {
        let p0 = self.screen_to_viewport(Point::ZERO);
        let p1 = self.screen_to_viewport(Point::new(screen.width, screen.height));
        Rect::from_points(p0, p1)
    }

    /// Reset to the origin at scale 1.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.scale = 1.0;
    }

    /// Fit the view to show the given viewport-space bounds.
    pub fn fit_to_bounds(&mut self, bounds: Rect, screen: Size, padding: f64) {
        if bounds.width() <= f64::EPSILON || bounds.height() <= f64::EPSILON {
            self.reset();
            return;
        }

        let padded = Size::new(
            (screen.width - padding * 2.0).max(1.0),
            (screen.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        self.scale = scale_x.min(scale_y).clamp(self.min_scale, self.max_scale);

        let bounds_center = bounds.center();
        self.offset = Vec2::new(
            screen.width / 2.0 - bounds_center.x * self.scale,
            screen.height / 2.0 - bounds_center.y * self.scale,
        );
    }
}

fn scale_rect(rect: Rect, scale: f64) -> Rect {
    if scale == 1.0 {
        return rect;
    }
    Rect::new(
        rect.x0 * scale,
        rect.y0 * scale,
        rect.x1 * scale,
        rect.y1 * scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::new();
        assert_eq!(viewport.offset, Vec2::ZERO);
        assert!((viewport.scale - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_viewport_with_offset() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(50.0, 100.0);
        let p = viewport.screen_to_viewport(Point::new(100.0, 200.0));
        assert!((p.x - 50.0).abs() < f64::EPSILON);
        assert!((p.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_viewport_with_scale() {
        let mut viewport = Viewport::new();
        viewport.scale = 2.0;
        let p = viewport.screen_to_viewport(Point::new(100.0, 200.0));
        assert!((p.x - 50.0).abs() < f64::EPSILON);
        assert!((p.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(30.0, -20.0);
        viewport.scale = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = viewport.screen_to_viewport(viewport.viewport_to_screen(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_affine_matches_pointwise() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(7.0, 9.0);
        viewport.scale = 0.5;
        let p = Point::new(40.0, -12.0);
        let a = viewport.transform() * p;
        let b = viewport.viewport_to_screen(p);
        assert!((a - b).hypot() < 1e-10);
        let c = viewport.inverse_transform() * b;
        assert!((c - p).hypot() < 1e-10);
    }

    #[test]
    fn test_zoom_anchored_at_center() {
        let mut viewport = Viewport::new();
        let center = Point::new(400.0, 300.0);
        let before = viewport.screen_to_viewport(center);

        assert!(viewport.zoom(center, -0.1));
        assert!((viewport.scale - 1.1).abs() < 1e-12);

        let after = viewport.screen_to_viewport(center);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_out_of_range_is_noop() {
        let mut viewport = Viewport::new();
        viewport.scale = 0.15;
        assert!(!viewport.zoom(Point::ZERO, 0.1));
        assert!((viewport.scale - 0.15).abs() < f64::EPSILON);

        viewport.scale = 3.95;
        assert!(!viewport.zoom(Point::ZERO, -0.1));
        assert!((viewport.scale - 3.95).abs() < f64::EPSILON);
        assert_eq!(viewport.offset, Vec2::ZERO);
    }

    #[test]
    fn test_pan() {
        let mut viewport = Viewport::new();
        viewport.pan(10.0, 20.0);
        viewport.pan(-5.0, 0.0);
        assert!((viewport.offset.x - 5.0).abs() < f64::EPSILON);
        assert!((viewport.offset.y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_board_mapping_identity_at_unit_scale() {
        let viewport = Viewport::new();
        let p = Point::new(0.1, 0.7);
        assert_eq!(viewport.viewport_to_board(p), p);
        let r = Rect::new(0.1, 0.2, 0.3, 0.4);
        assert_eq!(viewport.viewport_to_board_rect(r), r);
    }

    #[test]
    fn test_board_to_screen_rect() {
        let mut viewport = Viewport::new();
        viewport.pan(100.0, 50.0);
        let r = viewport.board_to_screen_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(r, Rect::new(100.0, 50.0, 110.0, 60.0));
        assert_eq!(viewport.screen_to_board_rect(r), Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_fit_to_bounds_centers() {
        let mut viewport = Viewport::new();
        viewport.fit_to_bounds(Rect::new(0.0, 0.0, 200.0, 100.0), Size::new(400.0, 400.0), 0.0);
        assert!((viewport.scale - 2.0).abs() < 1e-12);
        let center = viewport.viewport_to_screen(Point::new(100.0, 50.0));
        assert!((center.x - 200.0).abs() < 1e-9);
        assert!((center.y - 200.0).abs() < 1e-9);
    }
}

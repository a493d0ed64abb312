//! Drawing surface abstraction and chunk-cached frame rendering.
//!
//! The core never touches pixels. It issues draw calls against a
//! [`DrawingSurface`]: one per chunk as a persistent cache, plus the frame
//! target the caches are composited onto.

use crate::board::Board;
use crate::geometry::intersects;
use crate::index::Chunk;
use crate::items::{Item, PackedColor};
use crate::viewport::Viewport;
use kurbo::{Affine, BezPath, Point, Rect, Size};
use peniko::Color;

/// Trait for raster backends.
pub trait DrawingSurface {
    /// Clear the surface, or only the clipped region inside [`scissor`](Self::scissor).
    fn clear(&mut self);

    /// Clip to `clip` and run `render` against the clipped surface.
    fn scissor(&mut self, clip: Rect, render: &mut dyn FnMut(&mut dyn DrawingSurface));

    /// Paint a closed outline.
    fn stroke_path(&mut self, outline: &BezPath, color: Color);

    fn rect(&mut self, rect: Rect, color: Color, weight: f64, filled: bool);

    fn ellipse(&mut self, rect: Rect, color: Color, weight: f64, filled: bool);

    /// Composite another surface of the same kind with its origin at `origin`.
    fn draw_surface(&mut self, source: &Self, origin: Point)
    where
        Self: Sized;
}

/// Creates the raster cache for a new chunk, given the chunk side length.
pub type SurfaceFactory<S> = Box<dyn Fn(f64) -> S>;

/// A single recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    PushClip(Rect),
    PopClip,
    Path {
        path: BezPath,
        color: PackedColor,
    },
    Rect {
        rect: Rect,
        color: PackedColor,
        weight: f64,
        filled: bool,
    },
    Ellipse {
        rect: Rect,
        color: PackedColor,
        weight: f64,
        filled: bool,
    },
    Surface {
        origin: Point,
        commands: usize,
    },
}

/// In-memory surface that records draw calls instead of rasterizing.
///
/// Useful for tests, headless exports and backends that replay a display list.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    clip_depth: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw calls recorded so far.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of shape draw calls (paths, rects and ellipses).
    pub fn shape_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    DrawCommand::Path { .. } | DrawCommand::Rect { .. } | DrawCommand::Ellipse { .. }
                )
            })
            .count()
    }
}

impl DrawingSurface for RecordingSurface {
    fn clear(&mut self) {
        if self.clip_depth == 0 {
            self.commands.clear();
        } else {
            self.commands.push(DrawCommand::Clear);
        }
    }

    fn scissor(&mut self, clip: Rect, render: &mut dyn FnMut(&mut dyn DrawingSurface)) {
        self.commands.push(DrawCommand::PushClip(clip));
        self.clip_depth += 1;
        render(self);
        self.clip_depth -= 1;
        self.commands.push(DrawCommand::PopClip);
    }

    fn stroke_path(&mut self, outline: &BezPath, color: Color) {
        self.commands.push(DrawCommand::Path {
            path: outline.clone(),
            color: color.into(),
        });
    }

    fn rect(&mut self, rect: Rect, color: Color, weight: f64, filled: bool) {
        self.commands.push(DrawCommand::Rect {
            rect,
            color: color.into(),
            weight,
            filled,
        });
    }

    fn ellipse(&mut self, rect: Rect, color: Color, weight: f64, filled: bool) {
        self.commands.push(DrawCommand::Ellipse {
            rect,
            color: color.into(),
            weight,
            filled,
        });
    }

    fn draw_surface(&mut self, source: &Self, origin: Point) {
        self.commands.push(DrawCommand::Surface {
            origin,
            commands: source.commands.len(),
        });
    }
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Chunks whose cache was redrawn this frame.
    pub chunks_redrawn: usize,
    /// Chunks composited onto the target.
    pub chunks_composited: usize,
}

/// Redraw the dirty part of one chunk's cache. Returns `false` if it was clean.
///
/// `visible` holds the items painting into the dirty region, back to front.
/// Drawing is clipped to the dirty region.
pub fn render_chunk<S: DrawingSurface>(chunk: &mut Chunk<S>, visible: &[&Item], scale: f64) -> bool {
    let Some(dirty) = chunk.take_dirty() else {
        return false;
    };

    let origin = chunk.boundary().origin().to_vec2();
    let transform = Affine::translate(-origin) * Affine::scale(scale);
    log::trace!("redrawing chunk {} ({} items)", chunk.key(), visible.len());

    chunk.surface.scissor(dirty - origin, &mut |surface| {
        surface.clear();
        for item in visible {
            item.render(surface, transform);
        }
    });
    true
}

/// Render one frame of `screen` size onto `target`.
///
/// Dirty chunks in view are redrawn into their caches first; chunks out of
/// view stay dirty until they scroll in.
pub fn render_frame<S: DrawingSurface>(
    board: &mut Board<S>,
    viewport: &Viewport,
    screen: Size,
    target: &mut S,
) -> FrameStats {
    let visible = viewport.screen_to_board_rect(Rect::from_origin_size(Point::ZERO, screen));
    let mut stats = FrameStats {
        chunks_redrawn: board.redraw_chunks(visible),
        ..FrameStats::default()
    };

    target.clear();
    let mut chunks: Vec<&Chunk<S>> = board
        .chunks()
        .filter(|chunk| intersects(chunk.boundary(), visible) && !chunk.is_unused())
        .collect();
    chunks.sort_by_key(|chunk| chunk.key());
    for chunk in chunks {
        let origin = viewport.board_to_screen_rect(chunk.boundary()).origin();
        target.draw_surface(chunk.surface(), origin);
        stats.chunks_composited += 1;
    }
    stats
}

//! Drawing tools that turn pointer input into items.

use crate::config::SIMPLIFY_THRESHOLD;
use crate::items::{Ellipse, Item, ItemStyle, Path, Rectangle, Shape};
use crate::stroke::StrokePoint;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Freehand samples closer than this to the previous one are dropped.
pub const MIN_SAMPLE_DISTANCE: f64 = 1.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Pen,
    Rectangle,
    Ellipse,
}

/// State of a tool interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ToolState {
    /// Waiting for a pointer press.
    #[default]
    Idle,
    /// Pointer is down.
    Active { start: Point, current: Point },
}

/// Manages the current tool and its in-progress interaction.
///
/// Points are expected in viewport space.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    pub state: ToolState,
    /// Style applied to created items.
    pub current_style: ItemStyle,
    /// Threshold used to simplify finished pen strokes.
    pub simplify_threshold: f64,
    samples: Vec<StrokePoint>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::default(),
            current_style: ItemStyle::default(),
            simplify_threshold: SIMPLIFY_THRESHOLD,
            samples: Vec::new(),
        }
    }
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch tools, abandoning any interaction in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.cancel();
    }

    /// Pointer pressed.
    pub fn begin(&mut self, point: Point, pressure: Option<f64>) {
        self.samples.clear();
        if self.current_tool == ToolKind::Pen {
            self.samples.push(sample(point, pressure));
        }
        self.state = ToolState::Active {
            start: point,
            current: point,
        };
    }

    /// Pointer moved while pressed.
    pub fn update(&mut self, point: Point, pressure: Option<f64>) {
        let ToolState::Active { current, .. } = &mut self.state else {
            return;
        };
        *current = point;

        if self.current_tool == ToolKind::Pen {
            let far_enough = self
                .samples
                .last()
                .is_none_or(|last| last.point.distance(point) >= MIN_SAMPLE_DISTANCE);
            if far_enough {
                self.samples.push(sample(point, pressure));
            }
        }
    }

    /// Pointer released. Returns the finished item, if the gesture produced one.
    pub fn finish(&mut self, point: Point, pressure: Option<f64>) -> Option<Item> {
        self.update(point, pressure);
        let item = self.build();
        self.cancel();
        item
    }

    /// Abandon the current interaction.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
        self.samples.clear();
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    /// Raw pen samples collected so far.
    pub fn samples(&self) -> &[StrokePoint] {
        &self.samples
    }

    /// Item the gesture would produce if released now. Pen previews are not simplified.
    pub fn preview(&self) -> Option<Item> {
        let ToolState::Active { start, current } = self.state else {
            return None;
        };
        let shape = match self.current_tool {
            ToolKind::Pen => Shape::Path(Path::new(self.samples.clone())),
            ToolKind::Rectangle => Shape::Rectangle(Rectangle::from_corners(start, current)),
            ToolKind::Ellipse => Shape::Ellipse(Ellipse::new(Rect::from_points(start, current))),
        };
        Some(Item::new(shape).with_style(self.current_style))
    }

    fn build(&self) -> Option<Item> {
        let ToolState::Active { start, current } = self.state else {
            return None;
        };
        let shape = match self.current_tool {
            ToolKind::Pen => {
                if self.samples.is_empty() {
                    return None;
                }
                Shape::Path(Path::simplified(&self.samples, self.simplify_threshold))
            }
            ToolKind::Rectangle | ToolKind::Ellipse => {
                let rect = Rect::from_points(start, current);
                if rect.width() == 0.0 && rect.height() == 0.0 {
                    return None;
                }
                if self.current_tool == ToolKind::Rectangle {
                    Shape::Rectangle(Rectangle::new(rect))
                } else {
                    Shape::Ellipse(Ellipse::new(rect))
                }
            }
        };
        Some(Item::new(shape).with_style(self.current_style))
    }
}

fn sample(point: Point, pressure: Option<f64>) -> StrokePoint {
    match pressure {
        Some(p) => StrokePoint::with_pressure(point.x, point.y, p),
        None => StrokePoint::from(point),
    }
}

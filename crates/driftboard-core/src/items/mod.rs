//! Drawable items placed on the board.

mod ellipse;
mod path;
mod rectangle;

pub use ellipse::Ellipse;
pub use path::Path;
pub use rectangle::Rectangle;

use crate::geometry::ChunkSpan;
use crate::render::DrawingSurface;
use kurbo::{Affine, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for items.
pub type ItemId = u64;

/// Allocate a fresh item id.
///
/// Ids are drawn from a v4 UUID so items created by different peers do not
/// collide when their edits are merged onto one board.
pub fn new_item_id() -> ItemId {
    Uuid::new_v4().as_u128() as u64
}

/// Color packed as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackedColor(pub u32);

impl PackedColor {
    pub const BLACK: PackedColor = PackedColor(0x0000_00ff);
    pub const WHITE: PackedColor = PackedColor(0xffff_ffff);
    pub const TRANSPARENT: PackedColor = PackedColor(0);

    pub const fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    pub const fn to_rgba8(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl Default for PackedColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<Color> for PackedColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<PackedColor> for Color {
    fn from(color: PackedColor) -> Self {
        let [r, g, b, a] = color.to_rgba8();
        Color::from_rgba8(r, g, b, a)
    }
}

/// Style properties shared by every item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemStyle {
    /// Stroke (and fill) color.
    pub color: PackedColor,
    /// Stroke half-width in viewport units.
    pub weight: f64,
    /// Fill the interior.
    #[serde(default)]
    pub filled: bool,
}

impl Default for ItemStyle {
    fn default() -> Self {
        Self {
            color: PackedColor::BLACK,
            weight: 2.0,
            filled: false,
        }
    }
}

impl ItemStyle {
    /// The color as a peniko Color.
    pub fn color(&self) -> Color {
        self.color.into()
    }
}

/// Geometry behaviour every shape variant provides.
pub trait ShapeTrait {
    /// Bounding box of the bare geometry in viewport coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point hits this shape.
    fn hit_test(&self, point: Point, tolerance: f64, style: &ItemStyle) -> bool;

    /// Check if the segment `a`-`b` touches this shape.
    fn intersects_segment(&self, a: Point, b: Point, tolerance: f64, style: &ItemStyle) -> bool;

    /// Check if this shape lies in or crosses `rect`.
    fn intersects_rect(&self, rect: Rect) -> bool;

    /// Apply a transform to the geometry.
    fn transform(&mut self, affine: Affine);

    /// Issue draw calls for this shape, with `transform` mapping viewport to surface space.
    fn render(&self, surface: &mut dyn DrawingSurface, transform: Affine, style: &ItemStyle);
}

/// Closed set of shape variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Path(Path),
    Rectangle(Rectangle),
    Ellipse(Ellipse),
}

impl Shape {
    fn as_trait(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Path(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Ellipse(s) => s,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Path(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Ellipse(s) => s,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Path(_) => "path",
            Shape::Rectangle(_) => "rectangle",
            Shape::Ellipse(_) => "ellipse",
        }
    }
}

/// An item on the board: a shape plus identity, style and index bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub(crate) id: ItemId,
    pub shape: Shape,
    pub style: ItemStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub z_index: i64,
    /// Chunks the item occupied at its last index insertion.
    #[serde(skip)]
    pub(crate) cell: Option<ChunkSpan>,
}

impl Item {
    /// Create an item with a fresh id.
    pub fn new(shape: Shape) -> Self {
        Self::with_id(new_item_id(), shape)
    }

    /// Create an item with a known id (remote peers, loaded boards).
    pub fn with_id(id: ItemId, shape: Shape) -> Self {
        Self {
            id,
            shape,
            style: ItemStyle::default(),
            label: None,
            locked: false,
            z_index: 0,
            cell: None,
        }
    }

    /// A freehand stroke with a fresh id.
    pub fn path(path: Path) -> Self {
        Self::new(Shape::Path(path))
    }

    /// A rectangle with a fresh id.
    pub fn rectangle(rect: Rect) -> Self {
        Self::new(Shape::Rectangle(Rectangle::new(rect)))
    }

    /// An ellipse inscribed in `rect`, with a fresh id.
    pub fn ellipse(rect: Rect) -> Self {
        Self::new(Shape::Ellipse(Ellipse::new(rect)))
    }

    pub fn with_style(mut self, style: ItemStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Chunk span recorded at the last index insertion, if indexed.
    pub fn cell(&self) -> Option<ChunkSpan> {
        self.cell
    }

    /// Geometry bounds in viewport coordinates, without the stroke. This is
    /// the box the chunk index holds.
    pub fn geometry_bounds(&self) -> Rect {
        self.shape.bounds().abs()
    }

    /// How far the stroke may reach past the geometry.
    pub fn stroke_pad(&self) -> f64 {
        self.style.weight.max(0.0)
    }

    /// Visual bounds in viewport coordinates, including the stroke.
    pub fn bounds(&self) -> Rect {
        let pad = self.stroke_pad();
        self.geometry_bounds().inflate(pad, pad)
    }

    /// Whether `point` touches the painted item, stroke included.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.shape.as_trait().hit_test(point, tolerance, &self.style)
    }

    /// Whether the segment `a`-`b` touches the painted item.
    pub fn intersects_segment(&self, a: Point, b: Point, tolerance: f64) -> bool {
        self.shape
            .as_trait()
            .intersects_segment(a, b, tolerance, &self.style)
    }

    /// Whether the geometry lies in or crosses `rect`.
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        self.shape.as_trait().intersects_rect(rect)
    }

    /// Transform the geometry. Callers holding an indexed item must go through
    /// the board so the chunk span is refreshed.
    pub fn transform(&mut self, affine: Affine) {
        self.shape.as_trait_mut().transform(affine);
    }

    /// Draw onto `surface`, mapping viewport coordinates through `transform`.
    pub fn render(&self, surface: &mut dyn DrawingSurface, transform: Affine) {
        self.shape.as_trait().render(surface, transform, &self.style);
    }
}

/// Uniform scale factor of a scale-and-translate transform.
pub(crate) fn affine_scale(affine: Affine) -> f64 {
    affine.as_coeffs()[0].abs()
}

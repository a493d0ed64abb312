//! Driftboard Core Library
//!
//! Platform-agnostic core of the Driftboard infinite whiteboard: viewport
//! transforms, stroke geometry, the chunked spatial index over board items,
//! and the undo history. Rasterization and networking stay outside; the core
//! talks to them through [`render::DrawingSurface`] and [`remote`] batches.

pub mod board;
pub mod canvas;
pub mod config;
pub mod edit;
pub mod error;
pub mod geometry;
pub mod history;
pub mod index;
pub mod items;
pub mod remote;
pub mod render;
pub mod stroke;
pub mod tools;
pub mod viewport;

pub use board::Board;
pub use canvas::Canvas;
pub use config::BoardConfig;
pub use edit::{BoardEdit, board_edit_action};
pub use error::{BoardError, BoardResult};
pub use history::{Action, ActionStack};
pub use index::{Chunk, ChunkKey, QuadTree};
pub use items::{Item, ItemId, ItemStyle, PackedColor, Shape, ShapeTrait};
pub use remote::{AuthorId, RemoteAction, RemoteBatch};
pub use render::{DrawCommand, DrawingSurface, FrameStats, RecordingSurface};
pub use stroke::{StrokeOptions, StrokePoint};
pub use tools::{ToolKind, ToolManager};
pub use viewport::Viewport;

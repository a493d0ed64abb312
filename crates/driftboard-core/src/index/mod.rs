//! Chunked spatial index: a grid of chunks, each holding its own quadtree.

mod chunk;
mod quadtree;

pub use chunk::{Chunk, ChunkKey};
pub use quadtree::QuadTree;

//! Mapping between continuous world space and the chunk grid.
//!
//! Chunks are squares of `chunk_size` world units. A position belongs to the
//! chunk whose index is `floor(position / chunk_size)` on each axis, so chunk
//! boundaries are lower-inclusive.

use bevy::prelude::*;

use crate::coords::ChunkCoord;

/// Chunk grid with a fixed chunk edge length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkGrid {
    chunk_size: f32,
}

impl ChunkGrid {
    /// Create a grid. `chunk_size` is expected to be positive and finite;
    /// callers validate it before building a grid.
    pub const fn new(chunk_size: f32) -> Self {
        Self { chunk_size }
    }

    pub const fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    /// Chunk containing `position`.
    pub fn coord_of(&self, position: Vec2) -> ChunkCoord {
        ChunkCoord::new(
            (position.x / self.chunk_size).floor() as i32,
            (position.y / self.chunk_size).floor() as i32,
        )
    }

    /// Nominal center of a chunk, used for distance tests.
    ///
    /// This is the chunk index scaled by the chunk size, i.e. the same point
    /// placements are scattered around, not the geometric middle of the
    /// `coord_of` cell.
    pub fn center(&self, coord: ChunkCoord) -> Vec2 {
        Vec2::new(
            coord.x as f32 * self.chunk_size,
            coord.y as f32 * self.chunk_size,
        )
    }

    /// Square that placements for `coord` are sampled from: `center ± size / 2`.
    pub fn bounds(&self, coord: ChunkCoord) -> Rect {
        Rect::from_center_size(self.center(coord), Vec2::splat(self.chunk_size))
    }

    /// Number of chunks needed to cover `radius` world units.
    pub fn radius_in_chunks(&self, radius: f32) -> i32 {
        (radius / self.chunk_size).ceil() as i32
    }

    /// All coordinates in the `(2r + 1)²` square around `center`.
    ///
    /// Ordered x-major then y, so callers iterating it get a stable load order.
    /// Near the edge of the grid offsets saturate, so the square may repeat
    /// coordinates there.
    pub fn neighborhood(&self, center: ChunkCoord, radius_in_chunks: i32) -> Vec<ChunkCoord> {
        let r = radius_in_chunks.max(0);
        let side = 2 * r as usize + 1;
        let mut coords = Vec::with_capacity(side * side);

        for dx in -r..=r {
            for dy in -r..=r {
                coords.push(center.offset(dx, dy));
            }
        }

        coords
    }
}

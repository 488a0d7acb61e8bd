pub mod coords;
pub mod grid;

pub use coords::ChunkCoord;
pub use grid::ChunkGrid;

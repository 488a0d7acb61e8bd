//! Chunk-based procedural content streaming.
//!
//! Content is generated per chunk from the chunk coordinate alone, so chunks
//! can be unloaded when the observer leaves and reproduced exactly when it
//! returns. The engine is independent of how content is instantiated: hosts
//! implement [`Instantiator`] and call [`ChunkStreamer::tick`] once per frame.

pub mod config;
pub mod generator;
pub mod lifecycle;
pub mod selector;

pub use config::{
    ConfigError, PropertyRange, PropertyRanges, StreamingConfig, WeightedVariant,
    MAX_RADIUS_IN_CHUNKS, MAX_WHOLE_MAGNITUDE,
};
pub use generator::{chunk_rng, chunk_seed, ChunkGenerator, Placement};
pub use lifecycle::{Chunk, ChunkStreamer, Instantiator, ReconcileReport, TickOutcome};
pub use selector::WeightedSelector;

//! Deterministic per-chunk content generation.
//!
//! A chunk's placements depend only on its coordinate and the configuration:
//! each call builds a private RNG from the chunk seed, so generating chunks in
//! any order (or regenerating one after it was unloaded) reproduces the same
//! content bit for bit without touching any other random stream.

use bevy::prelude::*;
use df_core::{ChunkCoord, ChunkGrid};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::{ConfigError, PropertyRanges, StreamingConfig};
use crate::selector::WeightedSelector;

/// Multiplier decorrelating the x axis in [`chunk_seed`].
pub const SEED_PRIME_X: i32 = 73_856_093;
/// Multiplier decorrelating the y axis in [`chunk_seed`].
pub const SEED_PRIME_Y: i32 = 19_349_663;

/// Candidate draws allowed per requested placement.
pub const ATTEMPTS_PER_PLACEMENT: usize = 10;

/// One generated content instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement<V, P> {
    pub position: Vec2,
    pub variant: V,
    pub properties: P,
}

/// Seed for a chunk: `x * 73856093 XOR y * 19349663` in wrapping i32 arithmetic.
pub fn chunk_seed(coord: ChunkCoord) -> i32 {
    coord.x.wrapping_mul(SEED_PRIME_X) ^ coord.y.wrapping_mul(SEED_PRIME_Y)
}

/// Fresh random stream for a chunk.
pub fn chunk_rng(coord: ChunkCoord) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(chunk_seed(coord) as u32 as u64)
}

/// Produces the placements of a chunk from its coordinate.
#[derive(Debug, Clone)]
pub struct ChunkGenerator<V, R> {
    grid: ChunkGrid,
    placements_per_chunk: usize,
    min_distance: f32,
    selector: WeightedSelector<V>,
    ranges: R,
}

impl<V: Clone, R: PropertyRanges + Clone> ChunkGenerator<V, R> {
    pub fn new(config: &StreamingConfig<V, R>) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            grid: ChunkGrid::new(config.chunk_size),
            placements_per_chunk: config.placements_per_chunk,
            min_distance: config.min_distance,
            selector: WeightedSelector::new(config.palette.clone())?,
            ranges: config.ranges.clone(),
        })
    }

    pub fn grid(&self) -> ChunkGrid {
        self.grid
    }

    /// Generate the placements for `coord`.
    ///
    /// Returns at most `placements_per_chunk` entries; fewer when the attempt
    /// budget runs out before enough spaced-out positions were found.
    pub fn generate(&self, coord: ChunkCoord) -> Vec<Placement<V, R::Properties>> {
        let mut rng = chunk_rng(coord);
        self.generate_with(coord, &mut rng)
    }

    fn generate_with<G: Rng + ?Sized>(
        &self,
        coord: ChunkCoord,
        rng: &mut G,
    ) -> Vec<Placement<V, R::Properties>> {
        let target = self.placements_per_chunk;
        let max_attempts = target.saturating_mul(ATTEMPTS_PER_PLACEMENT);
        let min_distance_sq = self.min_distance * self.min_distance;
        let origin = self.grid.center(coord);
        let half = self.grid.chunk_size() / 2.0;

        let mut placements: Vec<Placement<V, R::Properties>> = Vec::new();
        let mut attempts = 0;

        while placements.len() < target && attempts < max_attempts {
            attempts += 1;

            let offset = Vec2::new(rng.gen_range(-half..half), rng.gen_range(-half..half));
            let position = origin + offset;

            let overlaps = placements
                .iter()
                .any(|p| position.distance_squared(p.position) < min_distance_sq);
            if overlaps {
                continue;
            }

            let variant = self.selector.pick(rng).clone();
            let properties = self.ranges.roll(rng);
            placements.push(Placement {
                position,
                variant,
                properties,
            });
        }

        placements
    }
}

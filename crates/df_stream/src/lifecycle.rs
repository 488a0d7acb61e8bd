//! Chunk lifecycle: decides which chunks are materialized around the observer
//! and keeps the host's content in sync with that decision.
//!
//! Work happens only when the observer crosses into a different chunk. On such
//! a transition every chunk of the square load set that is not yet
//! materialized is generated and instantiated, and every materialized chunk
//! outside the load set whose center lies beyond the despawn radius is
//! destroyed. Chunks between the two radii are kept, which stops a chunk from
//! flickering in and out while the observer walks along a boundary.

use bevy::prelude::*;
use df_core::{ChunkCoord, ChunkGrid};
use std::collections::HashMap;
use std::fmt;

use crate::config::{ConfigError, PropertyRanges, StreamingConfig};
use crate::generator::{ChunkGenerator, Placement};

/// Host capability that turns placements into live content.
pub trait Instantiator<V, P> {
    /// Opaque reference to created content.
    type Handle;
    type Error: fmt::Display;

    fn create(
        &mut self,
        coord: ChunkCoord,
        placement: &Placement<V, P>,
    ) -> Result<Self::Handle, Self::Error>;

    fn destroy(&mut self, handle: Self::Handle);
}

/// A materialized chunk: the placements that were successfully instantiated
/// and their handles, index for index.
#[derive(Debug, Clone)]
pub struct Chunk<V, P, H> {
    coord: ChunkCoord,
    placements: Vec<Placement<V, P>>,
    handles: Vec<H>,
}

impl<V, P, H> Chunk<V, P, H> {
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn placements(&self) -> &[Placement<V, P>] {
        &self.placements
    }

    pub fn handles(&self) -> &[H] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// What a reconciliation pass changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Chunk the observer was in.
    pub observer_chunk: ChunkCoord,
    /// Newly materialized chunks, in load order.
    pub loaded: Vec<ChunkCoord>,
    /// Destroyed chunks, sorted.
    pub unloaded: Vec<ChunkCoord>,
    /// Placements instantiated.
    pub created: usize,
    /// Placements the host failed to instantiate.
    pub failed: usize,
}

impl ReconcileReport {
    fn new(observer_chunk: ChunkCoord) -> Self {
        Self {
            observer_chunk,
            loaded: Vec::new(),
            unloaded: Vec::new(),
            created: 0,
            failed: 0,
        }
    }
}

/// Result of one evaluation tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No observer position was available; nothing changed.
    ObserverMissing,
    /// The observer is still in the chunk of the previous evaluation.
    Unchanged,
    /// The observer entered a new chunk (or this was the first evaluation).
    Reconciled(ReconcileReport),
}

/// Owns the registry of materialized chunks for one kind of content.
pub struct ChunkStreamer<V, R: PropertyRanges, H> {
    config: StreamingConfig<V, R>,
    generator: ChunkGenerator<V, R>,
    radius_in_chunks: i32,
    registry: HashMap<ChunkCoord, Chunk<V, R::Properties, H>>,
    last_observer_chunk: Option<ChunkCoord>,
    observer_missing: bool,
}

impl<V, R, H> ChunkStreamer<V, R, H>
where
    V: Clone + fmt::Debug,
    R: PropertyRanges + Clone,
{
    /// Validate `config` and build an empty streamer.
    pub fn new(config: StreamingConfig<V, R>) -> Result<Self, ConfigError> {
        let generator = ChunkGenerator::new(&config)?;
        let radius_in_chunks = generator.grid().radius_in_chunks(config.spawn_radius);

        Ok(Self {
            config,
            generator,
            radius_in_chunks,
            registry: HashMap::new(),
            last_observer_chunk: None,
            observer_missing: false,
        })
    }

    pub fn config(&self) -> &StreamingConfig<V, R> {
        &self.config
    }

    pub fn grid(&self) -> ChunkGrid {
        self.generator.grid()
    }

    pub fn generator(&self) -> &ChunkGenerator<V, R> {
        &self.generator
    }

    pub fn radius_in_chunks(&self) -> i32 {
        self.radius_in_chunks
    }

    pub fn last_observer_chunk(&self) -> Option<ChunkCoord> {
        self.last_observer_chunk
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk<V, R::Properties, H>> {
        self.registry.get(&coord)
    }

    pub fn is_materialized(&self, coord: ChunkCoord) -> bool {
        self.registry.contains_key(&coord)
    }

    pub fn active_chunks(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.registry.keys().copied()
    }

    pub fn active_chunk_count(&self) -> usize {
        self.registry.len()
    }

    /// Total number of live handles across all chunks.
    pub fn handle_count(&self) -> usize {
        self.registry.values().map(Chunk::len).sum()
    }

    /// Evaluate the observer position and reconcile if it changed chunk.
    pub fn tick<I>(&mut self, observer: Option<Vec2>, instantiator: &mut I) -> TickOutcome
    where
        I: Instantiator<V, R::Properties, Handle = H>,
    {
        let Some(position) = observer else {
            if !self.observer_missing {
                warn!("No observer to stream chunks around; streaming paused");
                self.observer_missing = true;
            }
            return TickOutcome::ObserverMissing;
        };

        if self.observer_missing {
            info!("Observer found; streaming resumed");
            self.observer_missing = false;
        }

        let current = self.grid().coord_of(position);
        if self.last_observer_chunk == Some(current) {
            return TickOutcome::Unchanged;
        }

        self.last_observer_chunk = Some(current);
        TickOutcome::Reconciled(self.reconcile(current, position, instantiator))
    }

    fn reconcile<I>(&mut self, current: ChunkCoord, position: Vec2, instantiator: &mut I) -> ReconcileReport
    where
        I: Instantiator<V, R::Properties, Handle = H>,
    {
        let grid = self.grid();
        let load_set = grid.neighborhood(current, self.radius_in_chunks);
        let mut report = ReconcileReport::new(current);

        for &coord in &load_set {
            if self.registry.contains_key(&coord) {
                continue;
            }
            let chunk = self.materialize(coord, instantiator, &mut report);
            self.registry.insert(coord, chunk);
            report.loaded.push(coord);
        }

        let load_radius = self.radius_in_chunks.unsigned_abs();
        let despawn_radius_sq = self.config.despawn_radius * self.config.despawn_radius;

        let mut unload: Vec<ChunkCoord> = self
            .registry
            .keys()
            .filter(|coord| coord.chebyshev_distance(current) > load_radius)
            .filter(|coord| grid.center(**coord).distance_squared(position) > despawn_radius_sq)
            .copied()
            .collect();
        unload.sort();

        for coord in &unload {
            if let Some(chunk) = self.registry.remove(coord) {
                for handle in chunk.handles {
                    instantiator.destroy(handle);
                }
            }
        }
        report.unloaded = unload;

        debug!(
            "Observer entered chunk {}: loaded {}, unloaded {}, active {}",
            current,
            report.loaded.len(),
            report.unloaded.len(),
            self.registry.len()
        );

        report
    }

    /// Generate and instantiate one chunk. Placements the host fails to
    /// create are dropped; the chunk is materialized regardless.
    fn materialize<I>(
        &self,
        coord: ChunkCoord,
        instantiator: &mut I,
        report: &mut ReconcileReport,
    ) -> Chunk<V, R::Properties, H>
    where
        I: Instantiator<V, R::Properties, Handle = H>,
    {
        let generated = self.generator.generate(coord);
        let mut placements = Vec::with_capacity(generated.len());
        let mut handles = Vec::with_capacity(generated.len());

        for placement in generated {
            match instantiator.create(coord, &placement) {
                Ok(handle) => {
                    handles.push(handle);
                    placements.push(placement);
                    report.created += 1;
                }
                Err(err) => {
                    warn!(
                        "Failed to instantiate {:?} at {} in chunk {}: {}",
                        placement.variant, placement.position, coord, err
                    );
                    report.failed += 1;
                }
            }
        }

        Chunk {
            coord,
            placements,
            handles,
        }
    }

    /// Destroy every materialized chunk and forget the observer chunk, so the
    /// next tick reloads from scratch. Returns the number of chunks removed.
    pub fn clear<I>(&mut self, instantiator: &mut I) -> usize
    where
        I: Instantiator<V, R::Properties, Handle = H>,
    {
        let removed = self.registry.len();
        for (_, chunk) in self.registry.drain() {
            for handle in chunk.handles {
                instantiator.destroy(handle);
            }
        }
        self.last_observer_chunk = None;
        removed
    }

    /// Swap in a new configuration. An invalid config is rejected and the
    /// current one stays active; a valid one clears all chunks first.
    pub fn reconfigure<I>(
        &mut self,
        config: StreamingConfig<V, R>,
        instantiator: &mut I,
    ) -> Result<(), ConfigError>
    where
        I: Instantiator<V, R::Properties, Handle = H>,
    {
        let generator = ChunkGenerator::new(&config)?;
        self.clear(instantiator);
        self.radius_in_chunks = generator.grid().radius_in_chunks(config.spawn_radius);
        self.generator = generator;
        self.config = config;
        Ok(())
    }
}

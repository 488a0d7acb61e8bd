//! Bridge between the streaming engine and Bevy's `Commands`.

use bevy::prelude::*;
use df_core::ChunkCoord;
use df_stream::{Instantiator, Placement, PropertyRanges, StreamingConfig};
use std::fmt;
use std::marker::PhantomData;

/// Property set rolled for content `C`.
pub type Properties<C> = <<C as StreamedContent>::Ranges as PropertyRanges>::Properties;

/// Streaming configuration for content `C`.
pub type ContentConfig<C> = StreamingConfig<<C as StreamedContent>::Variant, <C as StreamedContent>::Ranges>;

/// A kind of content streamed in chunks: its palette type, its property
/// ranges and how one placement becomes an entity.
pub trait StreamedContent: Send + Sync + 'static {
    type Variant: Copy + PartialEq + fmt::Debug + Send + Sync + 'static;
    type Ranges: PropertyRanges + Clone + fmt::Debug + Send + Sync + 'static;

    /// Short name used in log messages.
    const NAME: &'static str;

    fn spawn(
        commands: &mut Commands,
        coord: ChunkCoord,
        placement: &Placement<Self::Variant, Properties<Self>>,
    ) -> Result<Entity, SpawnError>;
}

/// Why a single placement could not be turned into an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnError {
    InvalidScale(f32),
    InvalidMass(f32),
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidScale(scale) => write!(f, "scale must be positive, got {}", scale),
            Self::InvalidMass(mass) => write!(f, "mass must be positive, got {}", mass),
        }
    }
}

impl std::error::Error for SpawnError {}

/// Tags every entity created by a content stream with its chunk.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamedEntity {
    pub chunk: ChunkCoord,
}

/// [`Instantiator`] that spawns and despawns entities through `Commands`.
pub struct CommandsInstantiator<'a, 'w, 's, C> {
    commands: &'a mut Commands<'w, 's>,
    _content: PhantomData<fn() -> C>,
}

impl<'a, 'w, 's, C> CommandsInstantiator<'a, 'w, 's, C> {
    pub fn new(commands: &'a mut Commands<'w, 's>) -> Self {
        Self {
            commands,
            _content: PhantomData,
        }
    }
}

impl<C: StreamedContent> Instantiator<C::Variant, Properties<C>> for CommandsInstantiator<'_, '_, '_, C> {
    type Handle = Entity;
    type Error = SpawnError;

    fn create(
        &mut self,
        coord: ChunkCoord,
        placement: &Placement<C::Variant, Properties<C>>,
    ) -> Result<Entity, SpawnError> {
        C::spawn(self.commands, coord, placement)
    }

    fn destroy(&mut self, entity: Entity) {
        // Content may already be gone, e.g. a collected item.
        if let Some(mut entity_commands) = self.commands.get_entity(entity) {
            entity_commands.despawn_recursive();
        }
    }
}

/// Validate scale as every spawner needs it.
pub(crate) fn checked_scale(scale: f32) -> Result<f32, SpawnError> {
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(SpawnError::InvalidScale(scale))
    }
}

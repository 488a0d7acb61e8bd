use bevy::prelude::*;

pub mod content;
pub mod decoration;
pub mod gizmos;
pub mod item;
pub mod stream;

pub use content::{CommandsInstantiator, ContentConfig, SpawnError, StreamedContent, StreamedEntity};
pub use decoration::{default_background_config, BackgroundDecoration, DecorationKind, DecorationRanges, Decorations};
pub use gizmos::{StreamingGizmos, StreamingGizmosPlugin};
pub use item::{default_item_config, Item, ItemKind, ItemRanges, Items};
pub use stream::{ChunkStreamingSet, ContentStream, ContentStreamPlugin};

/// Marks the entity that content is streamed around, usually the player.
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct StreamingObserver;

//! Debug drawing of the streaming radii and the load-set chunks.

use bevy::color::palettes::css::{LIME, RED};
use bevy::math::Isometry2d;
use bevy::prelude::*;
use std::marker::PhantomData;

use crate::content::StreamedContent;
use crate::stream::ContentStream;
use crate::StreamingObserver;

/// Toggles streaming gizmos for every content stream.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct StreamingGizmos {
    pub enabled: bool,
}

/// Draws spawn/despawn radii and load-set chunks for content `C`.
pub struct StreamingGizmosPlugin<C>(PhantomData<fn() -> C>);

impl<C> Default for StreamingGizmosPlugin<C> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<C: StreamedContent> Plugin for StreamingGizmosPlugin<C> {
    fn build(&self, app: &mut App) {
        app.init_resource::<StreamingGizmos>().add_systems(
            Update,
            draw_stream_bounds::<C>.run_if(|gizmos: Res<StreamingGizmos>| gizmos.enabled),
        );
    }
}

fn draw_stream_bounds<C: StreamedContent>(
    mut gizmos: Gizmos,
    stream: Option<Res<ContentStream<C>>>,
    observers: Query<&Transform, With<StreamingObserver>>,
) {
    let Some(stream) = stream else { return };
    let Some(transform) = observers.iter().next() else { return };

    let position = transform.translation.truncate();
    let streamer = &stream.streamer;
    let config = streamer.config();

    gizmos.circle_2d(Isometry2d::from_translation(position), config.spawn_radius, LIME);
    gizmos.circle_2d(Isometry2d::from_translation(position), config.despawn_radius, RED);

    let grid = streamer.grid();
    let current = grid.coord_of(position);
    let size = Vec2::splat(grid.chunk_size());

    for coord in grid.neighborhood(current, streamer.radius_in_chunks()) {
        let color = if streamer.is_materialized(coord) {
            Color::srgba(0.0, 1.0, 1.0, 0.3)
        } else {
            Color::srgba(1.0, 1.0, 0.0, 0.3)
        };
        gizmos.rect_2d(Isometry2d::from_translation(grid.center(coord)), size, color);
    }
}

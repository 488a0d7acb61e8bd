//! Background decoration: purely visual sprites scattered behind the play field.

use bevy::prelude::*;
use df_core::ChunkCoord;
use df_stream::{ConfigError, Placement, PropertyRange, PropertyRanges, StreamingConfig, WeightedVariant};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::content::{checked_scale, SpawnError, StreamedContent, StreamedEntity};

/// Depth decorations are drawn at, behind everything else.
pub const DECORATION_DEPTH: f32 = -10.0;

/// Decoration variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecorationKind {
    FaintStar,
    BrightStar,
    DustCloud,
    Nebula,
    DistantPlanet,
}

impl DecorationKind {
    /// Sprite tint.
    pub fn color(&self) -> Color {
        match self {
            Self::FaintStar => Color::srgba(0.8, 0.85, 1.0, 0.6),
            Self::BrightStar => Color::srgb(1.0, 0.97, 0.85),
            Self::DustCloud => Color::srgba(0.55, 0.45, 0.4, 0.25),
            Self::Nebula => Color::srgba(0.5, 0.3, 0.8, 0.2),
            Self::DistantPlanet => Color::srgb(0.35, 0.6, 0.75),
        }
    }

    /// Sprite size in world units at scale 1.
    pub fn base_size(&self) -> Vec2 {
        match self {
            Self::FaintStar => Vec2::splat(0.15),
            Self::BrightStar => Vec2::splat(0.3),
            Self::DustCloud => Vec2::new(3.0, 1.5),
            Self::Nebula => Vec2::new(5.0, 4.0),
            Self::DistantPlanet => Vec2::splat(1.2),
        }
    }

    pub fn all() -> &'static [DecorationKind] {
        &[
            Self::FaintStar,
            Self::BrightStar,
            Self::DustCloud,
            Self::Nebula,
            Self::DistantPlanet,
        ]
    }
}

/// Ranges rolled per decoration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecorationRanges {
    pub scale: PropertyRange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecorationProperties {
    pub scale: f32,
}

impl PropertyRanges for DecorationRanges {
    type Properties = DecorationProperties;

    fn validate(&self) -> Result<(), ConfigError> {
        self.scale.validate("scale")
    }

    fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> DecorationProperties {
        DecorationProperties {
            scale: self.scale.sample(rng),
        }
    }
}

/// A spawned background decoration.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct BackgroundDecoration {
    pub kind: DecorationKind,
    pub scale: f32,
}

/// Background decoration content.
pub struct Decorations;

impl StreamedContent for Decorations {
    type Variant = DecorationKind;
    type Ranges = DecorationRanges;

    const NAME: &'static str = "background";

    fn spawn(
        commands: &mut Commands,
        coord: ChunkCoord,
        placement: &Placement<DecorationKind, DecorationProperties>,
    ) -> Result<Entity, SpawnError> {
        let scale = checked_scale(placement.properties.scale)?;
        let kind = placement.variant;

        let entity = commands
            .spawn((
                Sprite {
                    color: kind.color(),
                    custom_size: Some(kind.base_size()),
                    ..default()
                },
                Transform::from_translation(placement.position.extend(DECORATION_DEPTH))
                    .with_scale(Vec3::splat(scale)),
                BackgroundDecoration { kind, scale },
                StreamedEntity { chunk: coord },
            ))
            .id();

        Ok(entity)
    }
}

/// Built-in background settings.
pub fn default_background_config() -> StreamingConfig<DecorationKind, DecorationRanges> {
    StreamingConfig {
        spawn_radius: 25.0,
        despawn_radius: 30.0,
        chunk_size: 15.0,
        placements_per_chunk: 10,
        min_distance: 1.0,
        palette: vec![
            WeightedVariant::new(DecorationKind::FaintStar, 6.0),
            WeightedVariant::new(DecorationKind::BrightStar, 2.0),
            WeightedVariant::new(DecorationKind::DustCloud, 1.0),
            WeightedVariant::new(DecorationKind::Nebula, 0.5),
            WeightedVariant::new(DecorationKind::DistantPlanet, 0.25),
        ],
        ranges: DecorationRanges {
            scale: PropertyRange::new(0.8, 1.5),
        },
    }
}

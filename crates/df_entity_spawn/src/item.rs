//! Collectible items scattered through the world.

use bevy::prelude::*;
use df_core::ChunkCoord;
use df_stream::{ConfigError, Placement, PropertyRange, PropertyRanges, StreamingConfig, WeightedVariant};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::content::{checked_scale, SpawnError, StreamedContent, StreamedEntity};

/// Depth items are drawn at.
pub const ITEM_DEPTH: f32 = 1.0;

/// Item variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Scrap,
    Crystal,
    FuelCell,
}

impl ItemKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scrap => "Scrap",
            Self::Crystal => "Crystal",
            Self::FuelCell => "Fuel Cell",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Scrap => Color::srgb(0.6, 0.6, 0.62),
            Self::Crystal => Color::srgb(0.4, 0.9, 1.0),
            Self::FuelCell => Color::srgb(1.0, 0.7, 0.2),
        }
    }

    /// Sprite size in world units at scale 1.
    pub fn base_size(&self) -> Vec2 {
        match self {
            Self::Scrap => Vec2::new(0.5, 0.35),
            Self::Crystal => Vec2::new(0.3, 0.5),
            Self::FuelCell => Vec2::new(0.35, 0.35),
        }
    }

    pub fn all() -> &'static [ItemKind] {
        &[Self::Scrap, Self::Crystal, Self::FuelCell]
    }
}

/// Ranges rolled per item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRanges {
    pub scale: PropertyRange,
    pub weight: PropertyRange,
    /// Rolled as a whole number.
    pub value: PropertyRange,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemProperties {
    pub scale: f32,
    pub weight: f32,
    pub value: i32,
}

impl PropertyRanges for ItemRanges {
    type Properties = ItemProperties;

    fn validate(&self) -> Result<(), ConfigError> {
        self.scale.validate("scale")?;
        self.weight.validate("weight")?;
        self.value.validate_whole("value")
    }

    fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> ItemProperties {
        ItemProperties {
            scale: self.scale.sample(rng),
            weight: self.weight.sample(rng),
            value: self.value.sample_whole(rng),
        }
    }
}

/// A collectible item. `weight` doubles as its physical mass.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub scale: f32,
    pub weight: f32,
    pub value: i32,
}

/// Collectible item content.
pub struct Items;

impl StreamedContent for Items {
    type Variant = ItemKind;
    type Ranges = ItemRanges;

    const NAME: &'static str = "items";

    fn spawn(
        commands: &mut Commands,
        coord: ChunkCoord,
        placement: &Placement<ItemKind, ItemProperties>,
    ) -> Result<Entity, SpawnError> {
        let props = placement.properties;
        let scale = checked_scale(props.scale)?;
        if !(props.weight.is_finite() && props.weight > 0.0) {
            return Err(SpawnError::InvalidMass(props.weight));
        }
        let kind = placement.variant;

        let entity = commands
            .spawn((
                Sprite {
                    color: kind.color(),
                    custom_size: Some(kind.base_size()),
                    ..default()
                },
                Transform::from_translation(placement.position.extend(ITEM_DEPTH))
                    .with_scale(Vec3::splat(scale)),
                Item {
                    kind,
                    scale,
                    weight: props.weight,
                    value: props.value,
                },
                StreamedEntity { chunk: coord },
            ))
            .id();

        Ok(entity)
    }
}

/// Built-in item settings. Items are not spaced apart.
pub fn default_item_config() -> StreamingConfig<ItemKind, ItemRanges> {
    StreamingConfig {
        spawn_radius: 20.0,
        despawn_radius: 30.0,
        chunk_size: 15.0,
        placements_per_chunk: 5,
        min_distance: 0.0,
        palette: vec![
            WeightedVariant::new(ItemKind::Scrap, 5.0),
            WeightedVariant::new(ItemKind::Crystal, 2.0),
            WeightedVariant::new(ItemKind::FuelCell, 1.0),
        ],
        ranges: ItemRanges {
            scale: PropertyRange::new(0.5, 2.0),
            weight: PropertyRange::new(0.1, 5.0),
            value: PropertyRange::new(0.0, 100.0),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use df_stream::ChunkGenerator;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(default_item_config().validate(), Ok(()));
    }

    #[test]
    fn every_slot_is_filled_without_spacing() {
        let generator = ChunkGenerator::new(&default_item_config()).unwrap();
        for x in -3..3 {
            assert_eq!(generator.generate(ChunkCoord::new(x, 4)).len(), 5);
        }
    }

    #[test]
    fn rolled_properties_match_ranges() {
        let generator = ChunkGenerator::new(&default_item_config()).unwrap();
        for p in generator.generate(ChunkCoord::new(-9, 1)) {
            assert!((0.5..=2.0).contains(&p.properties.scale));
            assert!((0.1..=5.0).contains(&p.properties.weight));
            assert!((0..=100).contains(&p.properties.value));
        }
    }

    #[test]
    fn values_beyond_whole_precision_are_rejected() {
        let mut config = default_item_config();
        config.ranges.value = PropertyRange::new(2e7, 2e7);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { property: "value", .. })
        ));
    }

    #[test]
    fn inverted_weight_range_is_rejected() {
        let mut config = default_item_config();
        config.ranges.weight = PropertyRange::new(5.0, 0.1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { property: "weight", .. })
        ));
    }
}

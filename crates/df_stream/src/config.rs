//! Streaming parameters and their validation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error raised when a streaming configuration is degenerate.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Chunk size must be positive and finite.
    InvalidChunkSize(f32),
    /// Spawn radius must be non-negative and finite.
    InvalidSpawnRadius(f32),
    /// Despawn radius smaller than the spawn radius makes chunks churn at the boundary.
    DespawnInsideSpawn { spawn_radius: f32, despawn_radius: f32 },
    /// The variant palette has no entries.
    EmptyPalette,
    /// A palette weight is negative or not finite.
    NegativeWeight { index: usize, weight: f32 },
    /// Every palette weight is zero.
    ZeroTotalWeight,
    /// Palette weights sum to more than a draw can cover.
    TotalWeightOverflow,
    /// A property range has `min > max`, non-finite bounds or a span too wide
    /// to sample.
    InvalidRange { property: &'static str, min: f32, max: f32 },
    /// The spawn radius covers more chunks than [`MAX_RADIUS_IN_CHUNKS`].
    LoadSetTooLarge { radius_in_chunks: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChunkSize(size) => {
                write!(f, "chunk size must be positive, got {}", size)
            }
            Self::InvalidSpawnRadius(radius) => {
                write!(f, "spawn radius must be non-negative, got {}", radius)
            }
            Self::DespawnInsideSpawn { spawn_radius, despawn_radius } => write!(
                f,
                "despawn radius {} is smaller than spawn radius {}",
                despawn_radius, spawn_radius
            ),
            Self::EmptyPalette => write!(f, "no content variants configured"),
            Self::NegativeWeight { index, weight } => {
                write!(f, "palette entry {} has invalid weight {}", index, weight)
            }
            Self::ZeroTotalWeight => write!(f, "all palette weights are zero"),
            Self::TotalWeightOverflow => write!(f, "palette weights sum to infinity"),
            Self::InvalidRange { property, min, max } => {
                write!(f, "range for '{}' is invalid: [{}, {}]", property, min, max)
            }
            Self::LoadSetTooLarge { radius_in_chunks } => write!(
                f,
                "spawn radius spans {} chunks, at most {} allowed",
                radius_in_chunks, MAX_RADIUS_IN_CHUNKS
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Largest spawn radius in whole chunks; the load set is `(2r + 1)²` chunks.
pub const MAX_RADIUS_IN_CHUNKS: i32 = 64;

/// Whole-number bounds must stay below 2^24, where f32 still counts in ones.
pub const MAX_WHOLE_MAGNITUDE: f32 = 16_777_216.0;

/// A float range or total is only drawable while its width, stretched by the
/// sampler's rounding margin, stays finite.
fn span_is_sampleable(span: f32) -> bool {
    (span * 2.0).is_finite()
}

/// Inclusive range a scalar property is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyRange {
    pub min: f32,
    pub max: f32,
}

impl PropertyRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn validate(&self, property: &'static str) -> Result<(), ConfigError> {
        let usable = self.min.is_finite()
            && self.max.is_finite()
            && self.min <= self.max
            && span_is_sampleable(self.max - self.min);
        if !usable {
            return Err(self.invalid(property));
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), for ranges drawn with
    /// [`sample_whole`](Self::sample_whole).
    pub fn validate_whole(&self, property: &'static str) -> Result<(), ConfigError> {
        self.validate(property)?;
        if self.min.abs() >= MAX_WHOLE_MAGNITUDE || self.max.abs() >= MAX_WHOLE_MAGNITUDE {
            return Err(self.invalid(property));
        }
        Ok(())
    }

    fn invalid(&self, property: &'static str) -> ConfigError {
        ConfigError::InvalidRange {
            property,
            min: self.min,
            max: self.max,
        }
    }

    /// Uniform draw on `[min, max]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.gen_range(self.min..=self.max)
    }

    /// Whole-number draw: uniform on `[min, max + 1)` truncated towards
    /// negative infinity, so both ends are equally likely. Bounds must pass
    /// [`validate_whole`](Self::validate_whole).
    pub fn sample_whole<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        rng.gen_range(self.min..self.max + 1.0).floor() as i32
    }
}

/// The scalar properties one kind of content rolls for each placement.
///
/// Each use site (background decoration, collectibles) supplies its own
/// bundle of ranges; the streaming engine only needs to validate it and roll it.
pub trait PropertyRanges {
    type Properties: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    fn validate(&self) -> Result<(), ConfigError>;

    /// Draw one property set. Draw order must be fixed for determinism.
    fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Properties;
}

fn default_weight() -> f32 {
    1.0
}

/// One palette entry with its relative selection weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedVariant<V> {
    pub variant: V,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

impl<V> WeightedVariant<V> {
    pub const fn new(variant: V, weight: f32) -> Self {
        Self { variant, weight }
    }
}

/// Parameters of one streamed content kind. Loaded once per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamingConfig<V, R> {
    /// Chunks within this many world units (rounded up to whole chunks) are loaded.
    pub spawn_radius: f32,
    /// Loaded chunks whose center is farther than this are unloaded.
    pub despawn_radius: f32,
    /// Edge length of a chunk in world units.
    pub chunk_size: f32,
    /// Target number of placements per chunk.
    pub placements_per_chunk: usize,
    /// Minimum distance between two placements of the same chunk.
    pub min_distance: f32,
    /// Variant palette with selection weights.
    pub palette: Vec<WeightedVariant<V>>,
    /// Ranges for the per-placement scalar properties.
    pub ranges: R,
}

impl<V, R: PropertyRanges> StreamingConfig<V, R> {
    /// Check every parameter. Oversized `min_distance` or placement counts are
    /// accepted; they only lead to fewer placements per chunk.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.chunk_size > 0.0 && span_is_sampleable(self.chunk_size)) {
            return Err(ConfigError::InvalidChunkSize(self.chunk_size));
        }
        if !(self.spawn_radius.is_finite() && self.spawn_radius >= 0.0) {
            return Err(ConfigError::InvalidSpawnRadius(self.spawn_radius));
        }
        if self.despawn_radius.is_nan() || self.despawn_radius < self.spawn_radius {
            return Err(ConfigError::DespawnInsideSpawn {
                spawn_radius: self.spawn_radius,
                despawn_radius: self.despawn_radius,
            });
        }
        let radius_in_chunks = (self.spawn_radius / self.chunk_size).ceil();
        if radius_in_chunks > MAX_RADIUS_IN_CHUNKS as f32 {
            return Err(ConfigError::LoadSetTooLarge { radius_in_chunks });
        }
        validate_palette(&self.palette)?;
        self.ranges.validate()
    }
}

/// Check palette weights: at least one entry, none negative, some positive,
/// and a total that can still be drawn from.
pub fn validate_palette<V>(palette: &[WeightedVariant<V>]) -> Result<f32, ConfigError> {
    if palette.is_empty() {
        return Err(ConfigError::EmptyPalette);
    }

    let mut total = 0.0;
    for (index, entry) in palette.iter().enumerate() {
        if !entry.weight.is_finite() || entry.weight < 0.0 {
            return Err(ConfigError::NegativeWeight {
                index,
                weight: entry.weight,
            });
        }
        total += entry.weight;
    }

    if total <= 0.0 {
        return Err(ConfigError::ZeroTotalWeight);
    }
    if !span_is_sampleable(total) {
        return Err(ConfigError::TotalWeightOverflow);
    }
    Ok(total)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Minimal property bundle used across the crate's tests.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct TestRanges {
        pub scale: PropertyRange,
        pub value: PropertyRange,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct TestProperties {
        pub scale: f32,
        pub value: i32,
    }

    impl PropertyRanges for TestRanges {
        type Properties = TestProperties;

        fn validate(&self) -> Result<(), ConfigError> {
            self.scale.validate("scale")?;
            self.value.validate_whole("value")
        }

        fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> TestProperties {
            TestProperties {
                scale: self.scale.sample(rng),
                value: self.value.sample_whole(rng),
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Shape {
        Rock,
        Star,
        Ghost,
    }

    pub fn test_config(
        chunk_size: f32,
        spawn_radius: f32,
        despawn_radius: f32,
    ) -> StreamingConfig<Shape, TestRanges> {
        StreamingConfig {
            spawn_radius,
            despawn_radius,
            chunk_size,
            placements_per_chunk: 5,
            min_distance: 1.0,
            palette: vec![
                WeightedVariant::new(Shape::Rock, 1.0),
                WeightedVariant::new(Shape::Star, 3.0),
                WeightedVariant::new(Shape::Ghost, 0.0),
            ],
            ranges: TestRanges {
                scale: PropertyRange::new(0.8, 1.5),
                value: PropertyRange::new(0.0, 100.0),
            },
        }
    }

    #[test]
    fn default_test_config_is_valid() {
        assert_eq!(test_config(15.0, 20.0, 30.0).validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_chunk_size() {
        let config = test_config(0.0, 20.0, 30.0);
        assert_eq!(config.validate(), Err(ConfigError::InvalidChunkSize(0.0)));

        let config = test_config(-5.0, 20.0, 30.0);
        assert!(matches!(config.validate(), Err(ConfigError::InvalidChunkSize(_))));
    }

    #[test]
    fn rejects_despawn_inside_spawn() {
        let config = test_config(15.0, 30.0, 20.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DespawnInsideSpawn { .. })
        ));
        // Equal radii are allowed.
        assert_eq!(test_config(15.0, 20.0, 20.0).validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_palettes() {
        let mut config = test_config(15.0, 20.0, 30.0);
        config.palette.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyPalette));

        let mut config = test_config(15.0, 20.0, 30.0);
        for entry in &mut config.palette {
            entry.weight = 0.0;
        }
        assert_eq!(config.validate(), Err(ConfigError::ZeroTotalWeight));

        let mut config = test_config(15.0, 20.0, 30.0);
        config.palette[1].weight = -1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeWeight { index: 1, weight: -1.0 })
        );
    }

    #[test]
    fn rejects_inverted_ranges() {
        let mut config = test_config(15.0, 20.0, 30.0);
        config.ranges.scale = PropertyRange::new(2.0, 1.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRange { property: "scale", min: 2.0, max: 1.0 })
        );
    }

    #[test]
    fn rejects_ranges_too_wide_to_sample() {
        let mut config = test_config(15.0, 20.0, 30.0);
        config.ranges.scale = PropertyRange::new(-3e38, 3e38);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { property: "scale", .. })
        ));

        // Wide but drawable.
        let range = PropertyRange::new(-1e37, 1e37);
        assert_eq!(range.validate("scale"), Ok(()));
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(range.sample(&mut rng).is_finite());
    }

    #[test]
    fn whole_ranges_must_count_in_ones() {
        let mut config = test_config(15.0, 20.0, 30.0);
        config.ranges.value = PropertyRange::new(2e7, 2e7);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { property: "value", .. })
        ));

        config.ranges.value = PropertyRange::new(-3e9, 0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { property: "value", .. })
        ));

        let large = PropertyRange::new(1_000_000.0, 1_000_000.0);
        assert_eq!(large.validate_whole("value"), Ok(()));
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(large.sample_whole(&mut rng), 1_000_000);
    }

    #[test]
    fn rejects_weights_summing_to_infinity() {
        let mut config = test_config(15.0, 20.0, 30.0);
        config.palette[0].weight = 3e38;
        config.palette[1].weight = 3e38;
        assert_eq!(config.validate(), Err(ConfigError::TotalWeightOverflow));
    }

    #[test]
    fn rejects_oversized_load_sets() {
        let config = test_config(1.0, 1e10, 2e10);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::LoadSetTooLarge { .. })
        ));

        let edge = MAX_RADIUS_IN_CHUNKS as f32 * 15.0;
        assert_eq!(test_config(15.0, edge, edge + 10.0).validate(), Ok(()));
    }

    #[test]
    fn huge_min_distance_is_permitted() {
        let mut config = test_config(15.0, 20.0, 30.0);
        config.min_distance = 1000.0;
        config.placements_per_chunk = 500;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn samples_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let range = PropertyRange::new(0.5, 2.0);
        let whole = PropertyRange::new(0.0, 100.0);

        for _ in 0..1000 {
            assert!((0.5..=2.0).contains(&range.sample(&mut rng)));
            let v = whole.sample_whole(&mut rng);
            assert!((0..=100).contains(&v));
        }
    }

    #[test]
    fn degenerate_range_is_constant() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let range = PropertyRange::new(1.25, 1.25);
        assert_eq!(range.sample(&mut rng), 1.25);

        let whole = PropertyRange::new(3.0, 3.0);
        assert_eq!(whole.sample_whole(&mut rng), 3);
    }

    #[test]
    fn errors_render_readably() {
        let err = ConfigError::DespawnInsideSpawn {
            spawn_radius: 30.0,
            despawn_radius: 20.0,
        };
        assert_eq!(err.to_string(), "despawn radius 20 is smaller than spawn radius 30");
    }
}

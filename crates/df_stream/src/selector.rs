use rand::Rng;

use crate::config::{validate_palette, ConfigError, WeightedVariant};

/// Picks palette entries with probability proportional to their weight.
#[derive(Debug, Clone)]
pub struct WeightedSelector<V> {
    entries: Vec<WeightedVariant<V>>,
    total_weight: f32,
    /// Index of the last entry with a positive weight, returned when float
    /// rounding leaves the draw above the final cumulative sum.
    fallback: usize,
}

impl<V> WeightedSelector<V> {
    /// Build a selector, rejecting empty, negative or all-zero palettes.
    pub fn new(entries: Vec<WeightedVariant<V>>) -> Result<Self, ConfigError> {
        let total_weight = validate_palette(&entries)?;
        let fallback = entries
            .iter()
            .rposition(|e| e.weight > 0.0)
            .ok_or(ConfigError::ZeroTotalWeight)?;

        Ok(Self {
            entries,
            total_weight,
            fallback,
        })
    }

    pub fn total_weight(&self) -> f32 {
        self.total_weight
    }

    /// Draw one variant. Consumes exactly one value from `rng`.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &V {
        let draw = rng.gen_range(0.0..=self.total_weight);
        let mut cumulative = 0.0;

        for entry in &self.entries {
            if entry.weight <= 0.0 {
                continue;
            }
            cumulative += entry.weight;
            if draw <= cumulative {
                return &entry.variant;
            }
        }

        &self.entries[self.fallback].variant
    }
}

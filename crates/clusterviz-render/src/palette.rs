//! Cluster color assignment that survives snapshot refreshes.
//!
//! The simulation renumbers clusters freely, so the only identity the client
//! can rely on is the cluster index within the current snapshot. The registry
//! keeps its assignment as long as the cluster count stays the same and draws a
//! fresh, shuffled hue wheel whenever the count changes. Shuffling keeps
//! neighbouring cluster indices from getting near-identical hues.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::Color;

pub const PALETTE_SATURATION: f32 = 1.0;
pub const PALETTE_LIGHTNESS: f32 = 0.5;

/// Evenly spaced hue wheel: `hue(i) = i / count * 360`, unshuffled.
pub fn palette(count: usize) -> Vec<Color> {
    (0..count)
        .map(|index| {
            let hue = index as f32 / count as f32 * 360.0;
            Color::from_hsla(hue, PALETTE_SATURATION, PALETTE_LIGHTNESS, 1.0)
        })
        .collect()
}

/// Per-cluster colors, index-aligned to cluster index.
#[derive(Debug, Clone)]
pub struct ColorRegistry {
    colors: Vec<Color>,
    generation: u64,
    rng: SmallRng,
}

impl Default for ColorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorRegistry {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_os_rng())
    }

    /// Registry with a reproducible shuffle sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            colors: Vec::new(),
            generation: 0,
            rng,
        }
    }

    /// Colors for `cluster_count` clusters. Returns the previous assignment
    /// untouched when the count is unchanged.
    pub fn reconcile(&mut self, cluster_count: usize) -> &[Color] {
        if self.colors.len() != cluster_count {
            let mut colors = palette(cluster_count);
            colors.shuffle(&mut self.rng);
            self.colors = colors;
            self.generation += 1;
            debug!(
                clusters = cluster_count,
                generation = self.generation,
                "regenerated cluster palette"
            );
        }
        &self.colors
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Number of times the palette has been regenerated.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

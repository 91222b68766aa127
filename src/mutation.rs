//! Genome mutation.
//!
//! Before the first victory, every position of the parent may mutate, with a
//! probability that grows towards the end of the genome: late moves are the
//! least refined. Once adaptive mode is on, a single random position is
//! rewritten so the search becomes a hill climb around the working solution.

use crate::agent::{Genome, Move};
use crate::config::MutationConfig;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Monotonic map from normalized position to unnormalized mutation weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingFunction {
    Exp,
    Quadratic,
}

impl MappingFunction {
    #[inline]
    pub fn apply(self, p: f64) -> f64 {
        match self {
            MappingFunction::Exp => p.exp(),
            MappingFunction::Quadratic => p * p,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationMode {
    PositionWeighted,
    Adaptive,
}

/// Produces child genomes from parents
#[derive(Debug, Clone)]
pub struct MutationEngine {
    /// Percentage multipliers applied to the per-position probability
    intensity_options: Vec<u32>,
    mapping: MappingFunction,
    adaptive_chance_pct: u32,
}

impl MutationEngine {
    pub fn from_config(config: &MutationConfig) -> Self {
        Self {
            intensity_options: config.intensity_options.clone(),
            mapping: config.mapping,
            adaptive_chance_pct: config.adaptive.mutation_chance_pct,
        }
    }

    /// Normalized mutation probability for each position of a genome of `len` moves
    pub fn position_probabilities(&self, len: usize) -> Vec<f64> {
        let scale = 100.0 * len as f64;
        let weights: Vec<f64> = (1..=len).map(|i| self.mapping.apply(i as f64 / scale)).collect();
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return vec![0.0; len];
        }
        weights.into_iter().map(|w| w / total).collect()
    }

    /// Derive a child genome from `parent`
    pub fn mutate<R: Rng + ?Sized>(&self, parent: &Genome, mode: MutationMode, rng: &mut R) -> Genome {
        if parent.is_empty() {
            return Genome::default();
        }
        match mode {
            MutationMode::PositionWeighted => self.mutate_weighted(parent, rng),
            MutationMode::Adaptive => self.mutate_single(parent, rng),
        }
    }

    fn mutate_weighted<R: Rng + ?Sized>(&self, parent: &Genome, rng: &mut R) -> Genome {
        let intensity = f64::from(self.intensity_options.choose(rng).copied().unwrap_or(100));
        let probabilities = self.position_probabilities(parent.len());

        parent
            .as_slice()
            .iter()
            .zip(probabilities)
            .map(|(&mv, probability)| {
                let roll = f64::from(rng.gen_range(1..=100u32));
                if roll <= probability * intensity {
                    Move::random(rng)
                } else {
                    mv
                }
            })
            .collect()
    }

    fn mutate_single<R: Rng + ?Sized>(&self, parent: &Genome, rng: &mut R) -> Genome {
        let mut moves = parent.as_slice().to_vec();
        if rng.gen_range(1..=100u32) <= self.adaptive_chance_pct {
            let index = rng.gen_range(0..moves.len());
            moves[index] = Move::random(rng);
        }
        moves.into()
    }
}

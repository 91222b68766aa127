//! Generational controller.
//!
//! Drives the loop simulate → select → mutate for the configured number of
//! generations, tracks the all-time best genome, and switches to adaptive
//! mode a fixed number of generations after the first victory.

use crate::agent::Genome;
use crate::config::{AdaptiveConfig, Config, ConfigError};
use crate::mutation::{MutationEngine, MutationMode};
use crate::oracle::CollisionOracle;
use crate::score::StepError;
use crate::selection::{PopulationSelector, RankedResult, Selection};
use crate::simulation::{Exploration, Simulation, StopSignal};
use crate::stats::{GenerationStats, StatsHistory};
use crate::store::{GenomeKey, GenomeStore, StoreError, StoredGenome};
use crate::track::{TrackError, TrackTopology};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use thiserror::Error;

/// Any failure of a training or replay run
#[derive(Debug, Error)]
pub enum EvolutionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Track(#[from] TrackError),

    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to write stats history: {0}")]
    Stats(#[from] std::io::Error),
}

/// Summary of a finished training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub best: RankedResult,
    pub generations_run: usize,
    pub first_victory: Option<usize>,
    /// First generation driven by adaptive mode
    pub adaptive_from: Option<usize>,
    pub cancelled: bool,
    pub seed: u64,
    pub history: StatsHistory,
    /// Where the best genome was stored, if it was
    pub saved_to: Option<PathBuf>,
}

/// Evolution engine managing the population across generations
pub struct EvolutionEngine<'a> {
    simulation: Simulation<'a>,
    selector: PopulationSelector,
    mutator: MutationEngine,
    adaptive: AdaptiveConfig,
    population_size: usize,
    generations: usize,
    stats_interval: usize,

    rng: ChaCha8Rng,
    seed: u64,

    generation: usize,
    parents: Vec<Genome>,
    best: RankedResult,
    first_victory: Option<usize>,
    adaptive_from: Option<usize>,
    history: StatsHistory,
}

impl<'a> EvolutionEngine<'a> {
    /// Create an engine, seeded from the config or at random
    pub fn new(topology: &'a TrackTopology, oracle: &'a dyn CollisionOracle, config: &Config) -> Self {
        let seed = config.evolution.seed.unwrap_or_else(|| rand::thread_rng().gen());
        Self::new_with_seed(topology, oracle, config, seed)
    }

    /// Create an engine with a specific seed for reproducibility
    pub fn new_with_seed(
        topology: &'a TrackTopology,
        oracle: &'a dyn CollisionOracle,
        config: &Config,
        seed: u64,
    ) -> Self {
        let population_size = config.evolution.population_size;
        Self {
            simulation: Simulation::new(topology, oracle, config),
            selector: PopulationSelector::from_config(&config.selection),
            mutator: MutationEngine::from_config(&config.mutation),
            adaptive: config.mutation.adaptive.clone(),
            population_size,
            generations: config.evolution.generations,
            stats_interval: config.logging.stats_interval.max(1),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            generation: 0,
            // The first generation explores from scratch
            parents: vec![Genome::default(); population_size],
            best: RankedResult::placeholder(),
            first_victory: None,
            adaptive_from: None,
            history: StatsHistory::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Index of the next generation to run
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// All-time best result
    pub fn best(&self) -> &RankedResult {
        &self.best
    }

    pub fn first_victory(&self) -> Option<usize> {
        self.first_victory
    }

    /// True when the next generation runs in adaptive mode
    pub fn is_adaptive(&self) -> bool {
        self.adaptive_from.map_or(false, |from| self.generation >= from)
    }

    pub fn history(&self) -> &StatsHistory {
        &self.history
    }

    /// Run one generation and prepare the parents of the next
    pub fn step(&mut self, stop: &StopSignal) -> Result<GenerationStats, StepError> {
        let adaptive = self.is_adaptive();
        let genomes = std::mem::take(&mut self.parents);
        let run = self
            .simulation
            .run_generation(genomes, Exploration::Random, &mut self.rng, stop)?;
        let results = run.results();

        let selection = self.selector.select(&results, &self.best, &mut self.rng);
        if let Some(leader) = selection.best() {
            if leader.beats(&self.best) {
                self.best = RankedResult {
                    source: None,
                    ..leader.clone()
                };
            }
        }

        if self.first_victory.is_none() && self.best.is_victory() {
            self.first_victory = Some(self.generation);
            log::info!(
                "First victory in generation {} ({:.2}s, {} moves)",
                self.generation,
                self.best.time,
                self.best.moves.len()
            );
            if self.adaptive.enabled {
                let from = self.generation + self.adaptive.delay_generations + 1;
                self.adaptive_from = Some(from);
                log::info!("Adaptive mode scheduled from generation {}", from);
            }
        }

        let stats = GenerationStats::from_results(self.generation, &results, run.ticks, run.halt, &self.best, adaptive);
        if self.generation % self.stats_interval == 0 {
            log::info!("{}", stats.summary());
        }
        self.history.record(stats.clone());

        self.generation += 1;
        self.parents = self.breed(&selection);

        Ok(stats)
    }

    /// Draw parents and mutate them into the next population
    fn breed(&mut self, selection: &Selection) -> Vec<Genome> {
        let n = self.population_size;
        let mutator = &self.mutator;
        let rng = &mut self.rng;

        if self.adaptive_from.map_or(false, |from| self.generation >= from) {
            let elite = &self.best.moves;
            return (0..n).map(|_| mutator.mutate(elite, MutationMode::Adaptive, rng)).collect();
        }

        let lottery = &selection.lottery;
        let parents = lottery.draw_parents(n, rng);
        if parents.is_empty() {
            return vec![Genome::default(); n];
        }
        parents
            .into_iter()
            .map(|index| mutator.mutate(lottery.genome(index), MutationMode::PositionWeighted, rng))
            .collect()
    }

    /// Run the remaining generations, stopping early on the stop signal
    pub fn run(&mut self, stop: &StopSignal) -> Result<TrainingOutcome, StepError> {
        let mut cancelled = false;
        while self.generation < self.generations {
            self.step(stop)?;
            if stop.is_raised() {
                log::warn!("Training stopped after generation {}", self.generation - 1);
                cancelled = true;
                break;
            }
        }
        Ok(self.outcome(cancelled))
    }

    pub fn outcome(&self, cancelled: bool) -> TrainingOutcome {
        TrainingOutcome {
            best: self.best.clone(),
            generations_run: self.generation,
            first_victory: self.first_victory,
            adaptive_from: self.adaptive_from.filter(|from| *from < self.generation),
            cancelled,
            seed: self.seed,
            history: self.history.clone(),
            saved_to: None,
        }
    }
}

/// Train on a loaded track and persist the results the config asks for
pub fn train(
    config: &Config,
    topology: &TrackTopology,
    oracle: &dyn CollisionOracle,
    stop: &StopSignal,
) -> Result<TrainingOutcome, EvolutionError> {
    let mut engine = EvolutionEngine::new(topology, oracle, config);
    log::info!(
        "Training on track {}: {} generations x {} agents, seed {}",
        config.track.id,
        config.evolution.generations,
        config.evolution.population_size,
        engine.seed()
    );

    let mut outcome = engine.run(stop)?;

    if config.storage.save_best && !outcome.best.is_placeholder() {
        let key = GenomeKey::new(config.track.particle_size, config.track.id.clone());
        let stored = StoredGenome::new(&key, outcome.best.score, outcome.best.time, outcome.best.moves.clone());
        let path = GenomeStore::new(&config.storage.dir).save(&stored)?;
        log::info!("Best genome saved to {}", path.display());
        outcome.saved_to = Some(path);
    }

    if let Some(path) = &config.storage.stats_path {
        outcome.history.save(path)?;
    }

    Ok(outcome)
}

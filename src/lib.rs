//! # Trailblazer
//!
//! Genetic search for open-loop move sequences that steer an agent from a
//! start point to a goal region on a 2-D track.
//!
//! ## Features
//!
//! - **Section scoring**: a piecewise-constant reward field, integrated along
//!   every step, stays continuous across reward-direction corners
//! - **Elitist lottery**: ranked elites plus a diversity sample pick parents
//! - **Adaptive mode**: single-move hill climbing after the first victory
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: Seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trailblazer::{Config, EvolutionEngine, RegionOracle, StopSignal, TrackTopology};
//!
//! let config = Config::default();
//! let topology = TrackTopology::from_file(&config.track.sections_path).unwrap();
//! let oracle = RegionOracle::new(&topology, config.track.goal, config.track.particle_size);
//!
//! let mut engine = EvolutionEngine::new(&topology, &oracle, &config);
//! let outcome = engine.run(&StopSignal::new()).unwrap();
//!
//! println!("Best score: {}", outcome.best.score);
//! println!("First victory: {:?}", outcome.first_victory);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use trailblazer::Config;
//!
//! let mut config = Config::default();
//! config.evolution.population_size = 200;
//! config.selection.random_share_pct = 20;
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Replay
//!
//! ```rust,no_run
//! use trailblazer::{replay_stored, Config, RegionOracle, TrackTopology};
//!
//! let config = Config::default();
//! let topology = TrackTopology::from_file(&config.track.sections_path).unwrap();
//! let oracle = RegionOracle::new(&topology, config.track.goal, config.track.particle_size);
//!
//! let report = replay_stored(&config, &topology, &oracle).unwrap();
//! println!("Victory: {} in {:.2}s", report.victory, report.elapsed);
//! ```

pub mod agent;
pub mod config;
pub mod evolution;
pub mod mutation;
pub mod oracle;
pub mod replay;
pub mod score;
pub mod selection;
pub mod simulation;
pub mod stats;
pub mod store;
pub mod track;

// Re-export main types
pub use agent::{Agent, Genome, Move, PopulationResult};
pub use config::Config;
pub use evolution::{train, EvolutionEngine, EvolutionError, TrainingOutcome};
pub use oracle::{CollisionOracle, RegionOracle, Surface};
pub use replay::{replay, replay_stored, ReplayReport};
pub use score::{score_step, VICTORY_SCORE};
pub use simulation::{Simulation, StopSignal};
pub use track::{Point, Rect, TrackTopology};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark on the demo track
pub fn benchmark(generations: usize, population: usize) -> Result<BenchmarkResult, EvolutionError> {
    use std::time::Instant;

    let mut config = Config::default();
    config.evolution.generations = generations;
    config.evolution.population_size = population;
    config.selection.elite_count = config.selection.elite_count.min(population);
    config.selection.random_count = config
        .selection
        .random_count
        .min(population - config.selection.elite_count);
    if config.selection.random_count == 0 {
        config.selection.random_share_pct = 0;
    }
    config.validate()?;

    let topology = TrackTopology::load(track::demo_sections())?;
    let oracle = RegionOracle::new(&topology, config.track.goal, config.track.particle_size);
    let mut engine = EvolutionEngine::new_with_seed(&topology, &oracle, &config, 0);

    let start = Instant::now();
    let outcome = engine.run(&StopSignal::new())?;
    let elapsed = start.elapsed();

    let ticks: usize = outcome.history.snapshots.iter().map(|s| s.ticks).sum();
    Ok(BenchmarkResult {
        generations: outcome.generations_run,
        population,
        elapsed_secs: elapsed.as_secs_f64(),
        generations_per_second: outcome.generations_run as f64 / elapsed.as_secs_f64(),
        ticks_per_second: ticks as f64 / elapsed.as_secs_f64(),
        best_score: outcome.best.score,
        first_victory: outcome.first_victory,
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub generations: usize,
    pub population: usize,
    pub elapsed_secs: f64,
    pub generations_per_second: f64,
    pub ticks_per_second: f64,
    pub best_score: f64,
    pub first_victory: Option<usize>,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Generations: {}", self.generations)?;
        writeln!(f, "Population: {}", self.population)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} generations/s, {:.0} ticks/s", self.generations_per_second, self.ticks_per_second)?;
        writeln!(f, "Best score: {:.0}", self.best_score)?;
        match self.first_victory {
            Some(generation) => writeln!(f, "First victory: generation {}", generation)?,
            None => writeln!(f, "First victory: none")?,
        }
        Ok(())
    }
}

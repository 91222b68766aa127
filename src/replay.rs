//! Replay of a stored genome.
//!
//! A single agent follows the genome exactly, with no mutation and no random
//! exploration once the genome runs out.

use crate::agent::Genome;
use crate::config::Config;
use crate::evolution::EvolutionError;
use crate::oracle::CollisionOracle;
use crate::simulation::{Exploration, HaltReason, Simulation, StopSignal};
use crate::store::{GenomeKey, GenomeStore};
use crate::track::{Point, TrackTopology};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// What happened when a genome was replayed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub victory: bool,
    /// Running score when the agent stopped
    pub score: f64,
    /// Best record score (the victory sentinel on success)
    pub best_score: f64,
    /// Simulated time of the best record
    pub elapsed: f64,
    pub ticks: usize,
    pub halt: HaltReason,
    pub moves_executed: usize,
    pub trail: Vec<Point>,
}

/// Replay `genome` on the configured track
pub fn replay(
    genome: &Genome,
    config: &Config,
    topology: &TrackTopology,
    oracle: &dyn CollisionOracle,
) -> Result<ReplayReport, EvolutionError> {
    let simulation = Simulation::new(topology, oracle, config);
    // Halt exploration never draws, the generator only satisfies the signature
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let run = simulation.run_generation(vec![genome.clone()], Exploration::Halt, &mut rng, &StopSignal::new())?;

    let halt = run.halt;
    let ticks = run.ticks;
    let Some(agent) = run.agents.into_iter().next() else {
        return Ok(ReplayReport {
            victory: false,
            score: 0.0,
            best_score: 0.0,
            elapsed: 0.0,
            ticks,
            halt,
            moves_executed: 0,
            trail: vec![simulation.start()],
        });
    };

    let result = agent.result();
    Ok(ReplayReport {
        victory: result.is_victory(),
        score: agent.score,
        best_score: result.score,
        elapsed: result.elapsed,
        ticks,
        halt,
        moves_executed: agent.moves_made.len(),
        trail: agent.trail,
    })
}

/// Load the genome stored for the configured particle size and track, then replay it
pub fn replay_stored(
    config: &Config,
    topology: &TrackTopology,
    oracle: &dyn CollisionOracle,
) -> Result<ReplayReport, EvolutionError> {
    let key = GenomeKey::new(config.track.particle_size, config.track.id.clone());
    let stored = GenomeStore::new(&config.storage.dir).load(&key)?;
    log::info!(
        "Replaying {} moves (trained score {:.0}, {:.2}s)",
        stored.moves.len(),
        stored.score,
        stored.time
    );
    replay(&stored.moves, config, topology, oracle)
}

//! Generation stepper.
//!
//! Runs every agent of one generation tick by tick from the start point until
//! all of them are dead, the stop signal is raised, or an agent leaves the
//! arena. Time is measured on a simulated clock so results do not depend on
//! how fast the host runs the loop.

use crate::agent::{Agent, Genome, Move, PopulationResult};
use crate::config::Config;
use crate::oracle::{CollisionOracle, Surface};
use crate::score::{score_step, StepError};
use crate::track::{Point, TrackTopology};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What an agent does once its genome is exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exploration {
    /// Keep going with uniformly random moves
    Random,
    /// Stop the agent
    Halt,
}

/// Why the tick loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    AllDead,
    Cancelled,
    OutOfBounds,
}

/// Cooperative cancellation flag shared with the caller
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sleeps between ticks to hold a target rate. A rate of 0 disables pacing.
#[derive(Debug)]
pub struct TickPacer {
    period: Option<Duration>,
    next: Option<Instant>,
}

impl TickPacer {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            period: (tick_rate > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(tick_rate))),
            next: None,
        }
    }

    pub fn wait(&mut self) {
        let Some(period) = self.period else { return };
        let now = Instant::now();
        let deadline = self.next.unwrap_or(now + period);
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        self.next = Some(deadline.max(now) + period);
    }
}

/// Agents of a finished generation
#[derive(Debug, Clone)]
pub struct GenerationRun {
    pub agents: Vec<Agent>,
    pub ticks: usize,
    pub halt: HaltReason,
}

impl GenerationRun {
    /// One result per agent, in spawn order
    pub fn results(&self) -> Vec<PopulationResult> {
        self.agents.iter().map(Agent::result).collect()
    }

    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.alive).count()
    }
}

/// Fixed simulation setting shared by every generation
pub struct Simulation<'a> {
    topology: &'a TrackTopology,
    oracle: &'a dyn CollisionOracle,
    start: Point,
    arena_width: i32,
    arena_height: i32,
    particle_size: i32,
    movement_step: i32,
    clock_rate: f64,
    tick_rate: u32,
}

impl<'a> Simulation<'a> {
    pub fn new(topology: &'a TrackTopology, oracle: &'a dyn CollisionOracle, config: &Config) -> Self {
        Self {
            topology,
            oracle,
            start: config.track.start,
            arena_width: config.track.arena_width,
            arena_height: config.track.arena_height,
            particle_size: config.track.particle_size,
            movement_step: config.evolution.movement_step,
            clock_rate: config.simulation.clock_rate,
            tick_rate: config.simulation.tick_rate,
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    /// Simulated seconds at the end of `tick`, to two decimals
    fn elapsed(&self, tick: usize) -> f64 {
        let seconds = (tick + 1) as f64 / self.clock_rate;
        (seconds * 100.0).round() / 100.0
    }

    /// True when the agent shape lies fully inside the arena
    fn in_arena(&self, position: Point) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x <= self.arena_width - self.particle_size
            && position.y <= self.arena_height - self.particle_size
    }

    /// Simulate one generation, one agent per genome
    pub fn run_generation<R: Rng + ?Sized>(
        &self,
        genomes: Vec<Genome>,
        exploration: Exploration,
        rng: &mut R,
        stop: &StopSignal,
    ) -> Result<GenerationRun, StepError> {
        let mut agents: Vec<Agent> = genomes.into_iter().map(|g| Agent::new(self.start, g)).collect();
        let mut pacer = TickPacer::new(self.tick_rate);
        let mut tick = 0usize;

        let halt = loop {
            if stop.is_raised() {
                log::debug!("Stop signal observed at tick {}", tick);
                break HaltReason::Cancelled;
            }
            if !agents.iter().any(|a| a.alive) {
                break HaltReason::AllDead;
            }

            let elapsed = self.elapsed(tick);
            let mut escaped = None;

            for agent in agents.iter_mut().filter(|a| a.alive) {
                let mv = match (agent.planned_move(tick), exploration) {
                    (Some(mv), _) => mv,
                    (None, Exploration::Random) => Move::random(rng),
                    (None, Exploration::Halt) => {
                        agent.kill();
                        continue;
                    }
                };
                agent.advance(mv, self.movement_step);

                let crashed = self.oracle.overlaps(Surface::Boundary, agent.position);
                if crashed {
                    agent.kill();
                }
                // Goal boxes may extend into the wall; touching one still wins
                if self.oracle.overlaps(Surface::Goal, agent.position) {
                    agent.record_victory(tick, elapsed);
                } else if !crashed {
                    let delta = score_step(agent.last_point, agent.position, self.topology)?;
                    agent.record_progress(delta, tick, elapsed);
                }

                if escaped.is_none() && !self.in_arena(agent.position) {
                    escaped = Some(agent.position);
                }
            }

            tick += 1;
            pacer.wait();

            if let Some(position) = escaped {
                log::warn!(
                    "Agent left the arena at {} on tick {}; ending generation",
                    position, tick
                );
                break HaltReason::OutOfBounds;
            }
        };

        Ok(GenerationRun {
            agents,
            ticks: tick,
            halt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::RegionOracle;
    use crate::track::{demo_sections, Rect, Reward, Section};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cell::Cell;

    fn fixture() -> (TrackTopology, Config) {
        let topology = TrackTopology::load(demo_sections()).unwrap();
        (topology, Config::default())
    }

    fn oracle(topology: &TrackTopology, config: &Config) -> RegionOracle {
        RegionOracle::new(topology, config.track.goal, config.track.particle_size)
    }

    #[test]
    fn test_left_runner_dies_on_wall() {
        let (topology, config) = fixture();
        let oracle = oracle(&topology, &config);
        let sim = Simulation::new(&topology, &oracle, &config);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let genome: Genome = vec![Move::Left; 5].into();
        let run = sim
            .run_generation(vec![genome], Exploration::Halt, &mut rng, &StopSignal::new())
            .unwrap();

        assert_eq!(run.halt, HaltReason::AllDead);
        assert_eq!(run.ticks, 1);
        let result = &run.results()[0];
        assert_eq!(result.score, 0.0);
        assert!(result.moves.is_empty());
    }

    #[test]
    fn test_right_runner_scores_distance() {
        let (topology, config) = fixture();
        let oracle = oracle(&topology, &config);
        let sim = Simulation::new(&topology, &oracle, &config);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let genome: Genome = vec![Move::Right; 4].into();
        let run = sim
            .run_generation(vec![genome], Exploration::Halt, &mut rng, &StopSignal::new())
            .unwrap();

        let agent = &run.agents[0];
        assert_eq!(agent.position, Point::new(94, 514));
        assert_eq!(agent.trail.len(), 5);
        assert_eq!(run.results()[0].score, 60.0);
        assert_eq!(run.results()[0].moves.len(), 4);
    }

    #[test]
    fn test_random_exploration_extends_genome() {
        let (topology, config) = fixture();
        let oracle = oracle(&topology, &config);
        let sim = Simulation::new(&topology, &oracle, &config);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let run = sim
            .run_generation(vec![Genome::default(); 4], Exploration::Random, &mut rng, &StopSignal::new())
            .unwrap();

        assert!(run.ticks >= 1);
        assert_eq!(run.alive_count(), 0);
        assert!(run.agents.iter().all(|a| !a.moves_made.is_empty()));
    }

    #[test]
    fn test_cancel_before_first_tick() {
        let (topology, config) = fixture();
        let oracle = oracle(&topology, &config);
        let sim = Simulation::new(&topology, &oracle, &config);
        let stop = StopSignal::new();
        stop.raise();

        let run = sim
            .run_generation(vec![Genome::default(); 3], Exploration::Random, &mut ChaCha8Rng::seed_from_u64(0), &stop)
            .unwrap();

        assert_eq!(run.halt, HaltReason::Cancelled);
        assert_eq!(run.ticks, 0);
        assert_eq!(run.alive_count(), 3);
        assert!(run.results().iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn test_leaving_arena_ends_generation() {
        let (topology, mut config) = fixture();
        config.track.arena_width = 100;
        let oracle = oracle(&topology, &config);
        let sim = Simulation::new(&topology, &oracle, &config);

        let runner: Genome = vec![Move::Right; 10].into();
        let idler: Genome = vec![Move::Down; 10].into();
        let run = sim
            .run_generation(vec![runner, idler], Exploration::Halt, &mut ChaCha8Rng::seed_from_u64(0), &StopSignal::new())
            .unwrap();

        assert_eq!(run.halt, HaltReason::OutOfBounds);
        assert_eq!(run.agents[0].position, Point::new(94, 514));
        assert_eq!(run.ticks, 4);
    }

    #[test]
    fn test_goal_touch_is_victory() {
        let (topology, mut config) = fixture();
        // Goal right in front of the start point
        config.track.goal = Rect::new(60, 479, 70, 569);
        let oracle = oracle(&topology, &config);
        let sim = Simulation::new(&topology, &oracle, &config);

        let genome: Genome = vec![Move::Right; 3].into();
        let run = sim
            .run_generation(vec![genome], Exploration::Halt, &mut ChaCha8Rng::seed_from_u64(0), &StopSignal::new())
            .unwrap();

        let result = &run.results()[0];
        assert!(result.is_victory());
        assert_eq!(result.moves.len(), 2);
        assert_eq!(result.elapsed, sim.elapsed(1));
    }

    #[test]
    fn test_goal_behind_wall_is_victory() {
        let topology = TrackTopology::load(vec![Section::from_bounds(0, 0, 99, 99, Reward::new(1, 0))]).unwrap();
        let mut config = Config::default();
        config.track.start = Point::new(40, 40);
        config.track.goal = Rect::new(95, 0, 120, 99);
        let oracle = oracle(&topology, &config);
        let sim = Simulation::new(&topology, &oracle, &config);

        let genome: Genome = vec![Move::Right; 10].into();
        let run = sim
            .run_generation(vec![genome], Exploration::Halt, &mut ChaCha8Rng::seed_from_u64(0), &StopSignal::new())
            .unwrap();

        // Shape at x=100 is past the wall and inside the goal box
        assert_eq!(run.agents[0].position, Point::new(100, 40));
        let result = &run.results()[0];
        assert!(result.is_victory());
        assert_eq!(result.moves.len(), 4);
        assert_eq!(result.elapsed, sim.elapsed(3));
    }

    /// Raises the stop signal once enough boundary checks have been made
    struct StopAfter {
        inner: RegionOracle,
        stop: StopSignal,
        calls: Cell<usize>,
        limit: usize,
    }

    impl CollisionOracle for StopAfter {
        fn overlaps(&self, surface: Surface, position: Point) -> bool {
            if surface == Surface::Boundary {
                self.calls.set(self.calls.get() + 1);
                if self.calls.get() == self.limit {
                    self.stop.raise();
                }
            }
            self.inner.overlaps(surface, position)
        }
    }

    #[test]
    fn test_cancel_mid_generation_keeps_best_records() {
        let (topology, config) = fixture();
        let stop = StopSignal::new();
        // Two checks on tick 0, the third on tick 1
        let oracle = StopAfter {
            inner: oracle(&topology, &config),
            stop: stop.clone(),
            calls: Cell::new(0),
            limit: 3,
        };
        let sim = Simulation::new(&topology, &oracle, &config);

        let runner: Genome = vec![Move::Right; 10].into();
        let crasher: Genome = vec![Move::Left; 10].into();
        let run = sim
            .run_generation(vec![runner, crasher], Exploration::Halt, &mut ChaCha8Rng::seed_from_u64(0), &stop)
            .unwrap();

        assert_eq!(run.halt, HaltReason::Cancelled);
        assert_eq!(run.ticks, 2);
        assert!(run.agents[0].alive);
        assert!(!run.agents[1].alive);

        let results = run.results();
        assert_eq!(results[0].score, 30.0);
        assert_eq!(results[0].elapsed, sim.elapsed(1));
        assert_eq!(results[0].moves.as_slice(), &[Move::Right, Move::Right]);
        assert_eq!(results[1].score, 0.0);
    }

    #[test]
    fn test_pacer_disabled_at_zero() {
        let mut pacer = TickPacer::new(0);
        let start = Instant::now();
        for _ in 0..1000 {
            pacer.wait();
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}

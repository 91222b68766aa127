//! Agent state and the move alphabet.

use crate::score::VICTORY_SCORE;
use crate::track::Point;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single discrete move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Uniformly random move
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Signed displacement `(dx, dy)` for a move of `step` pixels.
    /// The y axis grows downwards.
    pub fn displacement(self, step: i32) -> (i32, i32) {
        match self {
            Move::Up => (0, -step),
            Move::Down => (0, step),
            Move::Left => (-step, 0),
            Move::Right => (step, 0),
        }
    }
}

/// Ordered move sequence describing one candidate trajectory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome(Vec<Move>);

impl Genome {
    pub fn new(moves: Vec<Move>) -> Self {
        Self(moves)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Move> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.0
    }

    pub fn into_moves(self) -> Vec<Move> {
        self.0
    }
}

impl From<Vec<Move>> for Genome {
    fn from(moves: Vec<Move>) -> Self {
        Self(moves)
    }
}

impl FromIterator<Move> for Genome {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Best score an agent reached, with the tick and time it happened
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BestRecord {
    pub score: f64,
    pub step: usize,
    pub elapsed: f64,
}

/// Outcome of one agent for one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationResult {
    /// Executed moves up to and including the tick of the best record
    pub moves: Genome,
    pub score: f64,
    pub elapsed: f64,
}

impl PopulationResult {
    pub fn is_victory(&self) -> bool {
        self.score >= VICTORY_SCORE
    }
}

/// Per-generation simulation state for one agent
#[derive(Debug, Clone)]
pub struct Agent {
    pub position: Point,
    pub alive: bool,
    pub score: f64,
    pub best: BestRecord,
    pub moves_made: Vec<Move>,
    pub last_point: Point,
    /// Every position occupied, starting with the spawn point
    pub trail: Vec<Point>,
    genome: Genome,
}

impl Agent {
    /// Spawn a fresh agent at `start` that will follow `genome`
    pub fn new(start: Point, genome: Genome) -> Self {
        Self {
            position: start,
            alive: true,
            score: 0.0,
            best: BestRecord::default(),
            moves_made: Vec::with_capacity(genome.len()),
            last_point: start,
            trail: vec![start],
            genome,
        }
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Move the parent genome prescribes for `tick`, if it is long enough
    pub fn planned_move(&self, tick: usize) -> Option<Move> {
        self.genome.get(tick)
    }

    /// Apply a move and log it
    pub fn advance(&mut self, mv: Move, step: i32) {
        let (dx, dy) = mv.displacement(step);
        self.position = self.position.offset(dx, dy);
        self.moves_made.push(mv);
        self.trail.push(self.position);
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Mark the goal as reached; victory replaces any earlier best record
    pub fn record_victory(&mut self, tick: usize, elapsed: f64) {
        self.alive = false;
        self.best = BestRecord {
            score: VICTORY_SCORE,
            step: tick,
            elapsed,
        };
    }

    /// Add a score delta and move the best record forward if it improved
    pub fn record_progress(&mut self, delta: f64, tick: usize, elapsed: f64) {
        self.score += delta;
        self.last_point = self.position;
        if self.score > self.best.score {
            self.best = BestRecord {
                score: self.score,
                step: tick,
                elapsed,
            };
        }
    }

    /// Extract the generation result, truncating moves after the best record.
    ///
    /// An agent that never improved on its spawn score contributes no moves.
    pub fn result(&self) -> PopulationResult {
        // No improvement over the spawn record leaves nothing worth inheriting
        let keep = if self.best.score > 0.0 {
            (self.best.step + 1).min(self.moves_made.len())
        } else {
            0
        };
        PopulationResult {
            moves: self.moves_made[..keep].iter().copied().collect(),
            score: self.best.score,
            elapsed: self.best.elapsed,
        }
    }
}

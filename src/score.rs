//! Step scoring over the section reward field.
//!
//! Inside one section a step earns its displacement dotted with the section's
//! reward. A step that crosses into a neighbouring section is split into the
//! run of coordinates lying in each section, and each run is scored with its
//! own section's reward. This keeps the fitness landscape continuous where the
//! reward direction turns a corner.

use crate::track::{Point, Section, TrackTopology};
use thiserror::Error;

/// Score reserved for agents that reach the goal
pub const VICTORY_SCORE: f64 = 1e9;

/// Invariant violations detected while scoring a step
#[derive(Debug, Error)]
pub enum StepError {
    #[error("diagonal step from {from} to {to}; a move changes exactly one coordinate")]
    Diagonal { from: Point, to: Point },

    #[error("step from {from} to {to} passes {at}, outside both endpoint sections (more than two sections crossed)")]
    TooManySections { from: Point, to: Point, at: Point },

    #[error("step from {from} to {to} re-enters its starting section at {at}")]
    NonContiguous { from: Point, to: Point, at: Point },

    #[error(transparent)]
    Track(#[from] crate::track::TrackError),
}

/// Coordinate axis a move travels along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Coordinate of `point` along this axis
    #[inline]
    pub fn of(self, point: Point) -> i32 {
        match self {
            Axis::X => point.x,
            Axis::Y => point.y,
        }
    }

    /// `point` with its coordinate along this axis replaced
    #[inline]
    pub fn with(self, point: Point, value: i32) -> Point {
        match self {
            Axis::X => Point::new(value, point.y),
            Axis::Y => Point::new(point.x, value),
        }
    }

    /// Reward component of `section` along this axis
    #[inline]
    pub fn reward(self, section: &Section) -> i32 {
        match self {
            Axis::X => section.reward.x,
            Axis::Y => section.reward.y,
        }
    }
}

/// Score change for moving from `prev` to `cur`
pub fn score_step(prev: Point, cur: Point, topology: &TrackTopology) -> Result<f64, StepError> {
    let dx = cur.x - prev.x;
    let dy = cur.y - prev.y;
    if dx != 0 && dy != 0 {
        return Err(StepError::Diagonal { from: prev, to: cur });
    }

    let prev_index = topology.locate_index(prev)?;
    let cur_index = topology.locate_index(cur)?;

    if prev_index == cur_index {
        let reward = topology.sections()[cur_index].reward;
        return Ok(f64::from(dx * reward.x + dy * reward.y));
    }

    let axis = if dx != 0 { Axis::X } else { Axis::Y };
    score_crossing(axis, prev, cur, prev_index, cur_index, topology)
}

/// First and last coordinate of a run of walked coordinates
#[derive(Debug, Clone, Copy)]
struct Run {
    first: i32,
    last: i32,
}

impl Run {
    fn extend(run: &mut Option<Run>, coord: i32) {
        match run {
            Some(existing) => existing.last = coord,
            None => *run = Some(Run { first: coord, last: coord }),
        }
    }

    fn span(run: Option<Run>) -> i32 {
        run.map_or(0, |r| r.last - r.first)
    }
}

/// Score a step that leaves `prev_index` for `cur_index` along `axis`
fn score_crossing(
    axis: Axis,
    prev: Point,
    cur: Point,
    prev_index: usize,
    cur_index: usize,
    topology: &TrackTopology,
) -> Result<f64, StepError> {
    let start = axis.of(prev);
    let end = axis.of(cur);
    let direction = (end - start).signum();

    let mut prev_run = None;
    let mut cur_run = None;
    let mut coord = start;

    loop {
        let at = axis.with(cur, coord);
        match topology.locate_index(at).ok() {
            Some(index) if index == prev_index => {
                if cur_run.is_some() {
                    return Err(StepError::NonContiguous { from: prev, to: cur, at });
                }
                Run::extend(&mut prev_run, coord);
            }
            Some(index) if index == cur_index => Run::extend(&mut cur_run, coord),
            _ => return Err(StepError::TooManySections { from: prev, to: cur, at }),
        }

        if coord == end {
            break;
        }
        coord += direction;
    }

    let sections = topology.sections();
    let delta = Run::span(prev_run) * axis.reward(&sections[prev_index])
        + Run::span(cur_run) * axis.reward(&sections[cur_index]);
    Ok(f64::from(delta))
}

//! Collision queries against the track boundary and the goal region.
//!
//! The simulation treats collision detection as an opaque predicate. The
//! default implementation derives both masks from geometry: the boundary is
//! everything outside the union of track sections, and the goal is a
//! rectangle.

use crate::track::{Point, Rect, TrackTopology};

/// Surface an agent can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Boundary,
    Goal,
}

/// Overlap test between the agent shape and a surface.
///
/// `position` is the top-left corner of the agent shape.
pub trait CollisionOracle {
    fn overlaps(&self, surface: Surface, position: Point) -> bool;
}

/// Oracle built from the track sections and a goal rectangle
#[derive(Debug, Clone)]
pub struct RegionOracle {
    sections: Vec<Rect>,
    goal: Rect,
    particle_size: i32,
}

impl RegionOracle {
    pub fn new(topology: &TrackTopology, goal: Rect, particle_size: i32) -> Self {
        Self {
            sections: topology.sections().iter().map(|s| s.bounds()).collect(),
            goal,
            particle_size,
        }
    }

    pub fn goal(&self) -> Rect {
        self.goal
    }

    /// Pixels of the agent shape at `position` that lie on the track
    fn covered_area(&self, shape: &Rect) -> i64 {
        // Sections are disjoint, so summing intersections never double counts
        self.sections.iter().map(|s| s.intersection_area(shape)).sum()
    }
}

impl CollisionOracle for RegionOracle {
    fn overlaps(&self, surface: Surface, position: Point) -> bool {
        let shape = Rect::square(position, self.particle_size);
        match surface {
            Surface::Boundary => self.covered_area(&shape) < shape.area(),
            Surface::Goal => shape.intersects(&self.goal),
        }
    }
}

//! Track topology module.
//!
//! A track is covered by axis-aligned rectangular sections, each rewarding
//! movement along one direction. Together they form a piecewise-constant
//! gradient field that the score engine integrates along each step.

mod file;
mod section;
mod topology;

pub use file::{format_sections, parse_sections};
pub use section::{Point, Rect, Reward, Section};
pub use topology::{TrackError, TrackTopology};

/// Sections of the bundled demo track: a straight run to the right, a climb
/// upwards, then a run back to the left towards the goal.
pub fn demo_sections() -> Vec<Section> {
    vec![
        Section::from_bounds(26, 479, 638, 569, Reward::new(1, 0)),
        Section::from_bounds(639, 105, 778, 569, Reward::new(0, -1)),
        Section::from_bounds(76, 18, 778, 104, Reward::new(-1, 0)),
    ]
}

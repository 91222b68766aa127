//! Geometry primitives for track sections.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer pixel coordinate, origin at the top-left of the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Point shifted by the given displacement
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle with inclusive bounds on every edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Square of side `size` whose top-left corner is `origin`
    pub fn square(origin: Point, size: i32) -> Self {
        Self::new(origin.x, origin.y, origin.x + size - 1, origin.y + size - 1)
    }

    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }

    /// True when the rectangles share at least one pixel
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.top <= other.bottom
            && other.top <= self.bottom
    }

    /// Number of pixels covered by both rectangles
    pub fn intersection_area(&self, other: &Rect) -> i64 {
        let width = self.right.min(other.right) - self.left.max(other.left) + 1;
        let height = self.bottom.min(other.bottom) - self.top.max(other.top) + 1;
        if width <= 0 || height <= 0 {
            0
        } else {
            i64::from(width) * i64::from(height)
        }
    }

    pub fn area(&self) -> i64 {
        (i64::from(self.right - self.left) + 1).max(0) * (i64::from(self.bottom - self.top) + 1).max(0)
    }
}

/// Direction of increasing score inside a section.
///
/// Each component is -1, 0 or 1: the score change for a one pixel increase of
/// that coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reward {
    pub x: i32,
    pub y: i32,
}

impl Reward {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Rectangular zone of the track with its own reward direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
    pub reward: Reward,
}

impl Section {
    pub fn new(
        top_left: Point,
        top_right: Point,
        bottom_left: Point,
        bottom_right: Point,
        reward: Reward,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
            reward,
        }
    }

    /// Build a section from inclusive bounds
    pub fn from_bounds(left: i32, top: i32, right: i32, bottom: i32, reward: Reward) -> Self {
        Self::new(
            Point::new(left, top),
            Point::new(right, top),
            Point::new(left, bottom),
            Point::new(right, bottom),
            reward,
        )
    }

    /// Bounding box taken from the top-left and bottom-right corners
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.top_left.x,
            self.top_left.y,
            self.top_right.x,
            self.bottom_left.y,
        )
    }

    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        self.bounds().contains(point)
    }

    /// Describe the first corner inconsistency, if any
    pub(crate) fn shape_defect(&self) -> Option<&'static str> {
        if self.top_left.y != self.top_right.y {
            return Some("top-left and top-right corners differ in y");
        }
        if self.bottom_left.y != self.bottom_right.y {
            return Some("bottom-left and bottom-right corners differ in y");
        }
        if self.top_left.x != self.bottom_left.x {
            return Some("top-left and bottom-left corners differ in x");
        }
        if self.top_right.x != self.bottom_right.x {
            return Some("top-right and bottom-right corners differ in x");
        }
        if self.top_left.x > self.top_right.x {
            return Some("left edge lies to the right of the right edge");
        }
        if self.top_left.y > self.bottom_left.y {
            return Some("top edge lies below the bottom edge");
        }
        None
    }
}

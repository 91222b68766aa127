//! Validated, immutable set of track sections with point lookup.

use super::file::parse_sections;
use super::section::{Point, Section};
use std::path::Path;
use thiserror::Error;

/// Structural problems with track section data. All of them are fatal.
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("failed to read section file: {0}")]
    Io(#[from] std::io::Error),

    #[error("section file line {line}: {reason} (found {content:?})")]
    Malformed {
        line: usize,
        content: String,
        reason: &'static str,
    },

    #[error("section file ends inside a section record ({fields} of 6 fields read)")]
    Incomplete { fields: usize },

    #[error("counted {headers} section headers but built {records} sections")]
    CountMismatch { headers: usize, records: usize },

    #[error("track has no sections")]
    Empty,

    #[error("section {index} is not rectangular: {reason}")]
    NotRectangular { index: usize, reason: &'static str },

    #[error("section {index} has reward component {value}; rewards must be -1, 0 or 1")]
    InvalidReward { index: usize, value: i32 },

    #[error("sections {first} and {second} overlap")]
    Overlap { first: usize, second: usize },

    #[error("no section contains point {0}; the track definition has a gap")]
    NoSection(Point),
}

/// Ordered collection of non-overlapping rectangular sections
#[derive(Debug, Clone)]
pub struct TrackTopology {
    sections: Vec<Section>,
}

impl TrackTopology {
    /// Validate sections and build the topology
    pub fn load(sections: Vec<Section>) -> Result<Self, TrackError> {
        if sections.is_empty() {
            return Err(TrackError::Empty);
        }

        for (index, section) in sections.iter().enumerate() {
            if let Some(reason) = section.shape_defect() {
                return Err(TrackError::NotRectangular { index, reason });
            }
            for value in [section.reward.x, section.reward.y] {
                if !(-1..=1).contains(&value) {
                    return Err(TrackError::InvalidReward { index, value });
                }
            }
        }

        for (first, a) in sections.iter().enumerate() {
            for (offset, b) in sections[first + 1..].iter().enumerate() {
                if a.bounds().intersects(&b.bounds()) {
                    return Err(TrackError::Overlap {
                        first,
                        second: first + 1 + offset,
                    });
                }
            }
        }

        Ok(Self { sections })
    }

    /// Read, parse and validate a section file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrackError> {
        let contents = std::fs::read_to_string(path)?;
        Self::load(parse_sections(&contents)?)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Index of the unique section containing `point`
    pub fn locate_index(&self, point: Point) -> Result<usize, TrackError> {
        self.sections
            .iter()
            .position(|section| section.contains(point))
            .ok_or(TrackError::NoSection(point))
    }

    /// The unique section containing `point`
    pub fn locate(&self, point: Point) -> Result<&Section, TrackError> {
        self.locate_index(point).map(|index| &self.sections[index])
    }
}

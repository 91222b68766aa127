//! Best-genome storage keyed by particle size and track.

use crate::agent::Genome;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

const MAGIC: &[u8; 4] = b"TBGN";

/// Errors that can occur while storing or loading genomes
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("no trained genome for particle size {particle_size} on track {track_id}; run training first")]
    NotTrained { particle_size: i32, track_id: String },
}

/// Lookup key for a stored genome
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenomeKey {
    pub particle_size: i32,
    pub track_id: String,
}

impl GenomeKey {
    pub fn new(particle_size: i32, track_id: impl Into<String>) -> Self {
        Self {
            particle_size,
            track_id: track_id.into(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("best_moves_particle_{}_track_{}.bin", self.particle_size, self.track_id)
    }
}

/// A persisted best genome with the result it achieved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGenome {
    /// Version for compatibility checking
    pub version: u32,
    pub particle_size: i32,
    pub track_id: String,
    pub score: f64,
    pub time: f64,
    pub moves: Genome,
}

impl StoredGenome {
    /// Current file format version
    pub const VERSION: u32 = 1;

    pub fn new(key: &GenomeKey, score: f64, time: f64, moves: Genome) -> Self {
        Self {
            version: Self::VERSION,
            particle_size: key.particle_size,
            track_id: key.track_id.clone(),
            score,
            time,
            moves,
        }
    }

    pub fn key(&self) -> GenomeKey {
        GenomeKey::new(self.particle_size, self.track_id.clone())
    }

    /// Write to a binary file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(MAGIC)?;
        let encoded = bincode::serialize(self)?;
        writer.write_all(&encoded)?;
        writer.flush()?;

        Ok(())
    }

    /// Read from a binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(StoreError::InvalidFormat("invalid magic bytes".to_string()));
        }

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let stored: StoredGenome = bincode::deserialize(&buffer)?;

        if stored.version != Self::VERSION {
            return Err(StoreError::VersionMismatch {
                expected: Self::VERSION,
                found: stored.version,
            });
        }

        Ok(stored)
    }
}

/// Directory of stored genomes, one file per key
#[derive(Debug, Clone)]
pub struct GenomeStore {
    base_dir: PathBuf,
}

impl GenomeStore {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn path_for(&self, key: &GenomeKey) -> PathBuf {
        self.base_dir.join(key.file_name())
    }

    pub fn contains(&self, key: &GenomeKey) -> bool {
        self.path_for(key).is_file()
    }

    /// Persist a genome, replacing any earlier one under the same key
    pub fn save(&self, genome: &StoredGenome) -> Result<PathBuf, StoreError> {
        std::fs::create_dir_all(&self.base_dir)?;
        let path = self.path_for(&genome.key());
        genome.save(&path)?;
        Ok(path)
    }

    /// Load the genome stored under `key`
    pub fn load(&self, key: &GenomeKey) -> Result<StoredGenome, StoreError> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(StoreError::NotTrained {
                particle_size: key.particle_size,
                track_id: key.track_id.clone(),
            });
        }
        StoredGenome::load(path)
    }
}

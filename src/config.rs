//! Configuration for training and replay runs.
//!
//! Supports YAML configuration files with sensible defaults. The defaults
//! describe the bundled demo track.

use crate::mutation::MappingFunction;
use crate::track::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub track: TrackConfig,
    pub evolution: EvolutionConfig,
    pub selection: SelectionConfig,
    pub mutation: MutationConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Track geometry and agent shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    /// Identifier used to key stored genomes
    pub id: String,
    /// Section file describing the reward zones
    pub sections_path: PathBuf,
    /// Side of the square agent shape in pixels
    pub particle_size: i32,
    /// Spawn position (top-left corner of the agent shape)
    pub start: Point,
    /// Goal region
    pub goal: Rect,
    pub arena_width: i32,
    pub arena_height: i32,
}

/// Generation loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    pub generations: usize,
    pub population_size: usize,
    /// Pixels travelled by one move
    pub movement_step: i32,
    /// Fixed seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Parent selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Size of the elite list
    pub elite_count: usize,
    /// Non-elite results sampled each generation
    pub random_count: usize,
    /// Share of lottery weight held by the sampled results (0-99)
    pub random_share_pct: u32,
}

/// Mutation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationConfig {
    /// Intensity multipliers in percent, one is drawn per child
    pub intensity_options: Vec<u32>,
    pub mapping: MappingFunction,
    #[serde(default)]
    pub adaptive: AdaptiveConfig,
}

/// Post-victory adaptive mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    pub enabled: bool,
    /// Chance (1-100) that a child gets its single mutation
    pub mutation_chance_pct: u32,
    /// Generations to wait after the first victory
    pub delay_generations: usize,
}

/// Tick loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Real-time tick pacing in ticks per second, 0 runs unpaced
    pub tick_rate: u32,
    /// Ticks per simulated second, used for elapsed times
    pub clock_rate: f64,
}

/// Best-genome storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub dir: PathBuf,
    /// Persist the best genome when training ends
    pub save_best: bool,
    /// Optional path for the per-generation stats history (JSON)
    #[serde(default)]
    pub stats_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Generations between progress lines
    pub stats_interval: usize,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            id: "0".to_string(),
            sections_path: PathBuf::from("tracks/track_0.section"),
            particle_size: 10,
            start: Point::new(34, 514),
            goal: Rect::new(76, 18, 95, 104),
            arena_width: 800,
            arena_height: 600,
        }
    }
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            generations: 1000,
            population_size: 100,
            movement_step: 15,
            seed: None,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            elite_count: 5,
            random_count: 3,
            random_share_pct: 10,
        }
    }
}

impl Default for MutationConfig {
    fn default() -> Self {
        let fine = (1..=10).map(|i| i * 10);
        let coarse = (2..=10).map(|i| i * 100);
        Self {
            intensity_options: fine.chain(coarse).collect(),
            mapping: MappingFunction::Exp,
            adaptive: AdaptiveConfig::default(),
        }
    }
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mutation_chance_pct: 100,
            delay_generations: 100,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate: 0,
            clock_rate: 60.0,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("genomes"),
            save_best: true,
            stats_path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval: 1,
        }
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let track = &self.track;
        if track.particle_size < 1 {
            return Err(invalid("particle_size must be > 0"));
        }
        if track.arena_width < track.particle_size || track.arena_height < track.particle_size {
            return Err(invalid("arena must be at least one particle wide and high"));
        }

        let evolution = &self.evolution;
        if evolution.generations == 0 {
            return Err(invalid("generations must be > 0"));
        }
        if evolution.population_size == 0 {
            return Err(invalid("population_size must be > 0"));
        }
        if evolution.movement_step < 1 {
            return Err(invalid("movement_step must be > 0"));
        }

        let selection = &self.selection;
        if selection.elite_count == 0 {
            return Err(invalid("elite_count must be > 0"));
        }
        if selection.elite_count + selection.random_count > evolution.population_size {
            return Err(invalid("elite_count + random_count cannot exceed population_size"));
        }
        if selection.random_share_pct >= 100 {
            return Err(invalid("random_share_pct must be below 100"));
        }
        if selection.random_share_pct > 0 && selection.random_count == 0 {
            return Err(invalid("random_share_pct needs random_count > 0"));
        }

        let mutation = &self.mutation;
        if mutation.intensity_options.is_empty() {
            return Err(invalid("intensity_options cannot be empty"));
        }
        if !(1..=100).contains(&mutation.adaptive.mutation_chance_pct) {
            return Err(invalid("adaptive mutation_chance_pct must be between 1 and 100"));
        }

        if !(self.simulation.clock_rate > 0.0) {
            return Err(invalid("clock_rate must be > 0"));
        }
        if self.logging.stats_interval == 0 {
            return Err(invalid("stats_interval must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_intensity_options() {
        let options = MutationConfig::default().intensity_options;
        assert_eq!(options.len(), 19);
        assert_eq!(options[0], 10);
        assert_eq!(options[9], 100);
        assert_eq!(options[10], 200);
        assert_eq!(*options.last().unwrap(), 1000);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let loaded: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config.track.start, loaded.track.start);
        assert_eq!(config.track.goal, loaded.track.goal);
        assert_eq!(config.mutation.mapping, loaded.mutation.mapping);
    }

    #[test]
    fn test_optional_sections_default() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let trimmed: String = yaml
            .split("simulation:")
            .next()
            .unwrap()
            .to_string();
        let loaded: Config = serde_yaml::from_str(&trimmed).unwrap();
        assert_eq!(loaded.simulation.tick_rate, 0);
        assert_eq!(loaded.logging.log_level, "info");
    }

    #[test]
    fn test_selection_must_fit_population() {
        let mut config = Config::default();
        config.evolution.population_size = 6;
        config.selection.elite_count = 5;
        config.selection.random_count = 3;

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_random_share_requires_sample() {
        let mut config = Config::default();
        config.selection.random_count = 0;
        assert!(config.validate().is_err());

        config.selection.random_share_pct = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.evolution.seed = Some(7);
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.evolution.seed, Some(7));
    }
}

//! Trailblazer - CLI Entry Point
//!
//! Trains and replays move sequences on section-scored tracks.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use trailblazer::track::{demo_sections, format_sections};
use trailblazer::{replay_stored, train, Config, RegionOracle, StopSignal, TrackTopology};

#[derive(Parser)]
#[command(name = "trailblazer")]
#[command(version)]
#[command(about = "Genetic search for agent trajectories on section-scored tracks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a default configuration and the demo track
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Validate the configured track section file
    CheckTrack {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,
    },

    /// Evolve a move sequence and store the best one
    Train {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of generations (overrides the config)
        #[arg(short, long)]
        generations: Option<usize>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Write the per-generation stats history to this JSON file
        #[arg(long)]
        stats: Option<PathBuf>,
    },

    /// Replay the stored best move sequence
    Replay {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }

        Commands::CheckTrack { config } => {
            let config = load_config(&config)?;
            init_logging(&config.logging.log_level);
            check_track(&config)
        }

        Commands::Train {
            config,
            generations,
            seed,
            stats,
        } => {
            let mut config = load_config(&config)?;
            init_logging(&config.logging.log_level);
            if let Some(generations) = generations {
                config.evolution.generations = generations;
            }
            if seed.is_some() {
                config.evolution.seed = seed;
            }
            if stats.is_some() {
                config.storage.stats_path = stats;
            }
            config.validate()?;
            run_training(&config)
        }

        Commands::Replay { config } => {
            let config = load_config(&config)?;
            init_logging(&config.logging.log_level);
            run_replay(&config)
        }
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        println!("Loading config from: {:?}", path);
        Ok(Config::from_file(path)?)
    } else {
        println!("Using default configuration");
        Ok(Config::default())
    }
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);

    let track_path = &config.track.sections_path;
    if track_path.exists() {
        println!("Track file already present: {:?}", track_path);
    } else {
        if let Some(parent) = track_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(track_path, format_sections(&demo_sections()))?;
        println!("Demo track saved to: {:?}", track_path);
    }
    Ok(())
}

fn check_track(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let topology = TrackTopology::from_file(&config.track.sections_path)?;
    println!("=== Track {} ===", config.track.id);
    println!("File: {:?}", config.track.sections_path);
    println!("Sections: {}", topology.len());
    for (index, section) in topology.sections().iter().enumerate() {
        println!(
            "  {}: {} .. {}  reward ({}, {})",
            index + 1,
            section.top_left,
            section.bottom_right,
            section.reward.x,
            section.reward.y
        );
    }

    let start = config.track.start;
    match topology.locate_index(start) {
        Ok(index) => println!("Start {} lies in section {}", start, index + 1),
        Err(e) => println!("Warning: {}", e),
    }
    Ok(())
}

fn run_training(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let topology = TrackTopology::from_file(&config.track.sections_path)?;
    let oracle = RegionOracle::new(&topology, config.track.goal, config.track.particle_size);

    println!("Starting training");
    println!("  Track: {} ({} sections)", config.track.id, topology.len());
    println!("  Population: {}", config.evolution.population_size);
    println!("  Generations: {}", config.evolution.generations);
    println!();

    let start = Instant::now();
    let outcome = train(config, &topology, &oracle, &StopSignal::new())?;
    let elapsed = start.elapsed();

    println!();
    println!("=== Training Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Seed: {}", outcome.seed);
    println!("Generations: {}", outcome.generations_run);
    if outcome.best.is_victory() {
        println!("Best: victory in {:.2}s ({} moves)", outcome.best.time, outcome.best.moves.len());
    } else {
        println!("Best score: {:.0}", outcome.best.score);
    }
    match outcome.first_victory {
        Some(generation) => println!("First victory: generation {}", generation),
        None => println!("First victory: none"),
    }
    if let Some(generation) = outcome.adaptive_from {
        println!("Adaptive mode from generation {}", generation);
    }
    if let Some(path) = &outcome.saved_to {
        println!("Best genome: {:?}", path);
    }
    if let Some(path) = &config.storage.stats_path {
        println!("Stats history: {:?}", path);
    }

    Ok(())
}

fn run_replay(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let topology = TrackTopology::from_file(&config.track.sections_path)?;
    let oracle = RegionOracle::new(&topology, config.track.goal, config.track.particle_size);

    let report = replay_stored(config, &topology, &oracle)?;

    println!("=== Replay ===");
    println!("Moves executed: {}", report.moves_executed);
    println!("Ticks: {}", report.ticks);
    if report.victory {
        println!("Victory in {:.2}s", report.elapsed);
    } else {
        println!("No victory; final score {:.0}, best {:.0}", report.score, report.best_score);
    }
    if let Some(last) = report.trail.last() {
        println!("Final position: {}", last);
    }

    Ok(())
}

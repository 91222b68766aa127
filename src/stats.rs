//! Per-generation statistics.

use crate::agent::PopulationResult;
use crate::selection::RankedResult;
use crate::simulation::HaltReason;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Statistics snapshot for one generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation index, starting at 0
    pub generation: usize,
    /// Number of agents simulated
    pub population: usize,
    /// Ticks the generation lasted
    pub ticks: usize,
    /// Why the tick loop ended
    pub halt: HaltReason,
    /// Best score of this generation alone
    pub generation_best: f64,
    /// Mean score across this generation
    pub mean_score: f64,
    /// Agents that reached the goal
    pub victories: usize,
    /// All-time best score after this generation
    pub best_score: f64,
    /// Time of the all-time best
    pub best_time: f64,
    /// Whether adaptive mode drove this generation
    pub adaptive: bool,
}

impl GenerationStats {
    /// Summarize a generation from its results and the all-time best
    pub fn from_results(
        generation: usize,
        results: &[PopulationResult],
        ticks: usize,
        halt: HaltReason,
        best: &RankedResult,
        adaptive: bool,
    ) -> Self {
        let population = results.len();
        let generation_best = results
            .iter()
            .map(|r| r.score)
            .fold(f64::NEG_INFINITY, f64::max);
        let mean_score = if population == 0 {
            0.0
        } else {
            results.iter().map(|r| r.score).sum::<f64>() / population as f64
        };

        Self {
            generation,
            population,
            ticks,
            halt,
            generation_best: if population == 0 { 0.0 } else { generation_best },
            mean_score,
            victories: results.iter().filter(|r| r.is_victory()).count(),
            best_score: best.score,
            best_time: best.time,
            adaptive,
        }
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        let best = if self.best_score.is_finite() {
            format!("{:.0}", self.best_score)
        } else {
            "-".to_string()
        };
        format!(
            "Gen:{:5} | Ticks:{:4} | GenBest:{:.0} | Mean:{:.1} | Wins:{:3} | Best:{} @ {:.2}s{}",
            self.generation,
            self.ticks,
            self.generation_best,
            self.mean_score,
            self.victories,
            best,
            self.best_time,
            if self.adaptive { " | adaptive" } else { "" },
        )
    }
}

/// Historical statistics tracker
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded snapshots
    pub snapshots: Vec<GenerationStats>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a snapshot
    pub fn record(&mut self, stats: GenerationStats) {
        self.snapshots.push(stats);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn last(&self) -> Option<&GenerationStats> {
        self.snapshots.last()
    }

    /// All-time best score over generations
    pub fn best_score_series(&self) -> Vec<(usize, f64)> {
        self.snapshots
            .iter()
            .map(|s| (s.generation, s.best_score))
            .collect()
    }

    /// Victories per generation
    pub fn victory_series(&self) -> Vec<(usize, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.generation, s.victories))
            .collect()
    }

    /// Generation of the first recorded victory
    pub fn first_victory(&self) -> Option<usize> {
        self.snapshots
            .iter()
            .find(|s| s.victories > 0)
            .map(|s| s.generation)
    }

    /// Save history to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load history from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Genome;
    use crate::score::VICTORY_SCORE;

    fn result(score: f64) -> PopulationResult {
        PopulationResult {
            moves: Genome::default(),
            score,
            elapsed: 1.0,
        }
    }

    fn best(score: f64) -> RankedResult {
        RankedResult {
            moves: Genome::default(),
            score,
            time: 2.5,
            source: None,
        }
    }

    #[test]
    fn test_stats_from_results() {
        let results = vec![result(10.0), result(30.0), result(VICTORY_SCORE)];
        let stats = GenerationStats::from_results(4, &results, 120, HaltReason::AllDead, &best(VICTORY_SCORE), true);

        assert_eq!(stats.population, 3);
        assert_eq!(stats.victories, 1);
        assert_eq!(stats.generation_best, VICTORY_SCORE);
        assert!(stats.summary().contains("adaptive"));
    }

    #[test]
    fn test_empty_generation() {
        let stats = GenerationStats::from_results(0, &[], 0, HaltReason::Cancelled, &RankedResult::placeholder(), false);

        assert_eq!(stats.mean_score, 0.0);
        assert_eq!(stats.generation_best, 0.0);
        assert!(stats.summary().contains("Best:-"));
    }

    #[test]
    fn test_stats_history() {
        let mut history = StatsHistory::new();

        for i in 0..5 {
            let score = if i >= 3 { VICTORY_SCORE } else { (i * 10) as f64 };
            let results = vec![result(score)];
            history.record(GenerationStats::from_results(i, &results, 10, HaltReason::AllDead, &best(score), false));
        }

        let series = history.best_score_series();
        assert_eq!(series.len(), 5);
        assert_eq!(series[1], (1, 10.0));
        assert_eq!(history.first_victory(), Some(3));
        assert_eq!(history.victory_series()[4], (4, 1));
    }

    #[test]
    fn test_history_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        let mut history = StatsHistory::new();
        history.record(GenerationStats::from_results(0, &[result(5.0)], 3, HaltReason::OutOfBounds, &best(5.0), false));
        history.save(&path).unwrap();

        let loaded = StatsHistory::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.snapshots[0].halt, HaltReason::OutOfBounds);
    }
}

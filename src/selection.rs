//! Population ranking and weighted parent selection.
//!
//! Each generation the results are ranked into a bounded elite list, the
//! all-time best is merged in, a few non-elite results are sampled for
//! diversity, and the union becomes a weighted lottery that picks the parent
//! of every agent in the next generation.

use crate::agent::{Genome, PopulationResult};
use crate::config::SelectionConfig;
use crate::score::VICTORY_SCORE;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A scored genome competing for a place in the elite list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    pub moves: Genome,
    pub score: f64,
    pub time: f64,
    /// Index into the generation results, `None` for carried-over entries
    pub source: Option<usize>,
}

impl RankedResult {
    /// Empty slot that loses against every real result
    pub fn placeholder() -> Self {
        Self {
            moves: Genome::default(),
            score: f64::NEG_INFINITY,
            time: f64::INFINITY,
            source: None,
        }
    }

    pub fn from_result(index: usize, result: &PopulationResult) -> Self {
        Self {
            moves: result.moves.clone(),
            score: result.score,
            time: result.elapsed,
            source: Some(index),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.score == f64::NEG_INFINITY
    }

    pub fn is_victory(&self) -> bool {
        self.score >= VICTORY_SCORE
    }

    /// Higher score wins; equal scores are decided by the shorter time
    pub fn beats(&self, other: &RankedResult) -> bool {
        self.score > other.score || (self.score == other.score && self.time < other.time)
    }

    /// Ordering with the better result first
    pub fn rank_cmp(&self, other: &RankedResult) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.time.total_cmp(&other.time))
    }
}

/// Best `k` results ordered by descending score, then ascending time.
///
/// Slots not filled by `results` hold placeholders.
pub fn rank_top_k(results: &[PopulationResult], k: usize) -> Vec<RankedResult> {
    let mut top = vec![RankedResult::placeholder(); k];
    for (index, result) in results.iter().enumerate() {
        let candidate = RankedResult::from_result(index, result);
        if let Some(slot) = top.iter().position(|held| candidate.beats(held)) {
            top.insert(slot, candidate);
            top.truncate(k);
        }
    }
    top
}

/// Put the all-time best in front of `top` if it beats the current leader
pub fn merge_incumbent(mut top: Vec<RankedResult>, incumbent: &RankedResult) -> Vec<RankedResult> {
    let k = top.len();
    let wins = top.first().map_or(false, |leader| incumbent.beats(leader));
    if wins {
        top.insert(0, incumbent.clone());
        top.truncate(k);
    }
    top
}

/// Draw up to `m` results outside `top` without replacement, in result order
pub fn sample_random<R: Rng + ?Sized>(
    results: &[PopulationResult],
    top: &[RankedResult],
    m: usize,
    rng: &mut R,
) -> Vec<RankedResult> {
    let pool: Vec<usize> = (0..results.len())
        .filter(|index| !top.iter().any(|r| r.source == Some(*index)))
        .collect();

    let mut picked: Vec<usize> = pool.choose_multiple(rng, m).copied().collect();
    picked.sort_unstable();
    picked
        .into_iter()
        .map(|index| RankedResult::from_result(index, &results[index]))
        .collect()
}

/// Lottery ticket holder
#[derive(Debug, Clone, PartialEq)]
pub struct LotteryEntry {
    pub moves: Genome,
    pub score: f64,
    pub time: f64,
    pub weight: u64,
    pub cumulative: u64,
}

/// Cumulative-weight lottery over elite and sampled genomes
#[derive(Debug, Clone, Default)]
pub struct Lottery {
    entries: Vec<LotteryEntry>,
    total: u64,
}

impl Lottery {
    fn push(&mut self, result: &RankedResult, weight: u64) {
        self.total += weight;
        self.entries.push(LotteryEntry {
            moves: result.moves.clone(),
            score: result.score,
            time: result.time,
            weight,
            cumulative: self.total,
        });
    }

    pub fn entries(&self) -> &[LotteryEntry] {
        &self.entries
    }

    pub fn total_weight(&self) -> u64 {
        self.total
    }

    pub fn genome(&self, index: usize) -> &Genome {
        &self.entries[index].moves
    }

    /// Index of the entry holding a uniformly drawn ticket
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.total == 0 {
            return None;
        }
        let ticket = rng.gen_range(1..=self.total);
        Some(self.entries.partition_point(|e| e.cumulative < ticket))
    }

    /// `n` independent draws, with replacement
    pub fn draw_parents<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<usize> {
        (0..n).filter_map(|_| self.draw(rng)).collect()
    }
}

/// Build the lottery so that sampled entries together hold
/// `random_share_pct` percent of the weight.
///
/// Elite `i` (0 from the best) is weighted by `k - i`. Placeholders are left
/// out. Exact integer weights are used for the split: elites are scaled by
/// `(100 - pct) * m` and each sampled entry gets `pct * k(k+1)/2`.
pub fn build_lottery(top: &[RankedResult], sample: &[RankedResult], random_share_pct: u32) -> Lottery {
    let elites: Vec<&RankedResult> = top.iter().filter(|r| !r.is_placeholder()).collect();
    let k = elites.len() as u64;
    let m = sample.len() as u64;
    let pct = u64::from(random_share_pct.min(99));

    let (elite_scale, random_weight) = if m == 0 || pct == 0 {
        (1, 0)
    } else {
        let rank_sum = k * (k + 1) / 2;
        ((100 - pct) * m, rank_sum * pct)
    };

    let mut lottery = Lottery::default();
    for (i, elite) in elites.iter().enumerate() {
        lottery.push(elite, (k - i as u64) * elite_scale);
    }
    for picked in sample {
        lottery.push(picked, random_weight);
    }
    lottery
}

/// Outcome of one selection round
#[derive(Debug, Clone)]
pub struct Selection {
    pub top: Vec<RankedResult>,
    pub sample: Vec<RankedResult>,
    pub lottery: Lottery,
}

impl Selection {
    /// Best entry of the round, if any result was ranked
    pub fn best(&self) -> Option<&RankedResult> {
        self.top.first().filter(|r| !r.is_placeholder())
    }
}

/// Selection parameters bundled with the ranking pipeline
#[derive(Debug, Clone)]
pub struct PopulationSelector {
    elite_count: usize,
    random_count: usize,
    random_share_pct: u32,
}

impl PopulationSelector {
    pub fn from_config(config: &SelectionConfig) -> Self {
        Self {
            elite_count: config.elite_count,
            random_count: config.random_count,
            random_share_pct: config.random_share_pct,
        }
    }

    /// Rank, sample, merge the incumbent and build the lottery
    pub fn select<R: Rng + ?Sized>(
        &self,
        results: &[PopulationResult],
        incumbent: &RankedResult,
        rng: &mut R,
    ) -> Selection {
        let top = rank_top_k(results, self.elite_count);
        let sample = sample_random(results, &top, self.random_count, rng);
        let top = merge_incumbent(top, incumbent);
        let lottery = build_lottery(&top, &sample, self.random_share_pct);

        log::debug!(
            "Selection: {} elites, {} sampled, total weight {}",
            top.iter().filter(|r| !r.is_placeholder()).count(),
            sample.len(),
            lottery.total_weight()
        );

        Selection { top, sample, lottery }
    }
}

//! Performance benchmarks for Trailblazer

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use trailblazer::agent::PopulationResult;
use trailblazer::mutation::{MutationEngine, MutationMode};
use trailblazer::selection::{PopulationSelector, RankedResult};
use trailblazer::simulation::Exploration;
use trailblazer::store::{GenomeKey, StoredGenome};
use trailblazer::track::demo_sections;
use trailblazer::{
    score_step, Config, EvolutionEngine, Genome, Move, Point, RegionOracle, Simulation, StopSignal, TrackTopology,
};

fn demo_setup() -> (Config, TrackTopology) {
    (Config::default(), TrackTopology::load(demo_sections()).unwrap())
}

fn benchmark_score_step(c: &mut Criterion) {
    let (_, topology) = demo_setup();

    c.bench_function("score_step_same_section", |b| {
        b.iter(|| score_step(black_box(Point::new(300, 500)), black_box(Point::new(315, 500)), &topology))
    });

    c.bench_function("score_step_crossing", |b| {
        b.iter(|| score_step(black_box(Point::new(634, 514)), black_box(Point::new(649, 514)), &topology))
    });
}

fn benchmark_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_generation");
    let (config, topology) = demo_setup();
    let oracle = RegionOracle::new(&topology, config.track.goal, config.track.particle_size);
    let simulation = Simulation::new(&topology, &oracle, &config);

    for population in [50, 100, 200].iter() {
        group.bench_with_input(BenchmarkId::new("population", population), population, |b, &n| {
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            b.iter(|| {
                simulation
                    .run_generation(vec![Genome::default(); n], Exploration::Random, &mut rng, &StopSignal::new())
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn benchmark_evolution_step(c: &mut Criterion) {
    let (config, topology) = demo_setup();
    let oracle = RegionOracle::new(&topology, config.track.goal, config.track.particle_size);
    let mut engine = EvolutionEngine::new_with_seed(&topology, &oracle, &config, 42);
    let stop = StopSignal::new();

    // Warm up so parents carry real genomes
    for _ in 0..5 {
        engine.step(&stop).unwrap();
    }

    c.bench_function("evolution_step", |b| b.iter(|| engine.step(&stop).unwrap()));
}

fn benchmark_mutation(c: &mut Criterion) {
    let config = Config::default();
    let engine = MutationEngine::from_config(&config.mutation);
    let parent: Genome = (0..200).map(|i| Move::ALL[i % 4]).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    c.bench_function("mutate_position_weighted", |b| {
        b.iter(|| engine.mutate(black_box(&parent), MutationMode::PositionWeighted, &mut rng))
    });

    c.bench_function("mutate_adaptive", |b| {
        b.iter(|| engine.mutate(black_box(&parent), MutationMode::Adaptive, &mut rng))
    });
}

fn benchmark_selection(c: &mut Criterion) {
    let config = Config::default();
    let selector = PopulationSelector::from_config(&config.selection);
    let results: Vec<PopulationResult> = (0..100)
        .map(|i| PopulationResult {
            moves: vec![Move::Right; i % 40].into(),
            score: (i * 37 % 101) as f64,
            elapsed: (i % 13) as f64 / 10.0,
        })
        .collect();
    let incumbent = RankedResult::placeholder();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    c.bench_function("select_and_draw", |b| {
        b.iter(|| {
            let selection = selector.select(black_box(&results), &incumbent, &mut rng);
            selection.lottery.draw_parents(100, &mut rng)
        })
    });
}

fn benchmark_serialization(c: &mut Criterion) {
    let key = GenomeKey::new(10, "0");
    let moves: Genome = (0..500).map(|i| Move::ALL[i % 4]).collect();
    let stored = StoredGenome::new(&key, 1e9, 12.5, moves);

    c.bench_function("stored_genome_serialize", |b| b.iter(|| bincode::serialize(black_box(&stored)).unwrap()));
}

criterion_group!(
    benches,
    benchmark_score_step,
    benchmark_generation,
    benchmark_evolution_step,
    benchmark_mutation,
    benchmark_selection,
    benchmark_serialization,
);
criterion_main!(benches);

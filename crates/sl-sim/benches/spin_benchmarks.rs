//! Spin and Simulation Benchmarks
//!
//! Single spins, chained sessions and parallel batches on the sample game.

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sl_engine::{GameConfig, GameDefinition, SessionOptions, SlotEngine};
use sl_sim::{SimulationConfig, Simulator};

const SAMPLE_GAME: &str = include_str!("../../../configs/sample_game.json");

fn sample_game() -> Arc<GameDefinition> {
    let config = GameConfig::from_json(SAMPLE_GAME).expect("sample config parses");
    Arc::new(config.build().expect("sample config is valid"))
}

/// Benchmark engine spins and sessions
fn bench_engine(c: &mut Criterion) {
    let game = sample_game();
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(1));

    let mut engine = SlotEngine::with_rng(Arc::clone(&game), ChaCha8Rng::seed_from_u64(1));
    group.bench_function("spin", |b| {
        b.iter(|| {
            let outcome = engine.spin(black_box(1.0));
            engine.reset();
            black_box(outcome)
        })
    });

    let mut engine = SlotEngine::with_rng(Arc::clone(&game), ChaCha8Rng::seed_from_u64(2));
    group.bench_function("session", |b| {
        b.iter(|| black_box(engine.play_session(1.0, SessionOptions::default())))
    });

    let mut engine = SlotEngine::with_rng(game, ChaCha8Rng::seed_from_u64(3));
    group.bench_function("session_recorded", |b| {
        b.iter(|| black_box(engine.play_session(1.0, SessionOptions::recorded())))
    });

    group.finish();
}

/// Benchmark parallel batches
fn bench_simulation(c: &mut Criterion) {
    let game = sample_game();
    let mut group = c.benchmark_group("simulation");
    group.sample_size(10);

    for &trials in &[10_000u64, 100_000] {
        group.throughput(Throughput::Elements(trials));
        group.bench_with_input(BenchmarkId::new("run", trials), &trials, |b, &trials| {
            let config = SimulationConfig::default().with_trials(trials).with_seed(7);
            b.iter(|| {
                let summary = Simulator::new(Arc::clone(&game), config)
                    .run(None)
                    .expect("simulation runs");
                black_box(summary.report)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_engine, bench_simulation);
criterion_main!(benches);

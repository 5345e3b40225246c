use ca_formats::rle::Rle;
use criterion::{criterion_group, criterion_main, Criterion};
use hashlife_universe::Universe;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

const R_PENTOMINO: &str = "x = 3, y = 3, rule = B3/S23\nb2o$2o$bo!";
const ACORN: &str = "x = 7, y = 3, rule = B3/S23\nbo5b$3bo3b$2o2b3o!";

fn run_pattern(pattern: &str, rule_string: &str, step_log2: u8, steps: u32) -> u64 {
    let cells: Vec<_> = Rle::new(pattern)
        .unwrap()
        .map(|cell| cell.unwrap().position)
        .collect();
    let mut universe = Universe::new(rule_string.parse().unwrap());
    universe.load_pattern(&cells).set_step(step_log2);
    for _ in 0..steps {
        universe.step();
    }
    universe.population()
}

fn run_soup(seed: u64, step_log2: u8, steps: u32) -> u64 {
    let mut universe = Universe::default();
    universe
        .seed_random(64, 64, 1024, &mut ChaCha8Rng::seed_from_u64(seed))
        .set_step(step_log2);
    for _ in 0..steps {
        universe.step();
    }
    universe.population()
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("All tests");
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(20));

    group
        .bench_function("r-pentomino", |b| {
            b.iter(|| run_pattern(R_PENTOMINO, "B3/S23", 10, 16))
        })
        .bench_function("acorn", |b| b.iter(|| run_pattern(ACORN, "B3/S23", 12, 8)))
        .bench_function("acorn-highlife", |b| {
            b.iter(|| run_pattern(ACORN, "B36/S23", 8, 8))
        })
        .bench_function("soup-single-generations", |b| {
            b.iter(|| run_soup(42, 0, 256))
        })
        .bench_function("soup", |b| b.iter(|| run_soup(42, 10, 4)));

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

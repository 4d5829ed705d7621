use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use netstate::{fit_ising, Algorithm, CodeMatrix, IsingConfig, IsingTargets};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Codes of `n` neurons sharing a common drive, so every pair is correlated.
fn correlated_codes(n: usize, nbins: usize) -> CodeMatrix {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
    let drive: Vec<bool> = (0..nbins).map(|_| rng.random_bool(0.2)).collect();
    let rows = (0..n)
        .map(|_| {
            drive
                .iter()
                .map(|&d| u8::from(rng.random_bool(if d { 0.6 } else { 0.05 })))
                .collect()
        })
        .collect();
    CodeMatrix::from_rows((0..n as u32).collect(), (0..nbins as i64).collect(), rows)
        .expect("rows match bins")
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_ising");
    group.sample_size(10);
    for n in [4, 6, 8, 10] {
        let targets = IsingTargets::from_codes(&correlated_codes(n, 5_000), None)
            .expect("valid moments");
        for algorithm in [Algorithm::ConjugateGradient, Algorithm::LBfgs] {
            let config = IsingConfig {
                algorithm,
                ..IsingConfig::default()
            };
            group.bench_with_input(BenchmarkId::new(algorithm.to_string(), n), &targets, |b, t| {
                b.iter(|| black_box(fit_ising(t, &config).map(|fit| fit.log_z)));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_fit);
criterion_main!(benches);

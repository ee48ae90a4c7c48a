use std::hint::black_box;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use frontier_mc::portfolio::MomentEstimate;
use frontier_mc::portfolio::MonteCarloSampler;
use frontier_mc::portfolio::WeightScheme;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn moments(n: usize) -> MomentEstimate {
  let mu = (0..n).map(|i| 0.04 + 0.01 * i as f64).collect();
  let cov = (0..n)
    .map(|i| {
      (0..n)
        .map(|j| if i == j { 0.04 + 0.005 * i as f64 } else { 0.006 })
        .collect()
    })
    .collect();
  MomentEstimate { mu, cov }
}

fn bench_trials(c: &mut Criterion) {
  let mut group = c.benchmark_group("Sampler");
  let m = moments(10);

  for trials in [1_000usize, 5_000, 20_000] {
    group.bench_with_input(BenchmarkId::new("parallel", trials), &trials, |b, &trials| {
      let sampler = MonteCarloSampler::new(trials, WeightScheme::Uniform, Some(1), None);
      b.iter(|| black_box(sampler.run(&m, 0.0435).unwrap()));
    });

    group.bench_with_input(BenchmarkId::new("sequential", trials), &trials, |b, &trials| {
      let sampler = MonteCarloSampler::new(trials, WeightScheme::Uniform, None, None);
      b.iter(|| {
        let mut rng = StdRng::seed_from_u64(1);
        black_box(sampler.run_with_rng(&mut rng, &m, 0.0435).unwrap())
      });
    });
  }

  group.finish();
}

fn bench_schemes(c: &mut Criterion) {
  let mut group = c.benchmark_group("WeightScheme");
  let m = moments(20);

  for scheme in [WeightScheme::Uniform, WeightScheme::FlatDirichlet] {
    group.bench_function(format!("{scheme:?}"), |b| {
      let sampler = MonteCarloSampler::new(5_000, scheme, Some(7), None);
      b.iter(|| black_box(sampler.run(&m, 0.0435).unwrap()));
    });
  }

  group.finish();
}

criterion_group!(benches, bench_trials, bench_schemes);
criterion_main!(benches);

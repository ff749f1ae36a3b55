use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use smolprng::{JsfLarge, PRNG};

use bipartite_annealer::{Annealer, BipartiteQubo, BipartiteSolver, BruteForceSearcher};

fn make_problem(num_x0: usize, num_x1: usize) -> Arc<BipartiteQubo<f64>> {
    let mut prng = PRNG {
        generator: JsfLarge::from(1234u64),
    };
    Arc::new(BipartiteQubo::make_random(num_x0, num_x1, &mut prng))
}

fn bench_anneal_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("anneal_one_step");
    for (n0, n1) in [(64usize, 64usize), (256, 128), (512, 512)] {
        for algorithm in ["naive", "coloring"] {
            let mut annealer = Annealer::<f64>::new();
            annealer.set_problem(make_problem(n0, n1));
            annealer.set_preference("n_trotters", "16").expect("valid preference");
            annealer.set_preference("algorithm", algorithm).expect("valid preference");
            annealer.seed(7);
            annealer.prepare().expect("problem is set");

            group.bench_function(BenchmarkId::new(algorithm, format!("{n0}x{n1}")), |b| {
                b.iter(|| annealer.anneal_one_step(0.5, 10.0).expect("annealer is prepared"));
            });
        }
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("brute_force_search");
    group.sample_size(10);
    for (n0, n1) in [(8usize, 8usize), (12, 10)] {
        let problem = make_problem(n0, n1);
        group.bench_function(BenchmarkId::from_parameter(format!("{n0}x{n1}")), |b| {
            b.iter(|| {
                let mut searcher = BruteForceSearcher::<f64>::new();
                searcher.set_problem(problem.clone());
                searcher.search().expect("problem fits");
                searcher.best().map(|s| s.energy)
            });
        });
    }
    group.finish();
}

criterion_group!(solver_benches, bench_anneal_step, bench_search);
criterion_main!(solver_benches);

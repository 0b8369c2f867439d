// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;
use waypoint_model::matrix::{DistanceMatrix, DistanceMatrixBuilder};
use waypoint_solver::solver::{Solver, SolverBuilder};

fn random_instance(order: usize, seed: u64) -> DistanceMatrix<i64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut builder = DistanceMatrixBuilder::new(order);
    for i in 0..order {
        for j in (i + 1)..order {
            builder.set_distance(i, j, rng.random_range(1..1000));
        }
    }
    builder.build().expect("random instance is a valid matrix")
}

fn solver(workers: usize) -> Solver<i64> {
    SolverBuilder::new()
        .with_num_workers(workers)
        .build()
        .expect("valid configuration")
}

fn bench_random_instances(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve_benchmark");
    group.sample_size(10);

    for order in [8usize, 10, 12] {
        let matrix = random_instance(order, order as u64);
        for workers in [1usize, 2, 4] {
            let solver = solver(workers);
            group.bench_with_input(
                BenchmarkId::new(format!("n{}", order), workers),
                &matrix,
                |b, matrix| {
                    b.iter(|| {
                        let outcome = solver
                            .solve(black_box(matrix))
                            .expect("search succeeds");
                        black_box(outcome.cost())
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_random_instances);
criterion_main!(benches);

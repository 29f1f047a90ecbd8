//! Benchmarks for catalog reconciliation
//!
//! Run with: cargo bench --package reconcile
//!
//! Catalog sizes follow the mflix sample (~23k documents) against the Neo4j
//! movie graph, scaled up to show the linear behaviour.

use catalog::MovieRecord;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use reconcile::{reconcile_with, CaseInsensitiveTitle, ExactTitle};

fn build_catalog(size: usize, offset: usize) -> Vec<MovieRecord> {
    (0..size)
        .map(|i| MovieRecord::new(format!("Movie {}", i + offset)).with_field("year", 1950 + (i % 70) as i64))
        .collect()
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for size in [1_000usize, 10_000, 25_000] {
        // Half of the graph catalog overlaps with the document catalog
        let mongo = build_catalog(size, 0);
        let graph = build_catalog(size, size / 2);

        group.bench_with_input(BenchmarkId::new("exact", size), &size, |b, _| {
            b.iter(|| black_box(reconcile_with(&ExactTitle, black_box(&mongo), black_box(&graph))))
        });
        group.bench_with_input(BenchmarkId::new("case_insensitive", size), &size, |b, _| {
            b.iter(|| {
                black_box(reconcile_with(
                    &CaseInsensitiveTitle,
                    black_box(&mongo),
                    black_box(&graph),
                ))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reconcile);
criterion_main!(benches);

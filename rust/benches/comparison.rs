use bplus_index::BPlusTree;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeSet;

const SIZE: i32 = 10_000;

fn shuffled_values() -> Vec<i32> {
    let mut values: Vec<i32> = (0..SIZE).collect();
    values.shuffle(&mut StdRng::seed_from_u64(1));
    values
}

fn insertion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    let values = shuffled_values();

    for fanout in [4, 16, 64] {
        group.bench_with_input(BenchmarkId::new("our_tree", fanout), &fanout, |b, &fanout| {
            b.iter(|| {
                let mut tree = BPlusTree::with_fanout(fanout).unwrap();
                for value in &values {
                    tree.insert(*value);
                }
                black_box(tree.len())
            })
        });
    }

    group.bench_function("std_btreeset", |b| {
        b.iter(|| {
            let mut set = BTreeSet::new();
            for value in &values {
                set.insert(*value);
            }
            black_box(set.len())
        })
    });

    group.finish();
}

fn lookup_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let values = shuffled_values();

    let our_tree: BPlusTree<i32> = values.iter().copied().collect();
    let std_set: BTreeSet<i32> = values.iter().copied().collect();

    group.bench_function("our_tree", |b| {
        b.iter(|| {
            for value in values.iter().step_by(7) {
                black_box(our_tree.search(value));
            }
        })
    });

    group.bench_function("std_btreeset", |b| {
        b.iter(|| {
            for value in values.iter().step_by(7) {
                black_box(std_set.contains(value));
            }
        })
    });

    group.finish();
}

fn deletion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete");
    let values = shuffled_values();

    group.bench_function("our_tree", |b| {
        b.iter_batched(
            || values.iter().copied().collect::<BPlusTree<i32>>(),
            |mut tree| {
                for value in &values {
                    tree.delete(value);
                }
                black_box(tree.is_empty())
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.bench_function("std_btreeset", |b| {
        b.iter_batched(
            || values.iter().copied().collect::<BTreeSet<i32>>(),
            |mut set| {
                for value in &values {
                    set.remove(value);
                }
                black_box(set.is_empty())
            },
            criterion::BatchSize::LargeInput,
        )
    });

    group.finish();
}

fn range_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("range");
    let our_tree: BPlusTree<i32> = (0..SIZE).collect();
    let std_set: BTreeSet<i32> = (0..SIZE).collect();

    group.bench_function("our_tree_large_range", |b| {
        b.iter(|| {
            let items: Vec<_> = our_tree.range(black_box(2000)..black_box(8000)).collect();
            black_box(items);
        })
    });

    group.bench_function("std_tree_large_range", |b| {
        b.iter(|| {
            let items: Vec<_> = std_set.range(black_box(2000)..black_box(8000)).collect();
            black_box(items);
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    insertion_benchmark,
    lookup_benchmark,
    deletion_benchmark,
    range_benchmark
);
criterion_main!(benches);

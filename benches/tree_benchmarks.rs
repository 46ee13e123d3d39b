mod utils;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dtree::{DecisionTree, TreeConfig};
use std::time::Duration;
use utils::create_observations;

pub fn tree_benchmarks(c: &mut Criterion) {
    let train = create_observations(2_000, 8, 1903);
    let validation = create_observations(500, 8, 1904);
    let config = TreeConfig::default();

    let mut group = c.benchmark_group("tree_benchmarks");
    group.warm_up_time(Duration::from_secs(2));
    group.sample_size(20);

    group.bench_function("fit", |b| {
        b.iter(|| DecisionTree::fit(black_box(&train), black_box(&config)).unwrap())
    });
    group.bench_function("train_and_prune", |b| {
        b.iter(|| DecisionTree::train(black_box(&train), black_box(Some(validation.as_slice())), black_box(&config)).unwrap())
    });

    let tree = DecisionTree::fit(&train, &config).unwrap();
    group.bench_function("predict", |b| b.iter(|| tree.predict_all(black_box(&validation)).unwrap()));

    let text = tree.dump();
    group.bench_function("dump", |b| b.iter(|| black_box(&tree).dump()));
    group.bench_function("from_dump", |b| {
        b.iter(|| DecisionTree::from_dump(black_box(&text)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, tree_benchmarks);
criterion_main!(benches);

//! Benchmark exact TreeSHAP against permutation sampling
//!
//! Run with: cargo bench --bench explain_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use rand::SeedableRng;

use credrisk::pipeline::models::{
    BoostedTrees, BoostingParams, ForestParams, LogisticParams, LogisticRegression, RandomForest,
};
use credrisk::pipeline::{ClassifierModel, Explainer, Matrix, SamplingExplainer, TreeExplainer};

fn generate_training_matrix(n_rows: usize, n_features: usize, seed: u64) -> (Matrix, Vec<u8>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut matrix = Matrix::zeros(0, n_features);
    let mut labels = Vec::with_capacity(n_rows);

    for _ in 0..n_rows {
        let row: Vec<f64> = (0..n_features).map(|_| rng.gen::<f64>()).collect();
        let logit = 3.0 * row[0] - 2.0 * row[1] + row[2] - 1.0;
        labels.push(u8::from(rng.gen::<f64>() < 1.0 / (1.0 + (-logit).exp())));
        matrix.push_row(&row);
    }

    (matrix, labels)
}

fn bench_tree_explainers(c: &mut Criterion) {
    let (matrix, labels) = generate_training_matrix(2_000, 26, 42);
    let instance = matrix.row(0).to_vec();

    let mut group = c.benchmark_group("tree_shap");
    group.sample_size(20);

    for n_trees in [10, 50, 100] {
        let forest = RandomForest::fit(
            &matrix,
            &labels,
            &ForestParams {
                n_trees,
                ..ForestParams::default()
            },
            42,
        )
        .unwrap();
        let explainer = TreeExplainer::for_forest(&forest);
        group.bench_with_input(BenchmarkId::new("random_forest", n_trees), &n_trees, |b, _| {
            b.iter(|| explainer.contributions(black_box(&instance)))
        });

        let boosted = BoostedTrees::fit(
            &matrix,
            &labels,
            &BoostingParams {
                n_rounds: n_trees,
                ..BoostingParams::default()
            },
            42,
        )
        .unwrap();
        let explainer = TreeExplainer::for_boosted(&boosted);
        group.bench_with_input(BenchmarkId::new("xgboost", n_trees), &n_trees, |b, _| {
            b.iter(|| explainer.contributions(black_box(&instance)))
        });
    }

    group.finish();
}

fn bench_sampling_explainer(c: &mut Criterion) {
    let (matrix, labels) = generate_training_matrix(2_000, 26, 7);
    let instance = matrix.row(0).to_vec();
    let model = ClassifierModel::Logistic(
        LogisticRegression::fit(&matrix, &labels, &LogisticParams::default()).unwrap(),
    );

    let mut group = c.benchmark_group("permutation_sampling");
    group.sample_size(10);

    for background_rows in [10, 50, 100] {
        let background = matrix.select_rows(&(0..background_rows).collect::<Vec<_>>());
        let explainer = SamplingExplainer::new(&model, &background, 7);
        group.bench_with_input(
            BenchmarkId::from_parameter(background_rows),
            &background_rows,
            |b, _| b.iter(|| explainer.contributions(black_box(&instance))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_tree_explainers, bench_sampling_explainer);
criterion_main!(benches);

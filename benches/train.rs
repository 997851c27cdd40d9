use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use aqrisk::ml::softmax::{TrainDataset, TrainOptions, softmax_gradient, train_softmax};

const SAMPLE_COUNT: usize = 500;
const FEATURES: usize = 11;

fn synthetic_dataset() -> TrainDataset {
    let mut x = Vec::with_capacity(SAMPLE_COUNT);
    let mut y = Vec::with_capacity(SAMPLE_COUNT);
    for i in 0..SAMPLE_COUNT {
        let mut row = Vec::with_capacity(FEATURES);
        for j in 0..FEATURES {
            row.push((((i * 31 + j * 17) % 97) as f64) / 97.0 - 0.5);
        }
        let label = i % 3;
        row[0] += label as f64;
        x.push(row);
        y.push(label);
    }
    TrainDataset {
        feature_names: (0..FEATURES).map(|i| format!("f{i}")).collect(),
        classes: vec!["low".to_string(), "moderate".to_string(), "high".to_string()],
        x,
        y,
    }
}

fn bench_gradient(c: &mut Criterion) {
    let dataset = synthetic_dataset();
    let weights = vec![0.01f64; 3 * FEATURES];
    let bias = vec![0.0f64; 3];
    c.bench_with_input(
        BenchmarkId::new("softmax_gradient", SAMPLE_COUNT),
        &dataset,
        |b, dataset| {
            b.iter(|| {
                softmax_gradient(
                    black_box(&dataset.x),
                    black_box(&dataset.y),
                    black_box(&weights),
                    black_box(&bias),
                )
            });
        },
    );
}

fn bench_short_training(c: &mut Criterion) {
    let dataset = synthetic_dataset();
    let options = TrainOptions {
        iterations: 50,
        log_every: 0,
        ..TrainOptions::default()
    };
    c.bench_with_input(
        BenchmarkId::new("train_softmax_50_iters", SAMPLE_COUNT),
        &dataset,
        |b, dataset| {
            b.iter(|| train_softmax(black_box(dataset), black_box(&options)).expect("train"));
        },
    );
}

criterion_group!(benches, bench_gradient, bench_short_training);
criterion_main!(benches);

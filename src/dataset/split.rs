//! Deterministic stratified train/test partitioning.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Disjoint train/test subsets preserving class proportions.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Vec<Vec<f64>>,
    pub y_train: Vec<usize>,
    pub x_test: Vec<Vec<f64>>,
    pub y_test: Vec<usize>,
}

/// Split records into train/test subsets, stratified by class label.
///
/// Rows are grouped per class, shuffled with a single seeded generator in
/// ascending class order, and each class contributes its rounded share of
/// test rows. The same seed and input order always produce the same split.
/// Classes never lose every training row; a single-record class stays in
/// the training set.
pub fn stratified_split(
    x: &[Vec<f64>],
    y: &[usize],
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit, String> {
    if x.len() != y.len() {
        return Err("Mismatched features/labels lengths".to_string());
    }
    if x.is_empty() {
        return Err("Cannot split an empty dataset".to_string());
    }
    if !(0.0..1.0).contains(&test_fraction) {
        return Err("test_fraction must be in [0, 1)".to_string());
    }

    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in y.iter().enumerate() {
        by_class.entry(label).or_default().push(idx);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut split = TrainTestSplit {
        x_train: Vec::new(),
        y_train: Vec::new(),
        x_test: Vec::new(),
        y_test: Vec::new(),
    };
    for (label, mut indices) in by_class {
        indices.shuffle(&mut rng);
        let n = indices.len();
        let mut test_n = ((n as f64) * test_fraction).round() as usize;
        while test_n >= n {
            test_n -= 1;
        }
        for (position, idx) in indices.into_iter().enumerate() {
            if position < test_n {
                split.x_test.push(x[idx].clone());
                split.y_test.push(label);
            } else {
                split.x_train.push(x[idx].clone());
                split.y_train.push(label);
            }
        }
    }
    Ok(split)
}

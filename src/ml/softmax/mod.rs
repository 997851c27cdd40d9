//! Multinomial softmax regression over standardized sensor features.

use std::path::Path;

use serde::{Deserialize, Serialize};

mod train;
pub use train::{TrainDataset, TrainOptions, softmax_gradient, train_softmax};

/// Current on-disk model format version.
pub const MODEL_VERSION: i64 = 1;

/// Versioned softmax regression model.
///
/// `weights` is a flattened class-major `[n_classes][n_features]` matrix, so
/// the row for class `c` starts at `c * feature_names.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftmaxModel {
    /// Model format version.
    pub model_version: i64,
    /// Ordered feature column names expected by the model.
    pub feature_names: Vec<String>,
    /// Ordered list of class identifiers.
    pub classes: Vec<String>,
    /// Flattened class-major weight matrix.
    pub weights: Vec<f64>,
    /// Per-class bias terms.
    pub bias: Vec<f64>,
}

impl SoftmaxModel {
    /// Construct a zero-initialized model for the given columns and classes.
    pub fn zeroed(feature_names: Vec<String>, classes: Vec<String>) -> Self {
        let weights = vec![0.0; feature_names.len() * classes.len()];
        let bias = vec![0.0; classes.len()];
        Self {
            model_version: MODEL_VERSION,
            feature_names,
            classes,
            weights,
            bias,
        }
    }

    /// Number of input features.
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Number of output classes.
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.len() < 2 {
            return Err("Model must contain at least 2 classes".to_string());
        }
        if self.feature_names.is_empty() {
            return Err("Model must name at least one feature".to_string());
        }
        if self.weights.len() != self.classes.len() * self.feature_names.len() {
            return Err("weights length mismatch".to_string());
        }
        if self.bias.len() != self.classes.len() {
            return Err("bias length mismatch".to_string());
        }
        if self.weights.iter().chain(self.bias.iter()).any(|v| !v.is_finite()) {
            return Err("Model parameters contain non-finite values".to_string());
        }
        Ok(())
    }

    /// Raw per-class affine scores for a single feature row.
    pub fn logits(&self, features: &[f64]) -> Vec<f64> {
        let dim = self.feature_names.len();
        let classes = self.classes.len();
        let mut logits = vec![0.0f64; classes];
        for (class_idx, logit) in logits.iter_mut().enumerate() {
            let base = class_idx * dim;
            let mut sum = self.bias[class_idx];
            for i in 0..dim {
                sum += self.weights[base + i] * features[i];
            }
            *logit = sum;
        }
        logits
    }

    /// Class probabilities for a single feature row.
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        softmax(&self.logits(features))
    }

    /// Most likely class index for a single feature row.
    ///
    /// Ties resolve to the lowest class index.
    pub fn predict_class_index(&self, features: &[f64]) -> usize {
        argmax(&self.predict_proba(features))
    }

    /// Class probabilities for every row of a feature matrix.
    pub fn predict_proba_batch(&self, x: &[Vec<f64>]) -> Vec<Vec<f64>> {
        x.iter().map(|row| self.predict_proba(row)).collect()
    }

    /// Most likely class index for every row of a feature matrix.
    pub fn predict_batch(&self, x: &[Vec<f64>]) -> Vec<usize> {
        x.iter().map(|row| self.predict_class_index(row)).collect()
    }

    /// Load a model from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path).map_err(|err| err.to_string())?;
        let model: Self = serde_json::from_slice(&bytes).map_err(|err| err.to_string())?;
        model.validate()?;
        Ok(model)
    }

    /// Write the model to a JSON file.
    pub fn save_json(&self, path: &Path) -> Result<(), String> {
        self.validate()?;
        let data = serde_json::to_vec_pretty(self).map_err(|err| err.to_string())?;
        std::fs::write(path, data).map_err(|err| err.to_string())
    }
}

/// Compute a numerically-stable softmax for a set of logits.
///
/// The row maximum is subtracted before exponentiating so `exp` cannot
/// overflow; the output sums to 1 and is invariant under a constant shift of
/// the input.
pub fn softmax(raw: &[f64]) -> Vec<f64> {
    if raw.is_empty() {
        return Vec::new();
    }
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut exps = Vec::with_capacity(raw.len());
    let mut sum = 0.0f64;
    for &v in raw {
        let e = (v - max).exp();
        exps.push(e);
        sum += e;
    }
    if sum == 0.0 {
        return vec![1.0 / raw.len() as f64; raw.len()];
    }
    for v in &mut exps {
        *v /= sum;
    }
    exps
}

fn argmax(values: &[f64]) -> usize {
    let mut best_idx = 0usize;
    let mut best_val = f64::NEG_INFINITY;
    for (idx, &v) in values.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = idx;
        }
    }
    best_idx
}

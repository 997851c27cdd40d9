use tracing::info;

use super::{SoftmaxModel, softmax};

/// Epsilon added inside `ln` so an exactly-zero probability cannot produce
/// an infinite loss.
const LOG_EPS: f64 = 1e-12;

/// Training hyperparameters for batch gradient descent.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Step size applied to each gradient update.
    pub learning_rate: f64,
    /// Fixed number of full-batch iterations.
    pub iterations: usize,
    /// Emit a progress line every this many iterations; 0 disables.
    pub log_every: usize,
    /// Optional early stop once the absolute loss delta between consecutive
    /// iterations falls below this threshold. `None` keeps the fixed-count
    /// loop, which is the default behavior.
    pub min_loss_delta: Option<f64>,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            learning_rate: 1e-2,
            iterations: 10_000,
            log_every: 500,
            min_loss_delta: None,
        }
    }
}

/// In-memory training dataset for the softmax classifier.
#[derive(Debug, Clone)]
pub struct TrainDataset {
    /// Ordered feature column names.
    pub feature_names: Vec<String>,
    /// Ordered list of class identifiers.
    pub classes: Vec<String>,
    /// Feature matrix, row-major.
    pub x: Vec<Vec<f64>>,
    /// Class indices aligned with `x`.
    pub y: Vec<usize>,
}

/// Compute cross-entropy loss and parameter gradients at the current weights.
///
/// `weights` and the returned weight gradient share the model's flattened
/// class-major layout. Shape consistency is the caller's contract;
/// [`train_softmax`] validates it once at the boundary.
pub fn softmax_gradient(
    x: &[Vec<f64>],
    y: &[usize],
    weights: &[f64],
    bias: &[f64],
) -> (f64, Vec<f64>, Vec<f64>) {
    let classes = bias.len();
    let dim = if classes == 0 { 0 } else { weights.len() / classes };
    let mut grad_w = vec![0.0f64; weights.len()];
    let mut grad_b = vec![0.0f64; bias.len()];
    if x.is_empty() {
        return (0.0, grad_w, grad_b);
    }

    let mut loss = 0.0f64;
    let mut logits = vec![0.0f64; classes];
    for (row, &label) in x.iter().zip(y.iter()) {
        for (class_idx, logit) in logits.iter_mut().enumerate() {
            let base = class_idx * dim;
            let mut sum = bias[class_idx];
            for i in 0..dim {
                sum += weights[base + i] * row[i];
            }
            *logit = sum;
        }
        let probs = softmax(&logits);
        loss -= (probs[label] + LOG_EPS).ln();
        for class_idx in 0..classes {
            let diff = probs[class_idx] - if class_idx == label { 1.0 } else { 0.0 };
            let base = class_idx * dim;
            for i in 0..dim {
                grad_w[base + i] += diff * row[i];
            }
            grad_b[class_idx] += diff;
        }
    }

    let inv = 1.0 / x.len() as f64;
    loss *= inv;
    for g in &mut grad_w {
        *g *= inv;
    }
    for g in &mut grad_b {
        *g *= inv;
    }
    (loss, grad_w, grad_b)
}

/// Train a softmax regression model with full-batch gradient descent.
///
/// Parameters start at zero and are updated for a fixed number of iterations;
/// identical inputs always produce identical parameters.
pub fn train_softmax(
    dataset: &TrainDataset,
    options: &TrainOptions,
) -> Result<SoftmaxModel, String> {
    if dataset.x.is_empty() || dataset.y.is_empty() {
        return Err("Empty training set".to_string());
    }
    if dataset.x.len() != dataset.y.len() {
        return Err("Mismatched training inputs/labels".to_string());
    }
    let classes = dataset.classes.len();
    if classes < 2 {
        return Err("Need at least 2 classes".to_string());
    }
    let dim = dataset.feature_names.len();
    if dim == 0 {
        return Err("No feature columns defined".to_string());
    }
    for row in &dataset.x {
        if row.len() != dim {
            return Err("Inconsistent feature row length".to_string());
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err("Training features contain non-finite values".to_string());
        }
    }
    for &label in &dataset.y {
        if label >= classes {
            return Err(format!("Label {label} out of range for {classes} classes"));
        }
    }
    if !options.learning_rate.is_finite() || options.learning_rate <= 0.0 {
        return Err("learning_rate must be > 0".to_string());
    }

    let mut model =
        SoftmaxModel::zeroed(dataset.feature_names.clone(), dataset.classes.clone());
    let mut prev_loss = f64::INFINITY;
    for iteration in 0..options.iterations {
        let (loss, grad_w, grad_b) =
            softmax_gradient(&dataset.x, &dataset.y, &model.weights, &model.bias);
        for (w, g) in model.weights.iter_mut().zip(grad_w.iter()) {
            *w -= options.learning_rate * g;
        }
        for (b, g) in model.bias.iter_mut().zip(grad_b.iter()) {
            *b -= options.learning_rate * g;
        }
        if options.log_every > 0 && iteration % options.log_every == 0 {
            info!(iteration, loss, "gradient descent progress");
        }
        if let Some(tolerance) = options.min_loss_delta {
            if (prev_loss - loss).abs() < tolerance {
                info!(iteration, loss, "loss delta below tolerance, stopping early");
                break;
            }
            prev_loss = loss;
        }
    }

    model.validate()?;
    Ok(model)
}

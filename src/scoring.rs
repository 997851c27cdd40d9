//! Single-record scoring path used by interactive front ends.
//!
//! The front end collects one raw sensor record; this module standardizes
//! it, runs inference, and returns a structured result. Any prompting or
//! retry loop lives in the caller.

use serde::Serialize;

use crate::ml::scaler::StandardScaler;
use crate::ml::softmax::SoftmaxModel;
use crate::risk::label_for_index;

/// Outcome of scoring one raw sensor record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordScore {
    /// Per-class probabilities in class-index order.
    pub probabilities: Vec<f64>,
    /// Index of the most likely class.
    pub class_index: usize,
    /// Stable identifier of the predicted class.
    pub class_id: String,
    /// Human-readable label of the predicted class.
    pub label: String,
}

/// Score a single raw record against a fitted model and scaler.
pub fn score_record(
    model: &SoftmaxModel,
    scaler: &StandardScaler,
    raw: &[f64],
) -> Result<RecordScore, String> {
    if raw.len() != model.n_features() {
        return Err(format!(
            "Expected {} feature values, got {}",
            model.n_features(),
            raw.len()
        ));
    }
    if scaler.n_features() != model.n_features() {
        return Err("Scaler and model disagree on feature count".to_string());
    }
    if raw.iter().any(|v| !v.is_finite()) {
        return Err("Record contains non-finite values".to_string());
    }

    let standardized = scaler.transform_row(raw)?;
    let probabilities = model.predict_proba(&standardized);
    let class_index = model.predict_class_index(&standardized);
    let class_id = model
        .classes
        .get(class_index)
        .cloned()
        .unwrap_or_default();
    Ok(RecordScore {
        probabilities,
        class_index,
        class_id,
        label: label_for_index(class_index).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::softmax::MODEL_VERSION;
    use crate::risk::RiskClass;

    fn fixtures() -> (SoftmaxModel, StandardScaler) {
        let model = SoftmaxModel {
            model_version: MODEL_VERSION,
            feature_names: vec!["a".to_string(), "b".to_string()],
            classes: RiskClass::class_ids(),
            // Class score tracks the first standardized feature.
            weights: vec![-1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            bias: vec![0.0, 0.0, 0.0],
        };
        let scaler = StandardScaler {
            mean: vec![10.0, 0.0],
            scale: vec![2.0, 1.0],
        };
        (model, scaler)
    }

    #[test]
    fn scores_a_record_with_label() {
        let (model, scaler) = fixtures();
        let score = score_record(&model, &scaler, &[16.0, 0.5]).unwrap();
        assert_eq!(score.class_index, 2);
        assert_eq!(score.class_id, "high");
        assert_eq!(score.label, "High Risk");
        let sum: f64 = score.probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_wrong_width_and_non_finite_input() {
        let (model, scaler) = fixtures();
        assert!(score_record(&model, &scaler, &[1.0]).is_err());
        assert!(score_record(&model, &scaler, &[f64::NAN, 0.0]).is_err());
    }

    #[test]
    fn rejects_mismatched_scaler() {
        let (model, _) = fixtures();
        let scaler = StandardScaler {
            mean: vec![0.0],
            scale: vec![1.0],
        };
        assert!(score_record(&model, &scaler, &[1.0, 2.0]).is_err());
    }
}

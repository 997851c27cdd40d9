//! Per-feature standardization fitted on the training split.
//!
//! The scaler is fit once on training rows and reused unchanged for test and
//! live input, so train-time and score-time features share one coordinate
//! system. It is persisted beside the model and revalidated on load.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Per-feature mean and scale learned from training data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-feature means.
    pub mean: Vec<f64>,
    /// Per-feature standard deviations; constant features get scale 1.0.
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit a scaler to a non-empty training matrix.
    pub fn fit(x: &[Vec<f64>]) -> Result<Self, String> {
        if x.is_empty() {
            return Err("Cannot fit scaler to an empty matrix".to_string());
        }
        let dim = x[0].len();
        if dim == 0 {
            return Err("Cannot fit scaler to zero-width rows".to_string());
        }
        for row in x {
            if row.len() != dim {
                return Err("Inconsistent feature row length".to_string());
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err("Scaler input contains non-finite values".to_string());
            }
        }

        let n = x.len() as f64;
        let mut mean = vec![0.0f64; dim];
        for row in x {
            for (acc, &v) in mean.iter_mut().zip(row.iter()) {
                *acc += v;
            }
        }
        for acc in &mut mean {
            *acc /= n;
        }

        let mut scale = vec![0.0f64; dim];
        for row in x {
            for ((acc, &v), &m) in scale.iter_mut().zip(row.iter()).zip(mean.iter()) {
                let centered = v - m;
                *acc += centered * centered;
            }
        }
        for acc in &mut scale {
            let std = (*acc / n).sqrt();
            *acc = if std == 0.0 { 1.0 } else { std };
        }

        Ok(Self { mean, scale })
    }

    /// Number of features the scaler was fit on.
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Validate structural invariants of the scaler.
    pub fn validate(&self) -> Result<(), String> {
        if self.mean.is_empty() {
            return Err("Scaler has no features".to_string());
        }
        if self.mean.len() != self.scale.len() {
            return Err("mean/scale length mismatch".to_string());
        }
        if self.mean.iter().any(|v| !v.is_finite()) {
            return Err("Scaler means contain non-finite values".to_string());
        }
        if self.scale.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err("Scaler scales must be finite and > 0".to_string());
        }
        Ok(())
    }

    /// Standardize a single raw feature row.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, String> {
        if row.len() != self.mean.len() {
            return Err(format!(
                "Expected {} features, got {}",
                self.mean.len(),
                row.len()
            ));
        }
        Ok(row
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&v, (&m, &s))| (v - m) / s)
            .collect())
    }

    /// Standardize every row of a raw feature matrix.
    pub fn transform(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, String> {
        x.iter().map(|row| self.transform_row(row)).collect()
    }

    /// Load a scaler from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path).map_err(|err| err.to_string())?;
        let scaler: Self = serde_json::from_slice(&bytes).map_err(|err| err.to_string())?;
        scaler.validate()?;
        Ok(scaler)
    }

    /// Write the scaler to a JSON file.
    pub fn save_json(&self, path: &Path) -> Result<(), String> {
        self.validate()?;
        let data = serde_json::to_vec_pretty(self).map_err(|err| err.to_string())?;
        std::fs::write(path, data).map_err(|err| err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_produces_zero_mean_unit_variance() {
        let x = vec![
            vec![1.0, 10.0],
            vec![2.0, 20.0],
            vec![3.0, 30.0],
            vec![4.0, 40.0],
        ];
        let scaler = StandardScaler::fit(&x).unwrap();
        let transformed = scaler.transform(&x).unwrap();
        for col in 0..2 {
            let mean: f64 = transformed.iter().map(|row| row[col]).sum::<f64>() / 4.0;
            let var: f64 = transformed.iter().map(|row| row[col] * row[col]).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_feature_passes_through_centered() {
        let x = vec![vec![5.0, 1.0], vec![5.0, 2.0], vec![5.0, 3.0]];
        let scaler = StandardScaler::fit(&x).unwrap();
        assert_eq!(scaler.scale[0], 1.0);
        let row = scaler.transform_row(&[5.0, 2.0]).unwrap();
        assert_eq!(row[0], 0.0);
    }

    #[test]
    fn transform_rejects_wrong_width() {
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert!(scaler.transform_row(&[1.0]).is_err());
    }

    #[test]
    fn fit_rejects_degenerate_input() {
        assert!(StandardScaler::fit(&[]).is_err());
        assert!(StandardScaler::fit(&[vec![1.0], vec![f64::NAN]]).is_err());
        assert!(StandardScaler::fit(&[vec![1.0, 2.0], vec![1.0]]).is_err());
    }

    #[test]
    fn json_round_trip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        let scaler = StandardScaler::fit(&[vec![0.1, -7.3], vec![2.4, 9.9], vec![-3.3, 0.2]]).unwrap();
        scaler.save_json(&path).unwrap();
        let reloaded = StandardScaler::load_json(&path).unwrap();
        assert_eq!(scaler.mean, reloaded.mean);
        assert_eq!(scaler.scale, reloaded.scale);
    }
}

//! Training configuration persisted as a TOML file.
//!
//! Every field has a default so a partial or missing file still yields a
//! usable configuration; CLI flags override loaded values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default filename used to store the training configuration.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that can occur while reading or writing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {source}")]
    SerializeToml { source: toml::ser::Error },
    #[error("Failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Aggregate configuration for the training and scoring binaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub training: TrainingSettings,
    #[serde(default)]
    pub paths: PathSettings,
}

/// Hyperparameters for the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSettings {
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default = "default_log_every")]
    pub log_every: usize,
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            iterations: default_iterations(),
            log_every: default_log_every(),
            test_fraction: default_test_fraction(),
            seed: default_seed(),
        }
    }
}

/// Output locations for the fitted model and scaler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_model_out")]
    pub model_out: PathBuf,
    #[serde(default = "default_scaler_out")]
    pub scaler_out: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            model_out: default_model_out(),
            scaler_out: default_scaler_out(),
        }
    }
}

fn default_learning_rate() -> f64 {
    1e-2
}

fn default_iterations() -> usize {
    10_000
}

fn default_log_every() -> usize {
    500
}

fn default_test_fraction() -> f64 {
    0.20
}

fn default_seed() -> u64 {
    23
}

fn default_model_out() -> PathBuf {
    PathBuf::from("model/softmax_model.json")
}

fn default_scaler_out() -> PathBuf {
    PathBuf::from("model/scaler.json")
}

/// Load a configuration file, or defaults when the file does not exist.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a configuration file, creating parent directories as needed.
pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let data =
        toml::to_string_pretty(config).map_err(|source| ConfigError::SerializeToml { source })?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    std::fs::write(path, data).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_hyperparameters() {
        let config = AppConfig::default();
        assert_eq!(config.training.learning_rate, 1e-2);
        assert_eq!(config.training.iterations, 10_000);
        assert_eq!(config.training.log_every, 500);
        assert_eq!(config.training.test_fraction, 0.20);
        assert_eq!(config.training.seed, 23);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: AppConfig = toml::from_str("[training]\niterations = 50\n").unwrap();
        assert_eq!(config.training.iterations, 50);
        assert_eq!(config.training.learning_rate, 1e-2);
        assert_eq!(config.paths.model_out, PathBuf::from("model/softmax_model.json"));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.training.seed, 23);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut config = AppConfig::default();
        config.training.iterations = 123;
        config.paths.model_out = PathBuf::from("out/m.json");
        save_config(&path, &config).unwrap();
        let reloaded = load_config(&path).unwrap();
        assert_eq!(reloaded.training.iterations, 123);
        assert_eq!(reloaded.paths.model_out, PathBuf::from("out/m.json"));
    }
}

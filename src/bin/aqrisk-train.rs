//! Developer utility to train and export the air-quality risk classifier.

use std::path::PathBuf;

use aqrisk::config::{self, AppConfig, CONFIG_FILE_NAME};
use aqrisk::dataset::loader::{self, AirQualityData};
use aqrisk::dataset::split::stratified_split;
use aqrisk::logging;
use aqrisk::ml::metrics::{ConfusionMatrix, accuracy, f1_score, precision_recall_by_class};
use aqrisk::ml::scaler::StandardScaler;
use aqrisk::ml::softmax::{SoftmaxModel, TrainDataset, TrainOptions, train_softmax};
use aqrisk::risk::RiskClass;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging setup failed: {err}");
    }

    let mut config = config::load_config(&options.config_path).map_err(|err| err.to_string())?;
    apply_overrides(&mut config, &options);
    if !(0.0..1.0).contains(&config.training.test_fraction) {
        return Err("test_fraction must be in [0, 1)".to_string());
    }
    if config.training.iterations == 0 {
        return Err("iterations must be > 0".to_string());
    }

    let data = loader::load_csv(&options.data_path).map_err(|err| err.to_string())?;
    print_dataset_summary(&data);

    let labels = data.labels();
    let split = stratified_split(
        &data.x,
        &labels,
        config.training.test_fraction,
        config.training.seed,
    )?;
    let scaler = StandardScaler::fit(&split.x_train)?;
    let x_train = scaler.transform(&split.x_train)?;
    let x_test = scaler.transform(&split.x_test)?;

    let dataset = TrainDataset {
        feature_names: data.feature_names.clone(),
        classes: RiskClass::class_ids(),
        x: x_train,
        y: split.y_train.clone(),
    };
    let train_options = TrainOptions {
        learning_rate: config.training.learning_rate,
        iterations: config.training.iterations,
        log_every: config.training.log_every,
        min_loss_delta: None,
    };
    let model = train_softmax(&dataset, &train_options)?;

    save_artifacts(&config, &model, &scaler)?;

    report_split("Training", &model, &dataset.x, &split.y_train)?;
    report_split("Test", &model, &x_test, &split.y_test)?;
    Ok(())
}

fn save_artifacts(
    config: &AppConfig,
    model: &SoftmaxModel,
    scaler: &StandardScaler,
) -> Result<(), String> {
    for path in [&config.paths.model_out, &config.paths.scaler_out] {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|err| format!("Create {}: {err}", parent.display()))?;
            }
        }
    }
    model.save_json(&config.paths.model_out)?;
    scaler.save_json(&config.paths.scaler_out)?;
    println!("Saved model to {}", config.paths.model_out.display());
    println!("Saved scaler to {}", config.paths.scaler_out.display());
    Ok(())
}

fn print_dataset_summary(data: &AirQualityData) {
    if let Some((min, max)) = data.aqi_range() {
        println!("AQI min: {min}");
        println!("AQI max: {max}");
    }
    let counts = data.class_counts();
    println!(
        "Class distribution (0=Low,1=Moderate,2=High): {{0: {}, 1: {}, 2: {}}}",
        counts[0], counts[1], counts[2]
    );
    if data.skipped_rows > 0 {
        println!("Skipped {} rows with missing values", data.skipped_rows);
    }
}

fn report_split(
    name: &str,
    model: &SoftmaxModel,
    x: &[Vec<f64>],
    truth: &[usize],
) -> Result<(), String> {
    let predicted = model.predict_batch(x);
    let cm = ConfusionMatrix::from_labels(truth, &predicted, model.n_classes())?;
    println!("{name} Accuracy: {:.2}%", accuracy(&cm) * 100.0);
    for (idx, stats) in precision_recall_by_class(&cm).iter().enumerate() {
        let f1 = f1_score(stats.precision, stats.recall);
        println!(
            "class {:>2} {:<16}  precision={:.3}  recall={:.3}  f1={:.3}  support={}",
            idx,
            model.classes.get(idx).map(String::as_str).unwrap_or("?"),
            stats.precision,
            stats.recall,
            f1,
            stats.support
        );
    }
    println!("confusion matrix (rows=true, cols=pred):");
    for truth_idx in 0..cm.n_classes {
        let mut row = String::new();
        for pred_idx in 0..cm.n_classes {
            row.push_str(&format!("{:6}", cm.get(truth_idx, pred_idx)));
        }
        println!("{row}");
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct CliOptions {
    data_path: PathBuf,
    config_path: PathBuf,
    model_out: Option<PathBuf>,
    scaler_out: Option<PathBuf>,
    learning_rate: Option<f64>,
    iterations: Option<usize>,
    test_fraction: Option<f64>,
    seed: Option<u64>,
}

fn apply_overrides(config: &mut AppConfig, options: &CliOptions) {
    if let Some(path) = &options.model_out {
        config.paths.model_out = path.clone();
    }
    if let Some(path) = &options.scaler_out {
        config.paths.scaler_out = path.clone();
    }
    if let Some(value) = options.learning_rate {
        config.training.learning_rate = value;
    }
    if let Some(value) = options.iterations {
        config.training.iterations = value;
    }
    if let Some(value) = options.test_fraction {
        config.training.test_fraction = value;
    }
    if let Some(value) = options.seed {
        config.training.seed = value;
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut data_path: Option<PathBuf> = None;
    let mut config_path = PathBuf::from(CONFIG_FILE_NAME);
    let mut model_out: Option<PathBuf> = None;
    let mut scaler_out: Option<PathBuf> = None;
    let mut learning_rate: Option<f64> = None;
    let mut iterations: Option<usize> = None;
    let mut test_fraction: Option<f64> = None;
    let mut seed: Option<u64> = None;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--data" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--data requires a value".to_string())?;
                data_path = Some(PathBuf::from(value));
            }
            "--config" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--config requires a value".to_string())?;
                config_path = PathBuf::from(value);
            }
            "--model-out" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--model-out requires a value".to_string())?;
                model_out = Some(PathBuf::from(value));
            }
            "--scaler-out" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--scaler-out requires a value".to_string())?;
                scaler_out = Some(PathBuf::from(value));
            }
            "--learning-rate" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--learning-rate requires a value".to_string())?;
                learning_rate = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid --learning-rate value: {value}"))?,
                );
            }
            "--iterations" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--iterations requires a value".to_string())?;
                iterations = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid --iterations value: {value}"))?,
                );
            }
            "--test-fraction" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--test-fraction requires a value".to_string())?;
                test_fraction = Some(
                    value
                        .parse::<f64>()
                        .map_err(|_| format!("Invalid --test-fraction value: {value}"))?,
                );
            }
            "--seed" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--seed requires a value".to_string())?;
                seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {value}"))?,
                );
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    let data_path = data_path.ok_or_else(help_text)?;
    Ok(CliOptions {
        data_path,
        config_path,
        model_out,
        scaler_out,
        learning_rate,
        iterations,
        test_fraction,
        seed,
    })
}

fn help_text() -> String {
    [
        "aqrisk-train",
        "",
        "Trains a softmax risk classifier from an urban air-pollution CSV export.",
        "",
        "Usage:",
        "  aqrisk-train --data <csv> [options]",
        "",
        "Options:",
        "  --data <csv>           Input CSV with sensor columns and AQI_Target (required).",
        "  --config <file>        TOML config path (default: config.toml).",
        "  --model-out <file>     Output model path (default: model/softmax_model.json).",
        "  --scaler-out <file>    Output scaler path (default: model/scaler.json).",
        "  --learning-rate <f64>  Gradient descent step size (default: 0.01).",
        "  --iterations <n>       Gradient descent iterations (default: 10000).",
        "  --test-fraction <f64>  Held-out test share (default: 0.20).",
        "  --seed <u64>           Split RNG seed (default: 23).",
    ]
    .join("\n")
}

//! Developer utility to score air-quality records with a trained classifier.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use aqrisk::config::{self, CONFIG_FILE_NAME};
use aqrisk::ml::scaler::StandardScaler;
use aqrisk::ml::softmax::SoftmaxModel;
use aqrisk::scoring::{RecordScore, score_record};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    let config = config::load_config(&options.config_path).map_err(|err| err.to_string())?;
    let model_path = options.model_path.unwrap_or(config.paths.model_out);
    let scaler_path = options.scaler_path.unwrap_or(config.paths.scaler_out);

    let model = SoftmaxModel::load_json(&model_path)
        .map_err(|err| format!("Load model {}: {err}", model_path.display()))?;
    let scaler = StandardScaler::load_json(&scaler_path)
        .map_err(|err| format!("Load scaler {}: {err}", scaler_path.display()))?;

    let raw = match options.values {
        Some(values) => values,
        None => collect_values_interactively(&model)?,
    };
    let score = score_record(&model, &scaler, &raw)?;
    print_score(&score);
    Ok(())
}

fn print_score(score: &RecordScore) {
    println!("\nInput classification:");
    let formatted: Vec<String> = score
        .probabilities
        .iter()
        .map(|p| format!("{p:.6}"))
        .collect();
    println!("Probabilities (Low, Moderate, High) = [{}]", formatted.join(", "));
    println!("Predicted class = {} ({})", score.class_index, score.label);
}

fn collect_values_interactively(model: &SoftmaxModel) -> Result<Vec<f64>, String> {
    println!("\nEnter pollution and weather values:");
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut values = Vec::with_capacity(model.n_features());
    for name in &model.feature_names {
        values.push(read_value(&prompt_for(name), &mut input)?);
    }
    Ok(values)
}

/// Prompt until the reader yields a parseable numeric value.
///
/// Non-numeric input is recoverable; only end-of-input aborts.
fn read_value(prompt: &str, input: &mut impl BufRead) -> Result<f64, String> {
    loop {
        print!("{prompt}");
        std::io::stdout()
            .flush()
            .map_err(|err| format!("Flush stdout: {err}"))?;
        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .map_err(|err| format!("Read input: {err}"))?;
        if read == 0 {
            return Err("Unexpected end of input".to_string());
        }
        match line.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => return Ok(value),
            _ => println!("Please enter a numeric value."),
        }
    }
}

fn prompt_for(feature: &str) -> String {
    let prompt = match feature {
        "PM2.5" => "PM2.5 (µg/m³)",
        "PM10" => "PM10 (µg/m³)",
        "NO₂" => "NO₂ (µg/m³)",
        "SO₂" => "SO₂ (µg/m³)",
        "CO" => "CO",
        "O₃" => "O₃ (µg/m³)",
        "Temp_C" => "Temperature (°C)",
        "Humidity_%" => "Humidity (%)",
        "Wind_Speed_mps" => "Wind speed (m/s)",
        "Pressure_hPa" => "Pressure (hPa)",
        "Rain_mm" => "Rain (mm)",
        other => other,
    };
    format!("{prompt}: ")
}

#[derive(Debug, Clone)]
struct CliOptions {
    config_path: PathBuf,
    model_path: Option<PathBuf>,
    scaler_path: Option<PathBuf>,
    values: Option<Vec<f64>>,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut config_path = PathBuf::from(CONFIG_FILE_NAME);
    let mut model_path: Option<PathBuf> = None;
    let mut scaler_path: Option<PathBuf> = None;
    let mut values: Option<Vec<f64>> = None;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--config" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--config requires a value".to_string())?;
                config_path = PathBuf::from(value);
            }
            "--model" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--model requires a value".to_string())?;
                model_path = Some(PathBuf::from(value));
            }
            "--scaler" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--scaler requires a value".to_string())?;
                scaler_path = Some(PathBuf::from(value));
            }
            "--values" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--values requires a value".to_string())?;
                values = Some(parse_values(value)?);
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    Ok(CliOptions {
        config_path,
        model_path,
        scaler_path,
        values,
    })
}

fn parse_values(raw: &str) -> Result<Vec<f64>, String> {
    raw.split(',')
        .map(str::trim)
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|_| format!("Invalid numeric value: {field}"))
        })
        .collect()
}

fn help_text() -> String {
    [
        "aqrisk-score",
        "",
        "Scores one air-quality record with a trained softmax risk classifier.",
        "",
        "Usage:",
        "  aqrisk-score [--model model.json] [--scaler scaler.json] [--values v1,..,v11]",
        "",
        "Options:",
        "  --config <file>   TOML config path (default: config.toml).",
        "  --model <file>    Model path (default: from config).",
        "  --scaler <file>   Scaler path (default: from config).",
        "  --values <list>   Comma-separated feature values; prompts interactively when omitted.",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_values_accepts_comma_list() {
        let values = parse_values("1.5, -2, 3").unwrap();
        assert_eq!(values, vec![1.5, -2.0, 3.0]);
        assert!(parse_values("1.5,abc").is_err());
    }

    #[test]
    fn read_value_retries_until_numeric() {
        let mut input = Cursor::new("abc\n\n42.5\n");
        let value = read_value("x: ", &mut input).unwrap();
        assert_eq!(value, 42.5);
    }

    #[test]
    fn read_value_fails_on_end_of_input() {
        let mut input = Cursor::new("oops\n");
        assert!(read_value("x: ", &mut input).is_err());
    }
}

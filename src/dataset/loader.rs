//! CSV loader for urban air-pollution exports.
//!
//! The loader selects the feature and target columns by header name, skips
//! rows with missing or non-numeric values in any used column, and rejects
//! files that yield no usable rows so degenerate input never reaches
//! training.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::risk::RiskClass;

/// Feature columns consumed by the classifier, in model order.
pub const FEATURE_COLUMNS: [&str; 11] = [
    "PM2.5",
    "PM10",
    "NO₂",
    "SO₂",
    "CO",
    "O₃",
    "Temp_C",
    "Humidity_%",
    "Wind_Speed_mps",
    "Pressure_hPa",
    "Rain_mm",
];

/// Column holding the continuous AQI target.
pub const TARGET_COLUMN: &str = "AQI_Target";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataset file has no header row")]
    Empty,
    #[error("missing column {0:?}")]
    MissingColumn(String),
    #[error("no usable rows after filtering")]
    NoUsableRows,
}

/// Loaded feature matrix plus the continuous AQI targets.
#[derive(Debug, Clone)]
pub struct AirQualityData {
    /// Ordered feature column names, matching each row of `x`.
    pub feature_names: Vec<String>,
    /// Feature matrix, row-major.
    pub x: Vec<Vec<f64>>,
    /// Continuous AQI target aligned with `x`.
    pub aqi: Vec<f64>,
    /// Rows dropped for missing or non-numeric values.
    pub skipped_rows: usize,
}

impl AirQualityData {
    /// Derive the class index for every record from its AQI value.
    pub fn labels(&self) -> Vec<usize> {
        self.aqi
            .iter()
            .map(|&value| RiskClass::from_aqi(value).index())
            .collect()
    }

    /// Minimum and maximum AQI over the usable rows.
    pub fn aqi_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.aqi.iter().copied();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;
        for value in iter {
            min = min.min(value);
            max = max.max(value);
        }
        Some((min, max))
    }

    /// Number of records per risk class, in class-index order.
    pub fn class_counts(&self) -> [usize; RiskClass::COUNT] {
        let mut counts = [0usize; RiskClass::COUNT];
        for &value in &self.aqi {
            counts[RiskClass::from_aqi(value).index()] += 1;
        }
        counts
    }
}

/// Load and filter a CSV file from disk.
pub fn load_csv(path: &Path) -> Result<AirQualityData, DatasetError> {
    let file = File::open(path)?;
    parse_csv(BufReader::new(file))
}

/// Parse CSV content from any buffered reader.
///
/// Fields are comma-separated without quoting, which matches the sensor
/// export format.
pub fn parse_csv<R: BufRead>(reader: R) -> Result<AirQualityData, DatasetError> {
    let mut lines = reader.lines();
    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(DatasetError::Empty),
    };
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    let mut feature_indices = Vec::with_capacity(FEATURE_COLUMNS.len());
    for name in FEATURE_COLUMNS {
        let idx = columns
            .iter()
            .position(|col| *col == name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))?;
        feature_indices.push(idx);
    }
    let target_index = columns
        .iter()
        .position(|col| *col == TARGET_COLUMN)
        .ok_or_else(|| DatasetError::MissingColumn(TARGET_COLUMN.to_string()))?;

    let mut x = Vec::new();
    let mut aqi = Vec::new();
    let mut skipped_rows = 0usize;
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        match parse_row(&fields, &feature_indices, target_index) {
            Some((features, target)) => {
                x.push(features);
                aqi.push(target);
            }
            None => skipped_rows += 1,
        }
    }
    if x.is_empty() {
        return Err(DatasetError::NoUsableRows);
    }

    Ok(AirQualityData {
        feature_names: FEATURE_COLUMNS.iter().map(|name| name.to_string()).collect(),
        x,
        aqi,
        skipped_rows,
    })
}

fn parse_row(
    fields: &[&str],
    feature_indices: &[usize],
    target_index: usize,
) -> Option<(Vec<f64>, f64)> {
    let mut features = Vec::with_capacity(feature_indices.len());
    for &idx in feature_indices {
        features.push(parse_value(fields.get(idx).copied()?)?);
    }
    let target = parse_value(fields.get(target_index).copied()?)?;
    Some((features, target))
}

fn parse_value(field: &str) -> Option<f64> {
    if field.is_empty() {
        return None;
    }
    field.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header() -> String {
        let mut columns: Vec<&str> = FEATURE_COLUMNS.to_vec();
        columns.push(TARGET_COLUMN);
        columns.join(",")
    }

    fn row(features: &str, target: &str) -> String {
        format!("{features},{target}")
    }

    #[test]
    fn parses_usable_rows_and_derives_labels() {
        let csv = format!(
            "{}\n{}\n{}\n{}\n",
            header(),
            row("1,2,3,4,5,6,7,8,9,10,11", "25.0"),
            row("2,3,4,5,6,7,8,9,10,11,12", "45.0"),
            row("3,4,5,6,7,8,9,10,11,12,13", "90.0"),
        );
        let data = parse_csv(Cursor::new(csv)).unwrap();
        assert_eq!(data.x.len(), 3);
        assert_eq!(data.skipped_rows, 0);
        assert_eq!(data.labels(), vec![0, 1, 2]);
        assert_eq!(data.aqi_range(), Some((25.0, 90.0)));
        assert_eq!(data.class_counts(), [1, 1, 1]);
    }

    #[test]
    fn skips_rows_with_missing_or_bad_values() {
        let csv = format!(
            "{}\n{}\n{}\n{}\n{}\n",
            header(),
            row("1,2,3,4,5,6,7,8,9,10,11", "25.0"),
            row("1,,3,4,5,6,7,8,9,10,11", "25.0"),
            row("1,2,3,4,5,abc,7,8,9,10,11", "25.0"),
            row("1,2,3,4,5,6,7,8,9,10,11", "NaN"),
        );
        let data = parse_csv(Cursor::new(csv)).unwrap();
        assert_eq!(data.x.len(), 1);
        assert_eq!(data.skipped_rows, 3);
    }

    #[test]
    fn ignores_unused_columns_and_order() {
        let mut columns: Vec<&str> = vec!["City", TARGET_COLUMN];
        columns.extend(FEATURE_COLUMNS);
        let header = columns.join(",");
        let csv = format!("{header}\nDelhi,72.5,1,2,3,4,5,6,7,8,9,10,11\n");
        let data = parse_csv(Cursor::new(csv)).unwrap();
        assert_eq!(data.x[0], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0]);
        assert_eq!(data.aqi, vec![72.5]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let csv = "PM2.5,PM10\n1,2\n";
        match parse_csv(Cursor::new(csv)) {
            Err(DatasetError::MissingColumn(name)) => assert_eq!(name, "NO₂"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn all_rows_filtered_is_an_error() {
        let csv = format!("{}\n{}\n", header(), row("1,2,3,4,5,6,7,8,9,10,x", "25.0"));
        assert!(matches!(
            parse_csv(Cursor::new(csv)),
            Err(DatasetError::NoUsableRows)
        ));
    }

    #[test]
    fn empty_file_is_an_error() {
        assert!(matches!(parse_csv(Cursor::new("")), Err(DatasetError::Empty)));
    }
}

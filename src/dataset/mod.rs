// src/dataset/mod.rs
use anyhow::{ensure, Context, Result};
use log::{error, info};
use serde::Deserialize;
use std::path::Path;

/// Feature columns in the order the model is trained on. The prediction
/// endpoint builds its input vector in this same order.
pub const FEATURE_NAMES: [&str; 13] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

/// One row of the training CSV. Columns are matched by header name, so extra
/// columns in the file are ignored; the named ones are required.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartRecord {
    pub age: f64,
    pub sex: f64,
    pub cp: f64,
    pub trestbps: f64,
    pub chol: f64,
    pub fbs: f64,
    pub restecg: f64,
    pub thalach: f64,
    pub exang: f64,
    pub oldpeak: f64,
    pub slope: f64,
    pub ca: f64,
    pub thal: f64,
    pub target: u8,
}

impl HeartRecord {
    /// Feature values in `FEATURE_NAMES` order.
    pub fn features(&self) -> Vec<f64> {
        vec![
            self.age,
            self.sex,
            self.cp,
            self.trestbps,
            self.chol,
            self.fbs,
            self.restecg,
            self.thalach,
            self.exang,
            self.oldpeak,
            self.slope,
            self.ca,
            self.thal,
        ]
    }
}

/// Feature table plus label sequence, separated at load time.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Read the training CSV into a [`Dataset`].
///
/// A missing or malformed file is fatal to training; the error is logged here
/// and propagated to the caller.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let result = read_csv(path);
    match &result {
        Ok(dataset) => info!(
            "Successfully loaded dataset: {} rows from {}",
            dataset.len(),
            path.display()
        ),
        Err(e) => error!("Error loading dataset from {}: {:#}", path.display(), e),
    }
    result
}

fn read_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open dataset file {}", path.display()))?;

    let mut dataset = Dataset::default();
    for (row, record) in reader.deserialize::<HeartRecord>().enumerate() {
        let record = record.with_context(|| format!("Failed to parse dataset row {}", row + 1))?;
        dataset.features.push(record.features());
        dataset.labels.push(record.target);
    }

    ensure!(!dataset.is_empty(), "Dataset contains no rows");
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "age,sex,cp,trestbps,chol,fbs,restecg,thalach,exang,oldpeak,slope,ca,thal,target";

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_dataset() {
        let csv = format!(
            "{}\n63,1,3,145,233,1,0,150,0,2.3,0,0,1,1\n37,1,2,130,250,0,1,187,0,3.5,0,0,2,0\n",
            HEADER
        );
        let file = write_csv(&csv);

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.features[0].len(), FEATURE_COUNT);
        assert_eq!(dataset.features[0][0], 63.0);
        assert_eq!(dataset.features[1][7], 187.0); // thalach
        assert_eq!(dataset.labels, vec![1, 0]);
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = format!(
            "patient_id,{}\nP-001,63,1,3,145,233,1,0,150,0,2.3,0,0,1,1\n",
            HEADER
        );
        let file = write_csv(&csv);

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.features[0][0], 63.0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_dataset(Path::new("/nonexistent/heart.csv")).is_err());
    }

    #[test]
    fn test_non_numeric_field_is_an_error() {
        let csv = format!("{}\n63,1,3,145,not_a_number,1,0,150,0,2.3,0,0,1,1\n", HEADER);
        let file = write_csv(&csv);
        assert!(load_dataset(file.path()).is_err());
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let file = write_csv(&format!("{}\n", HEADER));
        assert!(load_dataset(file.path()).is_err());
    }
}

use std::path::{Path, PathBuf};

use candle_core::{Device, Tensor};

use crate::core::{AppConfig, Result, SentimentError, SentimentLabel};
use crate::preprocessing::dataset::read_records;
use crate::preprocessing::ReviewRecord;
use crate::vectorizers::Vectorizer;

pub const TRAIN_FEATURES_FILE: &str = "train_features.csv";
pub const TEST_FEATURES_FILE: &str = "test_features.csv";
const LABEL_COLUMN: &str = "label";

/// Dense, row-major feature matrix with one label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    width: usize,
    values: Vec<f32>,
    labels: Vec<SentimentLabel>,
}

impl FeatureMatrix {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            values: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn push(&mut self, row: &[f32], label: SentimentLabel) -> Result<()> {
        if row.len() != self.width {
            return Err(SentimentError::Transform(format!(
                "row has {} columns, expected {}",
                row.len(),
                self.width
            )));
        }
        self.values.extend_from_slice(row);
        self.labels.push(label);
        Ok(())
    }

    pub fn from_records(vectorizer: &Vectorizer, records: &[ReviewRecord]) -> Result<Self> {
        let texts: Vec<&str> = records.iter().map(|r| r.review.as_str()).collect();
        let rows = vectorizer.transform_batch(&texts)?;
        let mut matrix = Self::new(vectorizer.width());
        for (row, record) in rows.iter().zip(records) {
            matrix.push(row.as_slice(), record.sentiment)?;
        }
        Ok(matrix)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[SentimentLabel] {
        &self.labels
    }

    pub fn row(&self, idx: usize) -> &[f32] {
        &self.values[idx * self.width..(idx + 1) * self.width]
    }

    /// `n x width` input tensor.
    pub fn features(&self, device: &Device) -> Result<Tensor> {
        Ok(Tensor::from_slice(&self.values, (self.len(), self.width), device)?)
    }

    /// `n x 1` tensor of 0.0 / 1.0 targets.
    pub fn targets(&self, device: &Device) -> Result<Tensor> {
        let targets: Vec<f32> = self.labels.iter().map(|l| f32::from(l.as_u8())).collect();
        Ok(Tensor::from_vec(targets, (self.len(), 1), device)?)
    }
}

/// Write `f0..f{w-1},label` rows.
pub fn write_feature_csv(path: &Path, matrix: &FeatureMatrix) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    let mut header: Vec<String> = (0..matrix.width()).map(|i| format!("f{i}")).collect();
    header.push(LABEL_COLUMN.to_string());
    writer.write_record(&header)?;

    for (idx, label) in matrix.labels().iter().enumerate() {
        let mut row: Vec<String> = matrix.row(idx).iter().map(|v| v.to_string()).collect();
        row.push(label.as_str().to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_feature_csv(path: &Path) -> Result<FeatureMatrix> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    if headers.iter().last() != Some(LABEL_COLUMN) {
        return Err(SentimentError::InvalidDataset(format!(
            "{}: last column must be '{LABEL_COLUMN}'",
            path.display()
        )));
    }

    let mut matrix = FeatureMatrix::new(headers.len() - 1);
    let mut row = Vec::with_capacity(matrix.width());
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        row.clear();
        for field in record.iter().take(matrix.width()) {
            let value = field.trim().parse::<f32>().map_err(|e| {
                let at = format!("{} row {}", path.display(), line + 1);
                SentimentError::InvalidDataset(format!("{at}: {e}"))
            })?;
            row.push(value);
        }
        let label = record
            .get(matrix.width())
            .ok_or_else(|| {
                SentimentError::InvalidDataset(format!("row {} has no label", line + 1))
            })?
            .parse::<SentimentLabel>()?;
        matrix.push(&row, label)?;
    }
    Ok(matrix)
}

#[derive(Debug, Clone)]
pub struct FeatureSummary {
    pub width: usize,
    pub vectorizer_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

/// Feature engineering stage: fit the vectorizer on the processed training
/// texts, save it, and write both feature matrices.
pub fn run(config: &AppConfig) -> Result<FeatureSummary> {
    let interim = config.data.interim_dir();
    let train = read_records(&interim.join(super::preprocess::TRAIN_PROCESSED_FILE))?;
    let test = read_records(&interim.join(super::preprocess::TEST_PROCESSED_FILE))?;

    let mut vectorizer = Vectorizer::new(config.features.kind, config.features.max_features);
    let texts: Vec<&str> = train.iter().map(|r| r.review.as_str()).collect();
    vectorizer.fit(&texts)?;
    vectorizer.save(&config.model.vectorizer_path)?;

    let processed = config.data.processed_dir();
    let train_path = processed.join(TRAIN_FEATURES_FILE);
    let test_path = processed.join(TEST_FEATURES_FILE);
    write_feature_csv(&train_path, &FeatureMatrix::from_records(&vectorizer, &train)?)?;
    write_feature_csv(&test_path, &FeatureMatrix::from_records(&vectorizer, &test)?)?;

    tracing::info!(
        kind = ?vectorizer.kind(),
        width = vectorizer.width(),
        vectorizer = %config.model.vectorizer_path.display(),
        "feature engineering completed"
    );
    Ok(FeatureSummary {
        width: vectorizer.width(),
        vectorizer_path: config.model.vectorizer_path.clone(),
        train_path,
        test_path,
    })
}

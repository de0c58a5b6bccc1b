use std::path::PathBuf;

use crate::core::{AppConfig, Result};
use crate::preprocessing::dataset::{label_counts, read_records, write_records};
use crate::preprocessing::{preprocess_records, PreprocessOptions, TextNormalizer};

pub const TRAIN_PROCESSED_FILE: &str = "train_processed.csv";
pub const TEST_PROCESSED_FILE: &str = "test_processed.csv";

#[derive(Debug, Clone)]
pub struct PreprocessSummary {
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

/// Preprocessing stage: raw CSVs to normalized interim CSVs.
pub fn run(config: &AppConfig) -> Result<PreprocessSummary> {
    let raw = config.data.raw_dir();
    let train = read_records(&raw.join(super::ingestion::TRAIN_FILE))?;
    let test = read_records(&raw.join(super::ingestion::TEST_FILE))?;

    let normalizer = TextNormalizer::new();
    let options = PreprocessOptions {
        drop_short_rows: config.preprocessing.drop_short_rows,
        min_tokens: config.preprocessing.min_tokens,
    };
    let train = preprocess_records(&normalizer, train, options);
    let test = preprocess_records(&normalizer, test, options);

    let interim = config.data.interim_dir();
    let train_path = interim.join(TRAIN_PROCESSED_FILE);
    let test_path = interim.join(TEST_PROCESSED_FILE);
    write_records(&train_path, &train)?;
    write_records(&test_path, &test)?;

    tracing::debug!(balance = ?label_counts(&train), "training class balance");
    tracing::info!(
        train = train.len(),
        test = test.len(),
        dir = %interim.display(),
        "processed data saved"
    );
    Ok(PreprocessSummary {
        train_rows: train.len(),
        test_rows: test.len(),
        train_path,
        test_path,
    })
}

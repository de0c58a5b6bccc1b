use std::fs::File;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::core::{AppConfig, Result, SentimentError};
use crate::preprocessing::dataset::{read_labelled_csv, write_records};
use crate::preprocessing::ReviewRecord;

pub const TRAIN_FILE: &str = "train.csv";
pub const TEST_FILE: &str = "test.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub train_rows: usize,
    pub test_rows: usize,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

/// Rewrite a `github.com/.../blob/...` page URL to its raw-content URL.
/// Other sources are returned unchanged.
pub fn resolve_source_url(source: &str) -> String {
    if source.contains("github.com") && source.contains("/blob/") {
        let raw = source
            .replacen("github.com", "raw.githubusercontent.com", 1)
            .replacen("/blob/", "/", 1);
        tracing::info!(url = %raw, "converted GitHub URL to raw URL");
        raw
    } else {
        source.to_string()
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Read labelled rows from a local CSV path or an http(s) URL.
pub fn load_source(
    source: &str,
    text_column: &str,
    label_column: &str,
) -> Result<Vec<ReviewRecord>> {
    if is_remote(source) {
        let url = resolve_source_url(source);
        let body = reqwest::blocking::get(&url)?.error_for_status()?.bytes()?;
        tracing::debug!(url = %url, bytes = body.len(), "source downloaded");
        read_labelled_csv(body.as_ref(), text_column, label_column)
    } else {
        read_labelled_csv(File::open(source)?, text_column, label_column)
    }
}

/// Shuffle with a seeded RNG and split off `test_size` of the rows
/// (rounded up) as the test set.
pub fn train_test_split(
    mut records: Vec<ReviewRecord>,
    test_size: f64,
    seed: u64,
) -> Result<(Vec<ReviewRecord>, Vec<ReviewRecord>)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(SentimentError::Config(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }
    if records.len() < 2 {
        return Err(SentimentError::InvalidDataset(format!(
            "need at least 2 labelled rows to split, got {}",
            records.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    records.shuffle(&mut rng);

    let n_test = ((records.len() as f64) * test_size).ceil() as usize;
    let n_test = n_test.clamp(1, records.len() - 1);
    let test = records.split_off(records.len() - n_test);
    Ok((records, test))
}

/// Ingestion stage: source CSV to `data/raw/{train,test}.csv`.
pub fn run(config: &AppConfig) -> Result<IngestSummary> {
    let data = &config.data;
    let records = load_source(&data.source, &data.text_column, &data.label_column)?;
    let (train, test) = train_test_split(records, data.test_size, data.seed)?;

    let raw_dir = data.raw_dir();
    let train_path = raw_dir.join(TRAIN_FILE);
    let test_path = raw_dir.join(TEST_FILE);
    write_records(&train_path, &train)?;
    write_records(&test_path, &test)?;

    tracing::info!(
        train = train.len(),
        test = test.len(),
        dir = %raw_dir.display(),
        "data ingestion completed"
    );
    Ok(IngestSummary {
        train_rows: train.len(),
        test_rows: test.len(),
        train_path,
        test_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SentimentLabel;

    fn records(n: usize) -> Vec<ReviewRecord> {
        (0..n)
            .map(|i| ReviewRecord {
                review: format!("review {i}"),
                sentiment: if i % 2 == 0 {
                    SentimentLabel::Positive
                } else {
                    SentimentLabel::Negative
                },
            })
            .collect()
    }

    #[test]
    fn test_github_blob_url_is_rewritten() {
        assert_eq!(
            resolve_source_url("https://github.com/acme/reviews/blob/main/notebooks/data.csv"),
            "https://raw.githubusercontent.com/acme/reviews/main/notebooks/data.csv"
        );
        assert_eq!(resolve_source_url("data/local.csv"), "data/local.csv");
    }

    #[test]
    fn test_split_sizes_and_determinism() {
        let (train, test) = train_test_split(records(10), 0.2, 42).unwrap();
        assert_eq!((train.len(), test.len()), (8, 2));

        let (train_again, test_again) = train_test_split(records(10), 0.2, 42).unwrap();
        assert_eq!(train, train_again);
        assert_eq!(test, test_again);
    }

    #[test]
    fn test_split_keeps_every_row() {
        let (train, test) = train_test_split(records(7), 0.3, 1).unwrap();
        let mut all: Vec<String> = train.into_iter().chain(test).map(|r| r.review).collect();
        all.sort();
        let mut expected: Vec<String> = records(7).into_iter().map(|r| r.review).collect();
        expected.sort();
        assert_eq!(all, expected);
    }

    #[test]
    fn test_too_few_rows_is_a_dataset_error() {
        let err = train_test_split(records(1), 0.2, 42).unwrap_err();
        assert!(matches!(err, SentimentError::InvalidDataset(_)));
    }

    #[test]
    fn test_invalid_test_size_rejected() {
        assert!(train_test_split(records(10), 0.0, 42).is_err());
        assert!(train_test_split(records(10), 1.5, 42).is_err());
    }
}

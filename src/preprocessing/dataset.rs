//! Dataset-level preprocessing: label mapping, normalization of every row and
//! the optional short-sentence filter.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::normalizer::TextNormalizer;
use crate::core::{Result, SentimentError, SentimentLabel};

/// Rows whose normalized text has fewer tokens than this are dropped when
/// short-row filtering is enabled.
pub const MIN_SENTENCE_TOKENS: usize = 3;

/// One labelled review as stored in the raw and interim CSV files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review: String,
    pub sentiment: SentimentLabel,
}

/// Read raw rows from any CSV source, mapping the label column at the
/// boundary. Rows with an unknown label are skipped and counted; a missing
/// column is an error.
pub fn read_labelled_csv<R: Read>(
    reader: R,
    text_column: &str,
    label_column: &str,
) -> Result<Vec<ReviewRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    let text_idx = column_index(&headers, text_column)?;
    let label_idx = column_index(&headers, label_column)?;

    let mut records = Vec::new();
    let mut rejected = 0usize;
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let Some(text) = row.get(text_idx) else {
            let err = SentimentError::Normalization(format!(
                "row {} has no '{text_column}' field",
                line + 1
            ));
            tracing::error!(error = %err, "malformed dataset row");
            return Err(err);
        };
        let Some(label) = row.get(label_idx) else {
            rejected += 1;
            continue;
        };
        match label.parse::<SentimentLabel>() {
            Ok(sentiment) => records.push(ReviewRecord {
                review: text.to_string(),
                sentiment,
            }),
            Err(_) => rejected += 1,
        }
    }

    if rejected > 0 {
        tracing::info!(rejected, kept = records.len(), "dropped rows with unmapped labels");
    }
    Ok(records)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| SentimentError::InvalidDataset(format!("missing column '{name}'")))
}

pub fn read_records(path: &Path) -> Result<Vec<ReviewRecord>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    tracing::debug!(path = %path.display(), rows = records.len(), "records loaded");
    Ok(records)
}

pub fn write_records(path: &Path, records: &[ReviewRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Options for [`preprocess_records`].
#[derive(Debug, Clone, Copy)]
pub struct PreprocessOptions {
    pub drop_short_rows: bool,
    pub min_tokens: usize,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            drop_short_rows: false,
            min_tokens: MIN_SENTENCE_TOKENS,
        }
    }
}

/// Normalize every review, dropping rows left empty and, when enabled, rows
/// shorter than `min_tokens`.
pub fn preprocess_records(
    normalizer: &TextNormalizer,
    records: Vec<ReviewRecord>,
    options: PreprocessOptions,
) -> Vec<ReviewRecord> {
    let total = records.len();
    let normalized: Vec<ReviewRecord> = records
        .into_iter()
        .map(|record| ReviewRecord {
            review: normalizer.normalize(&record.review),
            sentiment: record.sentiment,
        })
        .filter(|record| !record.review.is_empty())
        .collect();

    let kept = if options.drop_short_rows {
        filter_short_rows(normalized, options.min_tokens)
    } else {
        normalized
    };

    tracing::info!(total, kept = kept.len(), "data pre-processing completed");
    kept
}

/// Discard rows whose text has fewer than `min_tokens` whitespace tokens.
pub fn filter_short_rows(records: Vec<ReviewRecord>, min_tokens: usize) -> Vec<ReviewRecord> {
    records
        .into_iter()
        .filter(|record| record.review.split_whitespace().count() >= min_tokens)
        .collect()
}

/// Class balance of a record set, keyed by label.
pub fn label_counts(records: &[ReviewRecord]) -> HashMap<SentimentLabel, usize> {
    let mut counts = HashMap::new();
    for record in records {
        *counts.entry(record.sentiment).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(review: &str, sentiment: SentimentLabel) -> ReviewRecord {
        ReviewRecord {
            review: review.to_string(),
            sentiment,
        }
    }

    #[test]
    fn test_read_labelled_csv_maps_and_filters_labels() {
        let csv = "review,sentiment\n\"Great, loved it\",positive\nawful,negative\nmeh,neutral\n";
        let records = read_labelled_csv(csv.as_bytes(), "review", "sentiment").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sentiment, SentimentLabel::Positive);
        assert_eq!(records[0].review, "Great, loved it");
        assert_eq!(records[1].sentiment, SentimentLabel::Negative);
    }

    #[test]
    fn test_missing_text_column_is_an_error() {
        let csv = "text,sentiment\nhello,positive\n";
        let err = read_labelled_csv(csv.as_bytes(), "review", "sentiment").unwrap_err();
        assert!(matches!(err, SentimentError::InvalidDataset(_)));
        assert_eq!(err.kind(), "invalid_dataset");
    }

    #[test]
    fn test_row_without_text_field_is_an_error() {
        let csv = "sentiment,review\npositive,fine\nnegative\n";
        let err = read_labelled_csv(csv.as_bytes(), "review", "sentiment").unwrap_err();
        assert!(matches!(err, SentimentError::Normalization(_)));
    }

    #[test]
    fn test_short_rows_filtered_only_when_enabled() {
        let normalizer = TextNormalizer::new();
        let records = vec![
            record("Great phone, battery lasts days", SentimentLabel::Positive),
            record("Bad!", SentimentLabel::Negative),
            record("the of and", SentimentLabel::Negative),
        ];

        let kept = preprocess_records(&normalizer, records.clone(), PreprocessOptions::default());
        assert_eq!(kept.len(), 2, "empty rows always dropped");

        let kept = preprocess_records(
            &normalizer,
            records,
            PreprocessOptions {
                drop_short_rows: true,
                min_tokens: MIN_SENTENCE_TOKENS,
            },
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].review, "great phone battery last day");
    }

    #[test]
    fn test_records_roundtrip_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interim").join("train_processed.csv");
        let records = vec![record("good movie", SentimentLabel::Positive)];
        write_records(&path, &records).unwrap();
        assert_eq!(read_records(&path).unwrap(), records);
    }
}

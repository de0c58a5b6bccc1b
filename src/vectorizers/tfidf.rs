use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{analyze, CountVectorizer};
use crate::core::{Result, SentimentError};

/// TF-IDF vectorizer with smoothed IDF and L2-normalized rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    counts: CountVectorizer,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.counts = self.counts.with_max_features(max_features);
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.counts.is_fitted() && self.idf.len() == self.counts.width()
    }

    pub fn width(&self) -> usize {
        self.counts.width()
    }

    pub fn terms(&self) -> &[String] {
        self.counts.terms()
    }

    /// Check that a deserialized artifact has a consistent vocabulary and
    /// one IDF weight per column.
    pub fn validate(&self) -> Result<()> {
        self.counts.validate()?;
        if self.idf.len() != self.counts.width() {
            return Err(SentimentError::InvalidArtifact(format!(
                "{} idf weights for {} terms",
                self.idf.len(),
                self.counts.width()
            )));
        }
        Ok(())
    }

    /// `idf(t) = ln((1 + n) / (1 + df(t))) + 1`
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        self.counts.fit(documents)?;

        let mut doc_freq = vec![0usize; self.counts.width()];
        for doc in documents {
            let unique: HashSet<String> = analyze(doc.as_ref()).into_iter().collect();
            for term in unique {
                if let Some(idx) = self.counts.index_of(&term) {
                    doc_freq[idx] += 1;
                }
            }
        }

        let n = documents.len() as f32;
        self.idf = doc_freq
            .into_iter()
            .map(|df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();
        Ok(())
    }

    pub fn transform(&self, document: &str) -> Result<Vec<f32>> {
        if !self.is_fitted() {
            return Err(SentimentError::NotFitted("tf-idf vectorizer".to_string()));
        }
        let mut row = self.counts.transform(document)?;
        for (value, idf) in row.iter_mut().zip(&self.idf) {
            *value *= idf;
        }
        let norm = row.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(row)
    }
}

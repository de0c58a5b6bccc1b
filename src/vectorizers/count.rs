use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::analyze;
use crate::core::{Result, SentimentError};

/// Bag-of-words vectorizer: one column per vocabulary term, holding the
/// term's count in the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountVectorizer {
    max_features: Option<usize>,
    vocabulary: HashMap<String, usize>,
    terms: Vec<String>,
}

impl CountVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the `max_features` most frequent terms of the fit corpus.
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.terms.is_empty()
    }

    /// Number of columns produced by [`transform`](Self::transform).
    pub fn width(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Learn the vocabulary. Columns are ordered alphabetically; when the
    /// vocabulary is capped, the most frequent terms win and ties go to the
    /// alphabetically smaller term.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        let mut frequency: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            for token in analyze(doc.as_ref()) {
                *frequency.entry(token).or_insert(0) += 1;
            }
        }
        if frequency.is_empty() {
            return Err(SentimentError::NotFitted(
                "empty vocabulary; documents contain no tokens".to_string(),
            ));
        }

        let mut ranked: Vec<(String, usize)> = frequency.into_iter().collect();
        if let Some(limit) = self.max_features {
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            ranked.truncate(limit);
            ranked.sort_by(|a, b| a.0.cmp(&b.0));
        }

        self.terms = ranked.into_iter().map(|(term, _)| term).collect();
        self.vocabulary = self
            .terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();
        Ok(())
    }

    /// Raw term counts for one document. Out-of-vocabulary tokens are dropped.
    pub fn transform(&self, document: &str) -> Result<Vec<f32>> {
        if !self.is_fitted() {
            return Err(SentimentError::NotFitted("count vectorizer".to_string()));
        }
        let mut row = vec![0.0f32; self.width()];
        for token in analyze(document) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                let cell = row.get_mut(idx).ok_or_else(|| {
                    SentimentError::Transform(format!(
                        "term {token:?} maps to column {idx}, width is {}",
                        self.width()
                    ))
                })?;
                *cell += 1.0;
            }
        }
        Ok(row)
    }

    /// Check that a deserialized vocabulary agrees with its term list: one
    /// entry per term, each term at its own column.
    pub fn validate(&self) -> Result<()> {
        if self.vocabulary.len() != self.terms.len() {
            return Err(SentimentError::InvalidArtifact(format!(
                "vocabulary has {} entries for {} terms",
                self.vocabulary.len(),
                self.terms.len()
            )));
        }
        for (idx, term) in self.terms.iter().enumerate() {
            if self.vocabulary.get(term) != Some(&idx) {
                return Err(SentimentError::InvalidArtifact(format!(
                    "term {term:?} is not mapped to column {idx}"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_orders_terms_alphabetically() {
        let mut v = CountVectorizer::new();
        v.fit(&["the cat sat", "a dog sat"]).unwrap();
        assert_eq!(v.terms(), ["cat", "dog", "sat", "the"]);
    }

    #[test]
    fn test_transform_counts_and_drops_unknown_tokens() {
        let mut v = CountVectorizer::new();
        v.fit(&["good movie", "bad movie"]).unwrap();
        let row = v.transform("good good plot").unwrap();
        assert_eq!(row, vec![0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let mut v = CountVectorizer::new().with_max_features(2);
        v.fit(&["zeta alpha", "zeta beta", "zeta alpha gamma"]).unwrap();
        assert_eq!(v.terms(), ["alpha", "zeta"]);
        assert_eq!(v.width(), 2);
    }

    #[test]
    fn test_validate_rejects_out_of_range_index() {
        let v: CountVectorizer =
            serde_json::from_str(r#"{"vocabulary":{"great":7},"terms":["great"]}"#).unwrap();
        assert!(matches!(v.validate(), Err(SentimentError::InvalidArtifact(_))));
        assert!(matches!(v.transform("great phone"), Err(SentimentError::Transform(_))));
    }

    #[test]
    fn test_validate_accepts_fitted_vocabulary() {
        let mut v = CountVectorizer::new();
        v.fit(&["good movie", "bad movie"]).unwrap();
        assert!(v.validate().is_ok());
    }

    #[test]
    fn test_unfitted_transform_fails() {
        let v = CountVectorizer::new();
        assert!(matches!(v.transform("x"), Err(SentimentError::NotFitted(_))));
    }
}

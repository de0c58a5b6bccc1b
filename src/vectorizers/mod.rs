//! Fixed-vocabulary text vectorizers.
//!
//! A vectorizer is fitted once during feature engineering, persisted as a JSON
//! artifact and loaded once by the inference service. Its width is fixed at
//! fit time: every [`FeatureVector`] it produces afterwards has exactly
//! [`Vectorizer::width`] columns, whatever the input text.

pub mod count;
pub mod tfidf;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Result, SentimentError};

pub use count::CountVectorizer;
pub use tfidf::TfidfVectorizer;

/// Sentence used to fit the stand-in vectorizer when no artifact can be
/// loaded.
pub const PLACEHOLDER_SENTENCE: &str = "This is a sample text to initialize the vectorizer";

/// Vocabulary cap of the stand-in vectorizer.
pub const FALLBACK_MAX_FEATURES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorizerKind {
    Bow,
    Tfidf,
}

/// Fixed-width numeric representation of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn width(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(values: Vec<f32>) -> Self {
        FeatureVector(values)
    }
}

/// A fitted vectorizer of either kind, as stored in the artifact file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Vectorizer {
    Bow(CountVectorizer),
    Tfidf(TfidfVectorizer),
}

impl Vectorizer {
    pub fn new(kind: VectorizerKind, max_features: Option<usize>) -> Self {
        match (kind, max_features) {
            (VectorizerKind::Bow, Some(n)) => {
                Vectorizer::Bow(CountVectorizer::new().with_max_features(n))
            }
            (VectorizerKind::Bow, None) => Vectorizer::Bow(CountVectorizer::new()),
            (VectorizerKind::Tfidf, Some(n)) => {
                Vectorizer::Tfidf(TfidfVectorizer::new().with_max_features(n))
            }
            (VectorizerKind::Tfidf, None) => Vectorizer::Tfidf(TfidfVectorizer::new()),
        }
    }

    /// The stand-in used when the persisted artifact is missing or unreadable:
    /// a count vectorizer fitted on [`PLACEHOLDER_SENTENCE`].
    pub fn placeholder() -> Result<Self> {
        let mut vectorizer = Vectorizer::new(VectorizerKind::Bow, Some(FALLBACK_MAX_FEATURES));
        vectorizer.fit(&[PLACEHOLDER_SENTENCE])?;
        Ok(vectorizer)
    }

    pub fn kind(&self) -> VectorizerKind {
        match self {
            Vectorizer::Bow(_) => VectorizerKind::Bow,
            Vectorizer::Tfidf(_) => VectorizerKind::Tfidf,
        }
    }

    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        match self {
            Vectorizer::Bow(v) => v.fit(documents),
            Vectorizer::Tfidf(v) => v.fit(documents),
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Vectorizer::Bow(v) => v.width(),
            Vectorizer::Tfidf(v) => v.width(),
        }
    }

    pub fn terms(&self) -> &[String] {
        match self {
            Vectorizer::Bow(v) => v.terms(),
            Vectorizer::Tfidf(v) => v.terms(),
        }
    }

    pub fn transform(&self, document: &str) -> Result<FeatureVector> {
        let row = match self {
            Vectorizer::Bow(v) => v.transform(document)?,
            Vectorizer::Tfidf(v) => v.transform(document)?,
        };
        if row.len() != self.width() {
            return Err(SentimentError::Transform(format!(
                "vectorizer produced {} columns, fitted width is {}",
                row.len(),
                self.width()
            )));
        }
        Ok(FeatureVector(row))
    }

    pub fn transform_batch<S: AsRef<str>>(&self, documents: &[S]) -> Result<Vec<FeatureVector>> {
        documents
            .iter()
            .map(|doc| self.transform(doc.as_ref()))
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let vectorizer: Vectorizer = serde_json::from_reader(reader)?;
        if vectorizer.width() == 0 {
            return Err(SentimentError::NotFitted(format!(
                "artifact {} holds an unfitted vectorizer",
                path.display()
            )));
        }
        vectorizer.validate()?;
        Ok(vectorizer)
    }

    /// Structural consistency of a fitted vectorizer, checked on load.
    pub fn validate(&self) -> Result<()> {
        match self {
            Vectorizer::Bow(v) => v.validate(),
            Vectorizer::Tfidf(v) => v.validate(),
        }
    }
}

/// Tokenizer shared by every vectorizer: lowercase, split on anything that
/// is not a word character, keep tokens of at least two characters.
pub fn analyze(document: &str) -> Vec<String> {
    document
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

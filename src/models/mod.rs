//! Sentiment classifiers served by the inference pipeline.
//!
//! - [`LinearSentimentModel`] - Trained logistic regression loaded from the
//!   model registry
//! - [`KeywordSentimentModel`] - Deterministic keyword-count fallback
//!
//! Which one serves a process is decided once at startup and captured as a
//! [`SentimentModel`].

pub mod keyword;
pub mod linear;

pub use keyword::KeywordSentimentModel;
pub use linear::LinearSentimentModel;

use std::fmt;

/// Classifier chosen at startup.
#[derive(Debug, Clone)]
pub enum SentimentModel {
    Trained(LinearSentimentModel),
    Fallback(KeywordSentimentModel),
}

impl SentimentModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            SentimentModel::Trained(_) => ModelKind::Registered,
            SentimentModel::Fallback(_) => ModelKind::Fallback,
        }
    }
}

/// Which classifier produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Registered,
    Fallback,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Registered => "Registered Model",
            ModelKind::Fallback => "Fallback Keyword Model",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

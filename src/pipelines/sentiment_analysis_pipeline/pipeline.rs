use std::fmt;

use crate::core::{Result, SentimentError, SentimentLabel};
use crate::models::{KeywordSentimentModel, ModelKind, SentimentModel};
use crate::preprocessing::TextNormalizer;
use crate::registry::ModelVersion;
use crate::vectorizers::Vectorizer;

/// Service-level readiness, fixed once the pipeline is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    ModelReady,
    FallbackReady,
    Unavailable,
}

impl ServiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::ModelReady => "Using Registered Model",
            ServiceStatus::FallbackReady => {
                "Using Fallback Keyword Model (registered model not found)"
            }
            ServiceStatus::Unavailable => "Not Available",
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: SentimentLabel,
    pub model_kind: ModelKind,
    /// The normalized text the classifier saw.
    pub normalized: String,
}

/// Normalizes raw text and classifies it with the model chosen at startup.
///
/// Built once per process by
/// [`SentimentAnalysisPipelineBuilder`](super::SentimentAnalysisPipelineBuilder)
/// and shared read-only afterwards.
#[derive(Debug)]
pub struct SentimentAnalysisPipeline {
    pub(crate) normalizer: TextNormalizer,
    pub(crate) model: Option<SentimentModel>,
    pub(crate) vectorizer: Option<Vectorizer>,
    pub(crate) model_version: Option<ModelVersion>,
}

impl SentimentAnalysisPipeline {
    /// Assemble a pipeline from already-loaded parts.
    pub fn from_parts(model: Option<SentimentModel>, vectorizer: Option<Vectorizer>) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            model,
            vectorizer,
            model_version: None,
        }
    }

    /// Keyword fallback with the placeholder vectorizer.
    pub fn fallback() -> Result<Self> {
        Ok(Self::from_parts(
            Some(SentimentModel::Fallback(KeywordSentimentModel::new())),
            Some(Vectorizer::placeholder()?),
        ))
    }

    pub fn status(&self) -> ServiceStatus {
        match (&self.model, &self.vectorizer) {
            (None, None) => ServiceStatus::Unavailable,
            (Some(SentimentModel::Trained(_)), _) => ServiceStatus::ModelReady,
            _ => ServiceStatus::FallbackReady,
        }
    }

    pub fn model_version(&self) -> Option<&ModelVersion> {
        self.model_version.as_ref()
    }

    pub fn vectorizer(&self) -> Option<&Vectorizer> {
        self.vectorizer.as_ref()
    }

    pub fn model(&self) -> Option<&SentimentModel> {
        self.model.as_ref()
    }

    /// Classify one request. `None` means the caller sent no text field.
    pub fn classify(&self, text: Option<&str>) -> Result<Prediction> {
        let text = text.ok_or(SentimentError::MissingField("text"))?;
        if self.status() == ServiceStatus::Unavailable {
            return Err(SentimentError::ModelUnavailable);
        }

        let normalized = self.normalizer.normalize(text);
        let (label, model_kind) = match &self.model {
            Some(SentimentModel::Trained(model)) => {
                let vectorizer = self.vectorizer.as_ref().ok_or_else(|| {
                    SentimentError::Transform("vectorizer not loaded".to_string())
                })?;
                let features = vectorizer.transform(&normalized)?;
                (model.predict(&features)?, ModelKind::Registered)
            }
            Some(SentimentModel::Fallback(model)) => {
                (model.predict(&normalized), ModelKind::Fallback)
            }
            None => (
                KeywordSentimentModel::new().predict(&normalized),
                ModelKind::Fallback,
            ),
        };

        tracing::debug!(label = %label, model = %model_kind, "text classified");
        Ok(Prediction {
            label,
            model_kind,
            normalized,
        })
    }

    pub fn predict(&self, text: &str) -> Result<Prediction> {
        self.classify(Some(text))
    }
}

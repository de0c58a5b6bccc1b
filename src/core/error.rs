use thiserror::Error;

use crate::registry::RegistryError;

/// Error type shared by the normalizer, vectorizers, models and the
/// inference pipeline.
#[derive(Debug, Error)]
pub enum SentimentError {
    // Request path
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("model or vectorizer not loaded, please check server logs")]
    ModelUnavailable,

    #[error("normalization failed: {0}")]
    Normalization(String),

    #[error("transform failed: {0}")]
    Transform(String),

    #[error("prediction failed: {0}")]
    Prediction(String),

    // Data boundary
    #[error("invalid sentiment label {0:?}, expected \"positive\" or \"negative\"")]
    InvalidLabel(String),

    #[error("vectorizer has not been fitted: {0}")]
    NotFitted(String),

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("download failed: {0}")]
    Download(String),

    // Pass-through from dependencies
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SentimentError>;

impl From<reqwest::Error> for SentimentError {
    fn from(value: reqwest::Error) -> Self {
        SentimentError::Download(value.to_string())
    }
}

impl From<config::ConfigError> for SentimentError {
    fn from(value: config::ConfigError) -> Self {
        SentimentError::Config(value.to_string())
    }
}

impl SentimentError {
    /// Short machine-readable kind, used in logs and HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            SentimentError::MissingField(_) => "missing_field",
            SentimentError::ModelUnavailable => "model_unavailable",
            SentimentError::Normalization(_) => "normalization_error",
            SentimentError::Transform(_) => "transform_error",
            SentimentError::Prediction(_) => "prediction_error",
            SentimentError::InvalidLabel(_) => "invalid_label",
            SentimentError::NotFitted(_) => "not_fitted",
            SentimentError::InvalidDataset(_) => "invalid_dataset",
            SentimentError::InvalidArtifact(_) => "invalid_artifact",
            SentimentError::Config(_) => "config_error",
            SentimentError::Download(_) => "download_error",
            SentimentError::Registry(_) => "registry_error",
            SentimentError::Candle(_) => "candle_error",
            SentimentError::Io(_) => "io_error",
            SentimentError::Csv(_) => "csv_error",
            SentimentError::SerdeJson(_) => "json_error",
        }
    }
}

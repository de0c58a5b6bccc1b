pub mod core;
pub mod loaders;
pub mod models;
pub mod pipelines;
pub mod preprocessing;
pub mod registry;
pub mod server;
pub mod training;
pub mod vectorizers;

// Re-export the types most callers need
pub use crate::core::{AppConfig, Result, SentimentError, SentimentLabel};
pub use models::{ModelKind, SentimentModel};
pub use pipelines::{
    Prediction, SentimentAnalysisPipeline, SentimentAnalysisPipelineBuilder, ServiceStatus,
};
pub use preprocessing::{normalize_text, TextNormalizer};
pub use vectorizers::{FeatureVector, Vectorizer, VectorizerKind};

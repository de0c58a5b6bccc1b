//! Sentiment analysis pipeline: normalization plus classification with the
//! model selected at startup.
//!
//! ## Main Types
//!
//! - [`SentimentAnalysisPipeline`] - Classifies raw text
//! - [`SentimentAnalysisPipelineBuilder`] - Loads the registered model and the
//!   vectorizer, substituting fallbacks on failure
//! - [`Prediction`] - Label plus the kind of model that produced it
//! - [`ServiceStatus`] - Readiness reported by the service
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sentiment_ops::pipelines::sentiment_analysis_pipeline::*;
//! use sentiment_ops::pipelines::utils::DeviceSelectable;
//! use sentiment_ops::registry::LocalRegistry;
//!
//! let pipeline = SentimentAnalysisPipelineBuilder::new("my_model")
//!     .registry(LocalRegistry::new("registry"))
//!     .vectorizer_path("models/vectorizer.json")
//!     .cpu()
//!     .build();
//!
//! let prediction = pipeline.predict("I love this product!")?;
//! println!("{} ({})", prediction.label, prediction.model_kind);
//! # Ok::<(), sentiment_ops::core::SentimentError>(())
//! ```

pub mod builder;
pub mod pipeline;

pub use builder::SentimentAnalysisPipelineBuilder;
pub use pipeline::{Prediction, SentimentAnalysisPipeline, ServiceStatus};

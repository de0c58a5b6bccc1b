//! Batch stages that produce the artifacts the inference service loads.
//!
//! Each stage reads the previous stage's files under the configured data,
//! model and report directories:
//!
//! `ingest -> preprocess -> features -> train -> evaluate -> register -> promote`
//!
//! Stage errors are logged and returned to the caller; nothing is retried.

pub mod evaluation;
pub mod features;
pub mod ingestion;
pub mod preprocess;
pub mod registration;
pub mod trainer;

pub use evaluation::{EvaluationMetrics, ExperimentInfo};
pub use features::FeatureMatrix;
pub use trainer::LogisticRegressionTrainer;

use crate::core::{AppConfig, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Preprocess,
    Features,
    Train,
    Evaluate,
    Register,
    Promote,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Preprocess => "preprocess",
            Stage::Features => "features",
            Stage::Train => "train",
            Stage::Evaluate => "evaluate",
            Stage::Register => "register",
            Stage::Promote => "promote",
        }
    }
}

/// Run one stage, logging any failure before returning it.
pub fn run_stage(stage: Stage, config: &AppConfig) -> Result<()> {
    let _span = tracing::info_span!("stage", name = stage.name()).entered();
    let result = match stage {
        Stage::Ingest => ingestion::run(config).map(drop),
        Stage::Preprocess => preprocess::run(config).map(drop),
        Stage::Features => features::run(config).map(drop),
        Stage::Train => trainer::run(config).map(drop),
        Stage::Evaluate => evaluation::run(config).map(drop),
        Stage::Register => registration::run(config).map(drop),
        Stage::Promote => registration::promote(config).map(drop),
    };
    result.inspect_err(|e| {
        tracing::error!(stage = stage.name(), kind = e.kind(), error = %e, "stage failed")
    })
}

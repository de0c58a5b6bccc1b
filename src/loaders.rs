//! Startup loaders for the registered model and the vectorizer artifact.
//!
//! Both loaders report their outcome as a value instead of failing: the
//! pipeline builder decides what to substitute. Nothing here is retried; a
//! failed load holds for the lifetime of the process.
//!
//! - [`load_registered_model`] - Latest `Production` version, else latest
//!   version with no stage, else [`ModelLoad::Unavailable`]
//! - [`load_vectorizer`] - The persisted artifact, else the placeholder
//!   count vectorizer

use std::path::Path;

use candle_core::Device;

use crate::models::LinearSentimentModel;
use crate::registry::{ModelRegistry, ModelVersion, Stage};
use crate::vectorizers::Vectorizer;

/// Stages searched for a servable version, in order.
pub const LOOKUP_STAGES: [Stage; 2] = [Stage::Production, Stage::None];

#[derive(Debug)]
pub enum ModelLoad {
    Loaded(LinearSentimentModel, ModelVersion),
    Unavailable(String),
}

#[derive(Debug)]
pub enum VectorizerLoad {
    Loaded(Vectorizer),
    /// The artifact could not be used; carries the placeholder vectorizer,
    /// or `None` if even that could not be built.
    Fallback(Option<Vectorizer>, String),
}

/// Resolve the version to serve: latest in `Production`, else latest with no
/// stage.
pub fn find_servable_version(
    registry: &dyn ModelRegistry,
    name: &str,
) -> Result<Option<ModelVersion>, crate::registry::RegistryError> {
    for stage in LOOKUP_STAGES {
        if let Some(version) = registry.get_latest_version(name, stage)? {
            return Ok(Some(version));
        }
    }
    Ok(None)
}

pub fn load_registered_model(
    registry: &dyn ModelRegistry,
    name: &str,
    device: &Device,
) -> ModelLoad {
    let version = match find_servable_version(registry, name) {
        Ok(Some(version)) => version,
        Ok(None) => {
            return ModelLoad::Unavailable(format!(
                "no servable version of '{name}' in {}",
                registry.describe()
            ))
        }
        Err(e) => return ModelLoad::Unavailable(format!("registry lookup failed: {e}")),
    };

    let path = match registry.artifact_path(&version) {
        Ok(path) => path,
        Err(e) => return ModelLoad::Unavailable(format!("artifact unavailable: {e}")),
    };

    match LinearSentimentModel::load(&path, device) {
        Ok(model) => {
            tracing::info!(
                model = name,
                version = version.version,
                stage = %version.stage,
                "registered model loaded"
            );
            ModelLoad::Loaded(model, version)
        }
        Err(e) => ModelLoad::Unavailable(format!(
            "failed to load {}: {e}",
            path.display()
        )),
    }
}

pub fn load_vectorizer(path: &Path) -> VectorizerLoad {
    match Vectorizer::load(path) {
        Ok(vectorizer) => {
            tracing::info!(path = %path.display(), width = vectorizer.width(), "vectorizer loaded");
            VectorizerLoad::Loaded(vectorizer)
        }
        Err(e) => {
            let reason = format!("could not load vectorizer from {}: {e}", path.display());
            match Vectorizer::placeholder() {
                Ok(placeholder) => VectorizerLoad::Fallback(Some(placeholder), reason),
                Err(placeholder_err) => VectorizerLoad::Fallback(
                    None,
                    format!("{reason}; placeholder failed: {placeholder_err}"),
                ),
            }
        }
    }
}

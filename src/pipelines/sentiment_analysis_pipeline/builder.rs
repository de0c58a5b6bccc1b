use std::path::PathBuf;

use super::pipeline::SentimentAnalysisPipeline;
use crate::core::config::ModelConfig;
use crate::loaders::{load_registered_model, load_vectorizer, ModelLoad, VectorizerLoad};
use crate::models::{KeywordSentimentModel, SentimentModel};
use crate::pipelines::utils::{DeviceRequest, DeviceSelectable};
use crate::preprocessing::TextNormalizer;
use crate::registry::{HubRegistry, LocalRegistry, ModelRegistry};

pub struct SentimentAnalysisPipelineBuilder {
    registry: Option<Box<dyn ModelRegistry>>,
    model_name: String,
    vectorizer_path: PathBuf,
    device_request: DeviceRequest,
}

impl SentimentAnalysisPipelineBuilder {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            registry: None,
            model_name: model_name.into(),
            vectorizer_path: PathBuf::from("models/vectorizer.json"),
            device_request: DeviceRequest::Default,
        }
    }

    /// Builder wired from the `model` configuration section. A hub registry
    /// that cannot be reached leaves the builder without a registry, which
    /// downgrades the service to the keyword fallback.
    pub fn from_config(config: &ModelConfig) -> Self {
        let mut builder =
            Self::new(config.name.clone()).vectorizer_path(config.vectorizer_path.clone());
        if config.cpu {
            builder = builder.cpu();
        }
        match &config.hub_repo {
            Some(repo) => match HubRegistry::new(repo, &config.hub_revision) {
                Ok(registry) => builder.registry(registry),
                Err(e) => {
                    tracing::warn!(repo = %repo, error = %e, "hub registry unavailable");
                    builder
                }
            },
            None => builder.registry(LocalRegistry::new(config.registry_dir.clone())),
        }
    }

    pub fn registry(mut self, registry: impl ModelRegistry + 'static) -> Self {
        self.registry = Some(Box::new(registry));
        self
    }

    pub fn vectorizer_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.vectorizer_path = path.into();
        self
    }

    /// Load model and vectorizer once. Never fails: each load failure is
    /// logged and replaced by its fallback.
    pub fn build(self) -> SentimentAnalysisPipeline {
        let device = self.device_request.resolve_or_cpu();

        let load = match &self.registry {
            Some(registry) => load_registered_model(registry.as_ref(), &self.model_name, &device),
            None => ModelLoad::Unavailable("no model registry configured".to_string()),
        };
        let (model, model_version) = match load {
            ModelLoad::Loaded(model, version) => (SentimentModel::Trained(model), Some(version)),
            ModelLoad::Unavailable(reason) => {
                tracing::warn!(model = %self.model_name, %reason, "using fallback keyword model");
                (SentimentModel::Fallback(KeywordSentimentModel::new()), None)
            }
        };

        let vectorizer = match load_vectorizer(&self.vectorizer_path) {
            VectorizerLoad::Loaded(v) => Some(v),
            VectorizerLoad::Fallback(v, reason) => {
                tracing::warn!(%reason, "using placeholder vectorizer");
                v
            }
        };

        if let (SentimentModel::Trained(m), Some(v)) = (&model, &vectorizer) {
            if m.n_features() != v.width() {
                tracing::warn!(
                    model_width = m.n_features(),
                    vectorizer_width = v.width(),
                    "model and vectorizer widths differ; predictions will fail"
                );
            }
        }

        SentimentAnalysisPipeline {
            normalizer: TextNormalizer::new(),
            model: Some(model),
            vectorizer,
            model_version,
        }
    }
}

impl DeviceSelectable for SentimentAnalysisPipelineBuilder {
    fn device_request_mut(&mut self) -> &mut DeviceRequest {
        &mut self.device_request
    }
}

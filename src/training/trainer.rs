use std::path::{Path, PathBuf};

use candle_core::{DType, Device};
use candle_nn::{AdamW, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap};

use super::features::{read_feature_csv, FeatureMatrix, TRAIN_FEATURES_FILE};
use crate::core::config::TrainingConfig;
use crate::core::{AppConfig, Result, SentimentError};
use crate::models::LinearSentimentModel;
use crate::pipelines::utils::DeviceRequest;

/// Logistic regression: a `width -> 1` linear layer fitted with AdamW on
/// binary cross-entropy.
pub struct LogisticRegressionTrainer {
    epochs: usize,
    learning_rate: f64,
    weight_decay: f64,
    device: Device,
}

/// A trained classifier together with the variables backing it.
pub struct TrainedModel {
    pub model: LinearSentimentModel,
    pub final_loss: f32,
    varmap: VarMap,
}

impl TrainedModel {
    /// Save as safetensors (`classifier.weight`, `classifier.bias`).
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.varmap.save(path)?;
        Ok(())
    }
}

impl LogisticRegressionTrainer {
    pub fn new(config: &TrainingConfig, device: Device) -> Self {
        Self {
            epochs: config.epochs,
            learning_rate: config.learning_rate,
            weight_decay: config.weight_decay,
            device,
        }
    }

    pub fn fit(&self, data: &FeatureMatrix) -> Result<TrainedModel> {
        if data.is_empty() || data.width() == 0 {
            return Err(SentimentError::Prediction(
                "cannot train on an empty feature matrix".to_string(),
            ));
        }

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &self.device);
        let classifier = candle_nn::linear(data.width(), 1, vb.pp("classifier"))?;

        let params = ParamsAdamW {
            lr: self.learning_rate,
            weight_decay: self.weight_decay,
            ..Default::default()
        };
        let mut optimizer = AdamW::new(varmap.all_vars(), params)?;

        // n x width, n x 1
        let inputs = data.features(&self.device)?;
        let targets = data.targets(&self.device)?;

        let mut final_loss = f32::NAN;
        for epoch in 0..self.epochs {
            let logits = classifier.forward(&inputs)?;
            let loss = candle_nn::loss::binary_cross_entropy_with_logit(&logits, &targets)?;
            optimizer.backward_step(&loss)?;

            final_loss = loss.to_scalar::<f32>()?;
            if epoch % 50 == 0 {
                tracing::debug!(epoch, loss = final_loss, "training step");
            }
        }

        tracing::info!(
            epochs = self.epochs,
            rows = data.len(),
            loss = final_loss,
            "model training completed"
        );
        Ok(TrainedModel {
            model: LinearSentimentModel::new(classifier, data.width(), self.device.clone()),
            final_loss,
            varmap,
        })
    }
}

/// Training stage: train features to `models/model.safetensors`.
pub fn run(config: &AppConfig) -> Result<PathBuf> {
    let data = read_feature_csv(&config.data.processed_dir().join(TRAIN_FEATURES_FILE))?;
    let device = if config.model.cpu {
        DeviceRequest::Cpu.resolve_or_cpu()
    } else {
        DeviceRequest::Default.resolve_or_cpu()
    };

    let trained = LogisticRegressionTrainer::new(&config.training, device).fit(&data)?;
    let path = config.paths.model_path();
    trained.save(&path)?;
    tracing::info!(path = %path.display(), "model saved");
    Ok(path)
}

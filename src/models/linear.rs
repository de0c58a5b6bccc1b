use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module};

use crate::core::{Result, SentimentError, SentimentLabel};
use crate::vectorizers::FeatureVector;

/// Tensor names in the saved artifact.
pub const WEIGHT_NAME: &str = "classifier.weight";
pub const BIAS_NAME: &str = "classifier.bias";

/// Logistic-regression classifier: one linear layer over a feature vector
/// followed by a sigmoid.
#[derive(Debug, Clone)]
pub struct LinearSentimentModel {
    classifier: Linear,
    n_features: usize,
    device: Device,
}

impl LinearSentimentModel {
    pub fn new(classifier: Linear, n_features: usize, device: Device) -> Self {
        Self {
            classifier,
            n_features,
            device,
        }
    }

    /// Load `classifier.weight` (`1 x n`) and `classifier.bias` (`1`) from a
    /// safetensors file.
    pub fn load(path: &Path, device: &Device) -> Result<Self> {
        let mut tensors = candle_core::safetensors::load(path, device)?;
        let weight = tensors.remove(WEIGHT_NAME).ok_or_else(|| {
            SentimentError::InvalidArtifact(format!(
                "{} has no tensor {WEIGHT_NAME}",
                path.display()
            ))
        })?;
        let bias = tensors.remove(BIAS_NAME).ok_or_else(|| {
            SentimentError::InvalidArtifact(format!(
                "{} has no tensor {BIAS_NAME}",
                path.display()
            ))
        })?;

        let (rows, n_features) = weight.dims2()?;
        if rows != 1 || bias.elem_count() != 1 {
            return Err(SentimentError::InvalidArtifact(format!(
                "expected a single-output classifier, got weight {:?} and bias {:?}",
                weight.dims(),
                bias.dims()
            )));
        }

        let weight = weight.to_dtype(DType::F32)?;
        let bias = bias.to_dtype(DType::F32)?.reshape(1)?;
        Ok(Self::new(Linear::new(weight, Some(bias)), n_features, device.clone()))
    }

    /// Width of the feature vectors this model accepts.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Probability of the positive class.
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<f32> {
        if features.width() != self.n_features {
            return Err(SentimentError::Transform(format!(
                "feature width {} does not match model input width {}",
                features.width(),
                self.n_features
            )));
        }
        let probability = self
            .forward_probability(features)
            .map_err(|e| SentimentError::Prediction(e.to_string()))?;
        Ok(probability)
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<SentimentLabel> {
        self.predict_proba(features)
            .map(SentimentLabel::from_probability)
    }

    fn forward_probability(&self, features: &FeatureVector) -> candle_core::Result<f32> {
        // 1 x n
        let input = Tensor::from_slice(features.as_slice(), (1, self.n_features), &self.device)?;
        // 1 x 1
        let logits = self.classifier.forward(&input)?;
        let probability = candle_nn::ops::sigmoid(&logits)?;
        probability.flatten_all()?.get(0)?.to_scalar::<f32>()
    }

    /// Logits for a batch of rows (`batch x n`), used by evaluation.
    pub fn forward_batch(&self, inputs: &Tensor) -> Result<Tensor> {
        Ok(self.classifier.forward(inputs)?.flatten_all()?)
    }
}

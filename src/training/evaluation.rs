use std::path::Path;

use serde::{Deserialize, Serialize};

use super::features::{read_feature_csv, FeatureMatrix, TEST_FEATURES_FILE};
use crate::core::{AppConfig, Result, SentimentLabel};
use crate::models::LinearSentimentModel;
use crate::pipelines::utils::DeviceRequest;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub auc: f64,
}

/// Pointer from an evaluation run to the artifact that was evaluated,
/// consumed by registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentInfo {
    pub run_id: String,
    pub model_path: String,
}

/// Metrics at the 0.5 probability threshold. Precision and recall are 0.0
/// when their denominator is zero.
pub fn compute_metrics(labels: &[SentimentLabel], probabilities: &[f32]) -> EvaluationMetrics {
    let (mut tp, mut fp, mut tn, mut fn_) = (0usize, 0usize, 0usize, 0usize);
    for (label, &p) in labels.iter().zip(probabilities) {
        match (SentimentLabel::from_probability(p), label) {
            (SentimentLabel::Positive, SentimentLabel::Positive) => tp += 1,
            (SentimentLabel::Positive, SentimentLabel::Negative) => fp += 1,
            (SentimentLabel::Negative, SentimentLabel::Negative) => tn += 1,
            (SentimentLabel::Negative, SentimentLabel::Positive) => fn_ += 1,
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    EvaluationMetrics {
        accuracy: ratio(tp + tn, tp + fp + tn + fn_),
        precision: ratio(tp, tp + fp),
        recall: ratio(tp, tp + fn_),
        auc: roc_auc(labels, probabilities),
    }
}

/// Area under the ROC curve from the rank-sum statistic. Tied scores share
/// their average rank; 0.5 when either class is absent.
pub fn roc_auc(labels: &[SentimentLabel], scores: &[f32]) -> f64 {
    let n = labels.len().min(scores.len());
    let positives = labels[..n]
        .iter()
        .filter(|&&l| l == SentimentLabel::Positive)
        .count();
    let negatives = n - positives;
    if positives == 0 || negatives == 0 {
        return 0.5;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        // 1-based ranks i+1..=j+1 share their mean
        let rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }

    let positive_rank_sum: f64 = (0..n)
        .filter(|&idx| labels[idx] == SentimentLabel::Positive)
        .map(|idx| ranks[idx])
        .sum();
    let p = positives as f64;
    (positive_rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64)
}

pub fn evaluate_model(
    model: &LinearSentimentModel,
    data: &FeatureMatrix,
) -> Result<EvaluationMetrics> {
    let inputs = data.features(model.device())?;
    let logits = model.forward_batch(&inputs)?;
    let probabilities = candle_nn::ops::sigmoid(&logits)?.to_vec1::<f32>()?;
    Ok(compute_metrics(data.labels(), &probabilities))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn save_metrics(path: &Path, metrics: &EvaluationMetrics) -> Result<()> {
    write_json(path, metrics)
}

pub fn save_experiment_info(path: &Path, info: &ExperimentInfo) -> Result<()> {
    write_json(path, info)
}

pub fn load_experiment_info(path: &Path) -> Result<ExperimentInfo> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Identifier for one evaluation run: UTC timestamp plus a random suffix.
pub fn new_run_id() -> String {
    format!(
        "{}-{:08x}",
        chrono::Utc::now().format("%Y%m%dT%H%M%SZ"),
        rand::random::<u32>()
    )
}

/// Evaluation stage: score the trained model on the test features and write
/// `reports/metrics.json` and `reports/experiment_info.json`.
pub fn run(config: &AppConfig) -> Result<(EvaluationMetrics, ExperimentInfo)> {
    let device = if config.model.cpu {
        DeviceRequest::Cpu.resolve_or_cpu()
    } else {
        DeviceRequest::Default.resolve_or_cpu()
    };
    let model_path = config.paths.model_path();
    let model = LinearSentimentModel::load(&model_path, &device)?;
    let data = read_feature_csv(&config.data.processed_dir().join(TEST_FEATURES_FILE))?;

    let metrics = evaluate_model(&model, &data)?;
    save_metrics(&config.paths.metrics_path(), &metrics)?;

    let info = ExperimentInfo {
        run_id: new_run_id(),
        model_path: model_path.display().to_string(),
    };
    save_experiment_info(&config.paths.experiment_info_path(), &info)?;

    tracing::info!(
        accuracy = metrics.accuracy,
        precision = metrics.precision,
        recall = metrics.recall,
        auc = metrics.auc,
        run_id = %info.run_id,
        "model evaluation completed"
    );
    Ok((metrics, info))
}

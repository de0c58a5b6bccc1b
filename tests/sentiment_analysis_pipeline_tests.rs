// Integration tests for the sentiment analysis pipeline
// This is a separate crate that tests the public API

use std::path::Path;

use candle_core::Device;
use sentiment_ops::core::config::TrainingConfig;
use sentiment_ops::pipelines::sentiment_analysis_pipeline::*;
use sentiment_ops::pipelines::utils::DeviceSelectable;
use sentiment_ops::registry::{LocalRegistry, Stage};
use sentiment_ops::training::{FeatureMatrix, LogisticRegressionTrainer};
use sentiment_ops::{
    ModelKind, SentimentError, SentimentLabel, TextNormalizer, Vectorizer, VectorizerKind,
};
use sentiment_ops::preprocessing::ReviewRecord;

fn corpus() -> Vec<ReviewRecord> {
    let normalizer = TextNormalizer::new();
    let rows = [
        ("Great phone, I love the screen", SentimentLabel::Positive),
        ("Amazing battery and a great camera", SentimentLabel::Positive),
        ("Love it, works great every day", SentimentLabel::Positive),
        ("Excellent value, amazing speakers", SentimentLabel::Positive),
        ("Terrible battery, awful screen", SentimentLabel::Negative),
        ("Awful support and a terrible camera", SentimentLabel::Negative),
        ("Broken on arrival, terrible packaging", SentimentLabel::Negative),
        ("Awful speakers, waste of money", SentimentLabel::Negative),
    ];
    rows.iter()
        .map(|(text, label)| ReviewRecord {
            review: normalizer.normalize(text),
            sentiment: *label,
        })
        .collect()
}

/// Fit, train and register a model under `root`; returns the vectorizer path.
fn publish_model(root: &Path, promote: bool) -> anyhow::Result<std::path::PathBuf> {
    let records = corpus();
    let texts: Vec<&str> = records.iter().map(|r| r.review.as_str()).collect();
    let mut vectorizer = Vectorizer::new(VectorizerKind::Bow, None);
    vectorizer.fit(&texts)?;
    let vectorizer_path = root.join("models").join("vectorizer.json");
    vectorizer.save(&vectorizer_path)?;

    let matrix = FeatureMatrix::from_records(&vectorizer, &records)?;
    let config = TrainingConfig {
        epochs: 300,
        learning_rate: 0.1,
        weight_decay: 0.0,
    };
    let trained = LogisticRegressionTrainer::new(&config, Device::Cpu).fit(&matrix)?;
    let model_path = root.join("models").join("model.safetensors");
    trained.save(&model_path)?;

    let registry = LocalRegistry::new(root.join("registry"));
    let version = registry.register("my_model", &model_path, Some("run-1"))?;
    if promote {
        registry.transition_stage("my_model", version.version, Stage::Staging, false)?;
        registry.promote_latest("my_model")?;
    }
    Ok(vectorizer_path)
}

#[test]
fn fallback_when_registry_is_empty() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let pipeline = SentimentAnalysisPipelineBuilder::new("my_model")
        .registry(LocalRegistry::new(dir.path().join("registry")))
        .vectorizer_path(dir.path().join("missing.json"))
        .cpu()
        .build();

    assert_eq!(pipeline.status(), ServiceStatus::FallbackReady);
    let vectorizer = pipeline.vectorizer().expect("placeholder vectorizer");
    assert_eq!(vectorizer.width(), 8);

    let prediction = pipeline.predict("I love this product, it's amazing!")?;
    assert_eq!(prediction.label, SentimentLabel::Positive);
    assert_eq!(prediction.model_kind, ModelKind::Fallback);
    assert_eq!(prediction.normalized, "love product amazing");
    Ok(())
}

#[test]
fn fallback_ties_and_strict_wins() -> anyhow::Result<()> {
    let pipeline = SentimentAnalysisPipeline::fallback()?;
    assert_eq!(pipeline.predict("good but bad")?.label, SentimentLabel::Negative);
    assert_eq!(pipeline.predict("nothing to see")?.label, SentimentLabel::Negative);
    assert_eq!(pipeline.predict("good, great, yet bad")?.label, SentimentLabel::Positive);
    assert_eq!(pipeline.predict("bad, terrible, but good")?.label, SentimentLabel::Negative);
    Ok(())
}

#[test]
fn missing_text_is_rejected() -> anyhow::Result<()> {
    let pipeline = SentimentAnalysisPipeline::fallback()?;
    let err = pipeline.classify(None).unwrap_err();
    assert!(matches!(err, SentimentError::MissingField("text")));
    Ok(())
}

#[test]
fn unavailable_service_refuses_requests() {
    let pipeline = SentimentAnalysisPipeline::from_parts(None, None);
    assert_eq!(pipeline.status(), ServiceStatus::Unavailable);
    assert!(matches!(
        pipeline.predict("anything"),
        Err(SentimentError::ModelUnavailable)
    ));
}

#[test]
fn production_model_is_served() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let vectorizer_path = publish_model(dir.path(), true)?;

    let pipeline = SentimentAnalysisPipelineBuilder::new("my_model")
        .registry(LocalRegistry::new(dir.path().join("registry")))
        .vectorizer_path(vectorizer_path)
        .cpu()
        .build();

    assert_eq!(pipeline.status(), ServiceStatus::ModelReady);
    assert_eq!(pipeline.status().as_str(), "Using Registered Model");
    assert_eq!(pipeline.model_version().map(|v| v.stage), Some(Stage::Production));

    let positive = pipeline.predict("Great camera, I love it!")?;
    assert_eq!(positive.model_kind, ModelKind::Registered);
    assert_eq!(positive.label, SentimentLabel::Positive);

    let negative = pipeline.predict("Terrible, awful battery")?;
    assert_eq!(negative.label, SentimentLabel::Negative);
    Ok(())
}

#[test]
fn unstaged_model_is_served_without_production() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let vectorizer_path = publish_model(dir.path(), false)?;

    let pipeline = SentimentAnalysisPipelineBuilder::new("my_model")
        .registry(LocalRegistry::new(dir.path().join("registry")))
        .vectorizer_path(vectorizer_path)
        .cpu()
        .build();

    assert_eq!(pipeline.status(), ServiceStatus::ModelReady);
    assert_eq!(pipeline.model_version().map(|v| v.stage), Some(Stage::None));
    Ok(())
}

#[test]
fn width_mismatch_is_a_transform_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    publish_model(dir.path(), true)?;

    // The placeholder vectorizer is narrower than the trained model.
    let pipeline = SentimentAnalysisPipelineBuilder::new("my_model")
        .registry(LocalRegistry::new(dir.path().join("registry")))
        .vectorizer_path(dir.path().join("missing.json"))
        .cpu()
        .build();

    assert_eq!(pipeline.status(), ServiceStatus::ModelReady);
    let err = pipeline.predict("great phone").unwrap_err();
    assert!(matches!(err, SentimentError::Transform(_)));
    Ok(())
}

#[test]
fn inconsistent_vectorizer_artifact_is_replaced() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let vectorizer_path = publish_model(dir.path(), true)?;
    // Term index points past the end of the term list.
    std::fs::write(
        &vectorizer_path,
        r#"{"kind":"bow","vocabulary":{"great":7},"terms":["great"]}"#,
    )?;

    let pipeline = SentimentAnalysisPipelineBuilder::new("my_model")
        .registry(LocalRegistry::new(dir.path().join("registry")))
        .vectorizer_path(vectorizer_path)
        .device(Device::Cpu)
        .build();

    assert_eq!(pipeline.status(), ServiceStatus::ModelReady);
    assert_eq!(pipeline.vectorizer().map(|v| v.width()), Some(8));
    let err = pipeline.predict("great phone").unwrap_err();
    assert!(matches!(err, SentimentError::Transform(_)));
    Ok(())
}

#[test]
fn corrupt_model_artifact_downgrades_to_fallback() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let artifact = dir.path().join("model.safetensors");
    std::fs::write(&artifact, b"not a safetensors file")?;
    let registry = LocalRegistry::new(dir.path().join("registry"));
    registry.register("my_model", &artifact, None)?;
    registry.promote_latest("my_model")?;

    let pipeline = SentimentAnalysisPipelineBuilder::new("my_model")
        .registry(registry)
        .vectorizer_path(dir.path().join("missing.json"))
        .cpu()
        .build();

    assert_eq!(pipeline.status(), ServiceStatus::FallbackReady);
    assert_eq!(pipeline.predict("great")?.model_kind, ModelKind::Fallback);
    Ok(())
}

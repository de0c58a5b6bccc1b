//! Layered application configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `config/settings.{toml,yaml,json}` file (or the file passed with
//! `--config`), then `SENTIMENT__*` environment variables using `__` as the
//! section separator, e.g. `SENTIMENT__SERVER__LISTEN_ADDR=0.0.0.0:5000`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use super::error::Result;
use crate::vectorizers::VectorizerKind;

const CONFIG_FILE: &str = "config/settings";
const ENV_PREFIX: &str = "SENTIMENT";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub data: DataConfig,
    pub preprocessing: PreprocessingConfig,
    pub features: FeaturesConfig,
    pub training: TrainingConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Registered model name looked up at service start.
    pub name: String,
    pub registry_dir: PathBuf,
    /// When set, the service resolves models from this hub repository
    /// instead of `registry_dir`.
    #[serde(default)]
    pub hub_repo: Option<String>,
    pub hub_revision: String,
    pub vectorizer_path: PathBuf,
    /// Force CPU inference even when CUDA is available.
    pub cpu: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// CSV path or http(s) URL read by the ingestion stage.
    pub source: String,
    pub data_dir: PathBuf,
    pub test_size: f64,
    pub seed: u64,
    pub text_column: String,
    pub label_column: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PreprocessingConfig {
    pub drop_short_rows: bool,
    pub min_tokens: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeaturesConfig {
    pub kind: VectorizerKind,
    #[serde(default)]
    pub max_features: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub weight_decay: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    pub models_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl PathsConfig {
    pub fn model_path(&self) -> PathBuf {
        self.models_dir.join("model.safetensors")
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.reports_dir.join("metrics.json")
    }

    pub fn experiment_info_path(&self) -> PathBuf {
        self.reports_dir.join("experiment_info.json")
    }
}

impl DataConfig {
    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn interim_dir(&self) -> PathBuf {
        self.data_dir.join("interim")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }
}

/// Load configuration, reading `path` instead of the default settings file
/// when given. An explicit path must exist; the default one is optional.
pub fn load_from(path: Option<&Path>) -> Result<AppConfig> {
    let file = match path {
        Some(p) => File::from(p.to_path_buf()).required(true),
        None => File::with_name(CONFIG_FILE).required(false),
    };

    let cfg = defaults()?
        .add_source(file)
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()?;
    Ok(cfg)
}

fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
    let builder = Config::builder()
        .set_default("server.listen_addr", "0.0.0.0:5000")?
        .set_default("model.name", "my_model")?
        .set_default("model.registry_dir", "registry")?
        .set_default("model.hub_revision", "main")?
        .set_default("model.vectorizer_path", "models/vectorizer.json")?
        .set_default("model.cpu", false)?
        .set_default("data.source", "notebooks/data.csv")?
        .set_default("data.data_dir", "data")?
        .set_default("data.test_size", 0.2)?
        .set_default("data.seed", 42)?
        .set_default("data.text_column", "review")?
        .set_default("data.label_column", "sentiment")?
        .set_default("preprocessing.drop_short_rows", false)?
        .set_default("preprocessing.min_tokens", 3)?
        .set_default("features.kind", "bow")?
        .set_default("features.max_features", 50)?
        .set_default("training.epochs", 200)?
        .set_default("training.learning_rate", 0.05)?
        .set_default("training.weight_decay", 0.0)?
        .set_default("paths.models_dir", "models")?
        .set_default("paths.reports_dir", "reports")?;
    Ok(builder)
}

//! Model registry: versioned model artifacts with lifecycle stages.
//!
//! ## Main Types
//!
//! - [`ModelRegistry`] - Read interface used by the inference service
//! - [`LocalRegistry`] - Filesystem registry with a `registry.json` manifest;
//!   supports registering versions and moving them between stages
//! - [`HubRegistry`] - Read-only registry resolved from a Hugging Face Hub
//!   model repository with the same manifest layout
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sentiment_ops::registry::{LocalRegistry, ModelRegistry, Stage};
//!
//! let registry = LocalRegistry::new("registry");
//! let version = registry.register("my_model", "models/model.safetensors".as_ref(), None)?;
//! registry.transition_stage("my_model", version.version, Stage::Staging, false)?;
//! registry.promote_latest("my_model")?;
//!
//! let production = registry.get_latest_version("my_model", Stage::Production)?;
//! # Ok::<(), sentiment_ops::registry::RegistryError>(())
//! ```

pub mod hub;
pub mod local;

pub use hub::HubRegistry;
pub use local::LocalRegistry;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the manifest file at the registry root.
pub const MANIFEST_FILE: &str = "registry.json";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registered model '{0}' not found")]
    ModelNotFound(String),

    #[error("version {version} of model '{name}' not found")]
    VersionNotFound { name: String, version: u32 },

    #[error("artifact not found: {0}")]
    ArtifactMissing(PathBuf),

    #[error("unknown stage '{0}'")]
    UnknownStage(String),

    #[error("hub request failed: {0}")]
    Hub(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Manifest(#[from] serde_json::Error),
}

impl From<hf_hub::api::sync::ApiError> for RegistryError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        RegistryError::Hub(value.to_string())
    }
}

/// Lifecycle stage of a model version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Stage {
    #[default]
    None,
    Staging,
    Production,
    Archived,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::None => "None",
            Stage::Staging => "Staging",
            Stage::Production => "Production",
            Stage::Archived => "Archived",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Stage::None),
            "staging" => Ok(Stage::Staging),
            "production" => Ok(Stage::Production),
            "archived" => Ok(Stage::Archived),
            _ => Err(RegistryError::UnknownStage(s.to_string())),
        }
    }
}

/// One registered version of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub name: String,
    pub version: u32,
    pub stage: Stage,
    /// Artifact location relative to the registry root.
    pub artifact: String,
    #[serde(default)]
    pub run_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Contents of `registry.json`: every version of every model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryManifest {
    #[serde(default)]
    pub models: BTreeMap<String, Vec<ModelVersion>>,
}

impl RegistryManifest {
    pub fn versions(&self, name: &str) -> &[ModelVersion] {
        self.models.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Highest version of `name` currently in `stage`.
    pub fn latest(&self, name: &str, stage: Stage) -> Option<&ModelVersion> {
        self.versions(name)
            .iter()
            .filter(|v| v.stage == stage)
            .max_by_key(|v| v.version)
    }
}

/// Read access to a model registry, as needed at service startup.
pub trait ModelRegistry: Send + Sync {
    /// Latest version of `name` in `stage`, if any.
    fn get_latest_version(
        &self,
        name: &str,
        stage: Stage,
    ) -> Result<Option<ModelVersion>, RegistryError>;

    /// Local path of a version's artifact, downloading it first if needed.
    fn artifact_path(&self, version: &ModelVersion) -> Result<PathBuf, RegistryError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

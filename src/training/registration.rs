use std::path::Path;

use super::evaluation::load_experiment_info;
use crate::core::{AppConfig, Result};
use crate::registry::{LocalRegistry, ModelVersion, Stage};

/// Register the evaluated artifact as a new version and move it to staging.
pub fn register_model(
    registry: &LocalRegistry,
    name: &str,
    experiment_info: &Path,
) -> Result<ModelVersion> {
    let info = load_experiment_info(experiment_info)?;
    let version = registry.register(name, Path::new(&info.model_path), Some(&info.run_id))?;
    let staged = registry.transition_stage(name, version.version, Stage::Staging, false)?;
    tracing::info!(
        model = name,
        version = staged.version,
        run_id = %info.run_id,
        "model registered and moved to Staging"
    );
    Ok(staged)
}

/// Registration stage.
pub fn run(config: &AppConfig) -> Result<ModelVersion> {
    let registry = LocalRegistry::new(config.model.registry_dir.clone());
    register_model(&registry, &config.model.name, &config.paths.experiment_info_path())
}

/// Promotion stage: newest version to production.
pub fn promote(config: &AppConfig) -> Result<ModelVersion> {
    let registry = LocalRegistry::new(config.model.registry_dir.clone());
    let version = registry.promote_latest(&config.model.name)?;
    tracing::info!(
        model = %config.model.name,
        version = version.version,
        "model promoted to Production"
    );
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::evaluation::{save_experiment_info, ExperimentInfo};

    #[test]
    fn test_register_moves_to_staging() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("model.safetensors");
        std::fs::write(&artifact, b"weights").unwrap();
        let info_path = dir.path().join("experiment_info.json");
        save_experiment_info(
            &info_path,
            &ExperimentInfo {
                run_id: "run-7".into(),
                model_path: artifact.display().to_string(),
            },
        )
        .unwrap();

        let registry = LocalRegistry::new(dir.path().join("registry"));
        let version = register_model(&registry, "my_model", &info_path).unwrap();
        assert_eq!(version.version, 1);
        assert_eq!(version.stage, Stage::Staging);
        assert_eq!(version.run_id.as_deref(), Some("run-7"));
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::{ModelRegistry, ModelVersion, RegistryError, RegistryManifest, Stage, MANIFEST_FILE};

const ARTIFACT_FILE: &str = "model.safetensors";

/// Registry stored under a local directory:
///
/// ```text
/// <root>/registry.json
/// <root>/<name>/<version>/model.safetensors
/// ```
#[derive(Debug, Clone)]
pub struct LocalRegistry {
    root: PathBuf,
}

impl LocalRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// A registry that has never been written to reads as empty.
    pub fn manifest(&self) -> Result<RegistryManifest, RegistryError> {
        let path = self.manifest_path();
        if !path.exists() {
            return Ok(RegistryManifest::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_manifest(&self, manifest: &RegistryManifest) -> Result<(), RegistryError> {
        fs::create_dir_all(&self.root)?;
        let tmp = self.root.join(format!("{MANIFEST_FILE}.tmp"));
        fs::write(&tmp, serde_json::to_string_pretty(manifest)?)?;
        fs::rename(tmp, self.manifest_path())?;
        Ok(())
    }

    pub fn list_versions(&self, name: &str) -> Result<Vec<ModelVersion>, RegistryError> {
        Ok(self.manifest()?.versions(name).to_vec())
    }

    /// Copy `artifact` into the registry as the next version of `name`, in
    /// stage [`Stage::None`].
    pub fn register(
        &self,
        name: &str,
        artifact: &Path,
        run_id: Option<&str>,
    ) -> Result<ModelVersion, RegistryError> {
        if !artifact.is_file() {
            return Err(RegistryError::ArtifactMissing(artifact.to_path_buf()));
        }

        let mut manifest = self.manifest()?;
        let versions = manifest.models.entry(name.to_string()).or_default();
        let next = versions.iter().map(|v| v.version).max().unwrap_or(0) + 1;

        let relative = format!("{name}/{next}/{ARTIFACT_FILE}");
        let dest = self.root.join(&relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(artifact, &dest)?;

        let version = ModelVersion {
            name: name.to_string(),
            version: next,
            stage: Stage::None,
            artifact: relative,
            run_id: run_id.map(str::to_string),
            created_at: Utc::now(),
        };
        versions.push(version.clone());
        self.write_manifest(&manifest)?;

        tracing::info!(model = name, version = next, "model registered");
        Ok(version)
    }

    /// Move one version to `stage`. With `archive_existing`, versions already
    /// in that stage are archived.
    pub fn transition_stage(
        &self,
        name: &str,
        version: u32,
        stage: Stage,
        archive_existing: bool,
    ) -> Result<ModelVersion, RegistryError> {
        let mut manifest = self.manifest()?;
        let versions = manifest
            .models
            .get_mut(name)
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))?;
        if !versions.iter().any(|v| v.version == version) {
            return Err(RegistryError::VersionNotFound {
                name: name.to_string(),
                version,
            });
        }

        let archivable = matches!(stage, Stage::Staging | Stage::Production);
        let mut updated = None;
        for v in versions.iter_mut() {
            if v.version == version {
                v.stage = stage;
                updated = Some(v.clone());
            } else if archive_existing && archivable && v.stage == stage {
                tracing::info!(model = name, version = v.version, from = %stage, "archiving model version");
                v.stage = Stage::Archived;
            }
        }
        self.write_manifest(&manifest)?;

        tracing::info!(model = name, version, stage = %stage, "model stage transitioned");
        updated.ok_or_else(|| RegistryError::VersionNotFound {
            name: name.to_string(),
            version,
        })
    }

    /// Move the newest non-archived version of `name` to production,
    /// archiving whatever was there before.
    pub fn promote_latest(&self, name: &str) -> Result<ModelVersion, RegistryError> {
        let manifest = self.manifest()?;
        let latest = manifest
            .versions(name)
            .iter()
            .filter(|v| v.stage != Stage::Archived)
            .max_by_key(|v| v.version)
            .ok_or_else(|| RegistryError::ModelNotFound(name.to_string()))?;
        let version = latest.version;
        self.transition_stage(name, version, Stage::Production, true)
    }
}

impl ModelRegistry for LocalRegistry {
    fn get_latest_version(
        &self,
        name: &str,
        stage: Stage,
    ) -> Result<Option<ModelVersion>, RegistryError> {
        Ok(self.manifest()?.latest(name, stage).cloned())
    }

    fn artifact_path(&self, version: &ModelVersion) -> Result<PathBuf, RegistryError> {
        let path = self.root.join(&version.artifact);
        if path.is_file() {
            Ok(path)
        } else {
            Err(RegistryError::ArtifactMissing(path))
        }
    }

    fn describe(&self) -> String {
        format!("local registry at {}", self.root.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(dir: &Path, bytes: &[u8]) -> PathBuf {
        let path = dir.join("model.safetensors");
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_register_assigns_increasing_versions() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path().join("registry"));
        let file = artifact(dir.path(), b"weights");

        let v1 = registry.register("m", &file, Some("run-1")).unwrap();
        let v2 = registry.register("m", &file, None).unwrap();
        assert_eq!((v1.version, v2.version), (1, 2));
        assert_eq!(v1.stage, Stage::None);
        assert_eq!(v1.run_id.as_deref(), Some("run-1"));
        assert_eq!(fs::read(registry.artifact_path(&v2).unwrap()).unwrap(), b"weights");
    }

    #[test]
    fn test_register_missing_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path());
        let err = registry
            .register("m", &dir.path().join("absent.safetensors"), None)
            .unwrap_err();
        assert!(matches!(err, RegistryError::ArtifactMissing(_)));
    }

    #[test]
    fn test_promote_archives_previous_production() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path().join("registry"));
        let file = artifact(dir.path(), b"w");

        registry.register("m", &file, None).unwrap();
        assert_eq!(registry.promote_latest("m").unwrap().version, 1);

        registry.register("m", &file, None).unwrap();
        registry.transition_stage("m", 2, Stage::Staging, false).unwrap();
        assert_eq!(registry.promote_latest("m").unwrap().version, 2);

        let versions = registry.list_versions("m").unwrap();
        assert_eq!(versions[0].stage, Stage::Archived);
        assert_eq!(versions[1].stage, Stage::Production);
    }

    #[test]
    fn test_unknown_model_and_version() {
        let dir = tempfile::tempdir().unwrap();
        let registry = LocalRegistry::new(dir.path());
        assert!(matches!(
            registry.promote_latest("ghost"),
            Err(RegistryError::ModelNotFound(_))
        ));

        let file = artifact(dir.path(), b"w");
        registry.register("m", &file, None).unwrap();
        assert!(matches!(
            registry.transition_stage("m", 9, Stage::Production, true),
            Err(RegistryError::VersionNotFound { version: 9, .. })
        ));
    }
}

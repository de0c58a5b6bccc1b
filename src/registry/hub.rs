use std::path::PathBuf;
use std::time::Duration;

use hf_hub::api::sync::{Api, ApiBuilder, ApiRepo};
use hf_hub::{Repo, RepoType};

use super::{ModelRegistry, ModelVersion, RegistryError, RegistryManifest, Stage, MANIFEST_FILE};

const MAX_RETRIES: u32 = 3;

/// Read-only registry backed by a Hugging Face Hub model repository.
///
/// The repository holds `registry.json` at its root and each artifact at
/// the relative path the manifest names. Files are cached by `hf-hub`.
pub struct HubRegistry {
    repo_id: String,
    revision: String,
    repo: ApiRepo,
}

impl HubRegistry {
    pub fn new(repo_id: &str, revision: &str) -> Result<Self, RegistryError> {
        let api: Api = ApiBuilder::new().with_progress(false).build()?;
        let repo = api.repo(Repo::with_revision(
            repo_id.to_string(),
            RepoType::Model,
            revision.to_string(),
        ));
        Ok(Self {
            repo_id: repo_id.to_string(),
            revision: revision.to_string(),
            repo,
        })
    }

    /// Download one file, retrying on cache lock contention.
    fn fetch(&self, filename: &str) -> Result<PathBuf, RegistryError> {
        let mut attempt = 0;
        loop {
            match self.repo.get(filename) {
                Ok(path) => return Ok(path),
                Err(e) => {
                    let message = e.to_string();
                    if message.contains("Lock acquisition failed") && attempt + 1 < MAX_RETRIES {
                        // exponential backoff: 100ms, 200ms
                        std::thread::sleep(Duration::from_millis(100 * (1 << attempt)));
                        attempt += 1;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    pub fn manifest(&self) -> Result<RegistryManifest, RegistryError> {
        let path = self.fetch(MANIFEST_FILE)?;
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl ModelRegistry for HubRegistry {
    fn get_latest_version(
        &self,
        name: &str,
        stage: Stage,
    ) -> Result<Option<ModelVersion>, RegistryError> {
        Ok(self.manifest()?.latest(name, stage).cloned())
    }

    fn artifact_path(&self, version: &ModelVersion) -> Result<PathBuf, RegistryError> {
        self.fetch(&version.artifact)
    }

    fn describe(&self) -> String {
        format!("hub repository {}@{}", self.repo_id, self.revision)
    }
}

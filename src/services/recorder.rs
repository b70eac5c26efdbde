use crate::{
    error::DeployError,
    models::{DeploymentDocument, DeploymentRecord},
};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

pub const DEFAULT_DEPLOYMENTS_FILE: &str = "deployed.json";

/// Reads and merges deployment records into a JSON document on disk.
#[derive(Debug, Clone)]
pub struct DeploymentRecorder {
    path: PathBuf,
}

impl DeploymentRecorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document. A missing or unreadable file, or one that is not a
    /// JSON object, counts as empty.
    pub fn load(&self) -> DeploymentDocument {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Deployment document not found, starting empty");
                return DeploymentDocument::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Cannot read deployment document, starting empty");
                return DeploymentDocument::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Deployment document is corrupt, starting empty");
                DeploymentDocument::default()
            }
        }
    }

    /// Writes the document to a sibling temp file and renames it into place.
    pub fn save(&self, document: &DeploymentDocument) -> Result<(), DeployError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| DeployError::persistence(&self.path, e))?;
        }

        let mut json = serde_json::to_string_pretty(document)
            .map_err(|e| DeployError::persistence(&self.path, e))?;
        json.push('\n');

        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|e| DeployError::persistence(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            DeployError::persistence(&self.path, e)
        })?;

        tracing::debug!(path = %self.path.display(), "Deployment document saved");
        Ok(())
    }

    /// Read-merge-write of one record, returning the saved document.
    pub fn upsert(
        &self,
        chain_id: u64,
        contract: &str,
        record: DeploymentRecord,
    ) -> Result<DeploymentDocument, DeployError> {
        let mut document = self.load();
        document
            .upsert(chain_id, contract, record)
            .map_err(|e| DeployError::persistence(&self.path, e))?;
        self.save(&document)?;
        tracing::info!(
            chain_id,
            contract,
            path = %self.path.display(),
            "Deployment recorded"
        );
        Ok(document)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| DEFAULT_DEPLOYMENTS_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

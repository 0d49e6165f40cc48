//! Keyed JSON persistence of fitted artifacts
//!
//! Each artifact lives at `<dir>/<key>.json`. Writes go to a temporary file
//! first and are renamed into place, so a reader never sees a half-written
//! artifact.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{PipelineError, PipelineResult};

/// Key of the fitted feature transformer
pub const PREPROCESSOR_KEY: &str = "preprocessor";

/// File name of the training run report
pub const TRAINING_REPORT_FILE: &str = "training_report.json";

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    pub fn save<T: Serialize>(&self, key: &str, artifact: &T) -> PipelineResult<PathBuf> {
        let artifact_error = |message: String| PipelineError::Artifact {
            key: key.to_string(),
            message,
        };

        fs::create_dir_all(&self.dir)
            .map_err(|e| artifact_error(format!("cannot create {}: {}", self.dir.display(), e)))?;

        let json = serde_json::to_string(artifact).map_err(|e| artifact_error(e.to_string()))?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, json).map_err(|e| artifact_error(format!("cannot write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &path)
            .map_err(|e| artifact_error(format!("cannot move into {}: {}", path.display(), e)))?;

        Ok(path)
    }

    /// Delete an artifact if present. Returns whether a file was removed.
    pub fn remove(&self, key: &str) -> PipelineResult<bool> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| PipelineError::Artifact {
            key: key.to_string(),
            message: format!("cannot remove {}: {}", path.display(), e),
        })?;
        Ok(true)
    }

    /// Load an artifact; an absent file is a [`PipelineError::MissingArtifact`].
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> PipelineResult<T> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(PipelineError::MissingArtifact {
                key: key.to_string(),
                path: path.display().to_string(),
            });
        }

        let json = fs::read_to_string(&path).map_err(|e| PipelineError::Artifact {
            key: key.to_string(),
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&json).map_err(|e| PipelineError::Artifact {
            key: key.to_string(),
            message: format!("malformed artifact: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path().join("models"));
        let path = store.save("numbers", &vec![1.5, 2.25]).unwrap();
        assert!(path.ends_with("numbers.json"));
        assert!(store.exists("numbers"));

        let loaded: Vec<f64> = store.load("numbers").unwrap();
        assert_eq!(loaded, vec![1.5, 2.25]);
    }

    #[test]
    fn test_missing_artifact() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let err = store.load::<Vec<f64>>("xgboost").unwrap_err();
        assert!(matches!(err, PipelineError::MissingArtifact { ref key, .. } if key == "xgboost"));
        assert!(err.to_string().starts_with("model files not found, run training first"));
    }

    #[test]
    fn test_remove_artifact() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save("xgboost", &vec![1.0]).unwrap();

        assert!(store.remove("xgboost").unwrap());
        assert!(!store.exists("xgboost"));
        assert!(!store.remove("xgboost").unwrap());
    }

    #[test]
    fn test_malformed_artifact() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("preprocessor.json"), "{not json").unwrap();
        let store = ArtifactStore::new(dir.path());
        let err = store.load::<Vec<f64>>(PREPROCESSOR_KEY).unwrap_err();
        assert!(matches!(err, PipelineError::Artifact { .. }));
    }
}

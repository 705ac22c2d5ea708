//! On-disk classification cache.
//!
//! One JSON file per request under the cache directory, named by the blake3
//! hash of (namespace, table name, sample, context). The namespace is
//! usually the model name so switching models does not reuse answers.

use std::fs;
use std::path::{Path, PathBuf};

use datacat_engine::classify::{ClassificationRequest, Classifier, ClassifyError, TableMetadata};

pub struct CachedClassifier<C> {
    inner: C,
    dir: PathBuf,
    namespace: String,
}

impl<C: Classifier> CachedClassifier<C> {
    pub fn new(inner: C, dir: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self { inner, dir: dir.into(), namespace: namespace.into() }
    }

    /// Cache file for a request.
    pub fn entry_path(&self, request: &ClassificationRequest) -> PathBuf {
        let sample = request.sample_json();
        let mut hasher = blake3::Hasher::new();
        for part in [
            self.namespace.as_str(),
            request.table_name.as_str(),
            sample.as_str(),
            request.context.as_deref().unwrap_or(""),
        ] {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part.as_bytes());
        }
        // Distinguish "no context" from an empty one
        hasher.update(&[request.context.is_some() as u8]);
        self.dir.join(format!("{}.json", hasher.finalize().to_hex()))
    }

    fn read_entry(&self, path: &Path) -> Option<TableMetadata> {
        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                log::warn!("ignoring corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write_entry(&self, path: &Path, metadata: &TableMetadata) -> Result<(), String> {
        fs::create_dir_all(&self.dir).map_err(|e| format!("Failed to create cache dir: {}", e))?;
        let json = serde_json::to_string_pretty(metadata).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| format!("Failed to write cache entry: {}", e))
    }
}

impl<C: Classifier> Classifier for CachedClassifier<C> {
    fn classify(&self, request: &ClassificationRequest) -> Result<TableMetadata, ClassifyError> {
        let path = self.entry_path(request);
        if let Some(hit) = self.read_entry(&path) {
            log::debug!("cache hit for '{}' ({})", request.table_name, path.display());
            return Ok(hit);
        }

        let metadata = self.inner.classify(request)?;
        if let Err(e) = self.write_entry(&path, &metadata) {
            log::warn!("{}", e);
        }
        Ok(metadata)
    }
}

//! On-disk catalog documents (`models.json`, `previous_models.json`)
//!
//! Files are pretty-printed JSON with 2-space indentation and are rewritten in
//! full on every save.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::Catalog;

/// A single catalog JSON file
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the catalog, or an empty one if the file does not exist
    ///
    /// Only a missing file is tolerated. Any other read failure, or content
    /// that does not parse, is an error.
    pub fn load(&self) -> Result<Catalog> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "{} not found, starting from an empty catalog",
                    self.path.display()
                );
                return Ok(Catalog::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read snapshot: {}", self.path.display())
                })
            }
        };

        let catalog: Catalog = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot: {}", self.path.display()))?;

        debug!(
            "Loaded {} brands ({} models) from {}",
            catalog.len(),
            catalog.model_count(),
            self.path.display()
        );
        Ok(catalog)
    }

    /// Overwrite the file with the given catalog
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
        }

        let content =
            serde_json::to_string_pretty(catalog).context("Failed to serialize catalog")?;

        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write snapshot: {}", self.path.display()))?;

        debug!("Saved {} brands to {}", catalog.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.push("Tecno", "Camon20");
        catalog.push("Tecno", "Spark10");
        catalog.entry("Infinix");
        catalog.push("Itel", "A70");
        catalog
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp_dir.path().join("previous_models.json"));

        assert!(!store.exists());
        let catalog = store.load().unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp_dir.path().join("previous_models.json"));

        store.save(&sample()).unwrap();
        assert!(store.exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_saved_format_is_indented_json() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp_dir.path().join("models.json"));

        let mut catalog = Catalog::new();
        catalog.push("Tecno", "Camon20");
        store.save(&catalog).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "{\n  \"Tecno\": [\n    \"Camon20\"\n  ]\n}");
    }

    #[test]
    fn test_empty_catalog_saved_as_empty_object() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp_dir.path().join("models.json"));

        store.save(&Catalog::new()).unwrap();
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "{}");
    }

    #[test]
    fn test_save_overwrites_in_full() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp_dir.path().join("models.json"));

        store.save(&sample()).unwrap();
        let mut smaller = Catalog::new();
        smaller.push("Itel", "P40");
        store.save(&smaller).unwrap();

        assert_eq!(store.load().unwrap(), smaller);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp_dir.path().join("state").join("models.json"));

        store.save(&sample()).unwrap();
        assert!(store.exists());
    }

    #[test]
    fn test_unreadable_location_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("state");
        std::fs::write(&blocker, "not a directory").unwrap();

        // The parent is a regular file, so the read fails with something other than NotFound
        let store = SnapshotStore::new(blocker.join("previous_models.json"));
        assert!(!store.exists());

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("Failed to read snapshot"));
    }

    #[test]
    fn test_malformed_snapshot_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("previous_models.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = SnapshotStore::new(&path).load();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse snapshot"));
    }
}

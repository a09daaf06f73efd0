//! Lifecycle metadata store.
//!
//! One durable JSON record per project, written once at creation time and
//! read by every later lifecycle operation. The record file lives inside the
//! project directory (`<projects>/<name>/.slipway.json`) so local artifacts
//! and metadata share a lifetime.

use crate::error::{Error, Result};
use crate::types::ProjectRecord;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Record file name inside a project directory.
pub const RECORD_FILE: &str = ".slipway.json";

/// Filesystem-backed metadata store rooted at the projects directory.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    root: PathBuf,
}

impl MetadataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the record file for a project.
    pub fn record_path(&self, name: &str) -> PathBuf {
        self.root.join(name).join(RECORD_FILE)
    }

    /// Create or overwrite a project record.
    ///
    /// The write is flushed to stable storage (`sync_all`) before this
    /// returns; a record that is listable but would not survive a crash is
    /// worse than no record at all. Field order in the file is the struct
    /// declaration order, so records diff cleanly.
    pub fn put(&self, record: &ProjectRecord) -> Result<()> {
        let path = self.record_path(&record.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(record)?;
        let mut file = File::create(&path)?;
        file.write_all(&json)?;
        file.sync_all()?;

        debug!("Wrote project record for '{}' to {:?}", record.name, path);
        Ok(())
    }

    /// Read a project record, or `ProjectNotFound` if none exists.
    pub fn get(&self, name: &str) -> Result<ProjectRecord> {
        let path = self.record_path(name);
        if !path.exists() {
            return Err(Error::ProjectNotFound(name.to_string()));
        }
        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Enumerate all locally known projects: directories under the root
    /// containing a record file. Unreadable records are skipped with a log
    /// line rather than failing the whole listing.
    pub fn list(&self) -> Result<Vec<ProjectRecord>> {
        let mut records = Vec::new();
        if !self.root.exists() {
            return Ok(records);
        }

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let record_path = entry.path().join(RECORD_FILE);
            if !record_path.exists() {
                continue;
            }
            match fs::read_to_string(&record_path)
                .map_err(Error::from)
                .and_then(|s| serde_json::from_str(&s).map_err(Error::from))
            {
                Ok(record) => records.push(record),
                Err(e) => debug!("Skipping unreadable record {:?}: {}", record_path, e),
            }
        }

        // Deterministic listing order
        records.sort_by(|a: &ProjectRecord, b: &ProjectRecord| a.name.cmp(&b.name));
        Ok(records)
    }

    /// Whether a project directory exists locally (record or not).
    pub fn project_dir_exists(&self, name: &str) -> bool {
        self.root.join(name).exists()
    }

    /// The directory a project's artifacts live in.
    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LifecycleStage, PersistenceMode, RECORD_SCHEMA_VERSION};
    use chrono::Utc;
    use tempfile::tempdir;

    fn record(name: &str) -> ProjectRecord {
        ProjectRecord {
            schema_version: RECORD_SCHEMA_VERSION,
            name: name.to_string(),
            namespace: Some("team-a".to_string()),
            owner: "alice".to_string(),
            description: "test project".to_string(),
            stage: LifecycleStage::Created,
            created_at: Utc::now(),
            port: 8080,
            runtime_version: "21".to_string(),
            persistence: PersistenceMode::None,
            build_image: false,
        }
    }

    #[test]
    fn test_put_then_get() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path());

        store.put(&record("user-service")).unwrap();
        let loaded = store.get("user-service").unwrap();

        assert_eq!(loaded.name, "user-service");
        assert_eq!(loaded.namespace.as_deref(), Some("team-a"));
        assert_eq!(loaded.persistence, PersistenceMode::None);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path());

        let err = store.get("ghost").unwrap_err();
        assert!(matches!(err, Error::ProjectNotFound(_)));
    }

    #[test]
    fn test_put_overwrites() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path());

        store.put(&record("svc")).unwrap();
        let mut updated = record("svc");
        updated.port = 9090;
        store.put(&updated).unwrap();

        assert_eq!(store.get("svc").unwrap().port, 9090);
    }

    #[test]
    fn test_list_returns_sorted_records() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path());

        store.put(&record("zeta")).unwrap();
        store.put(&record("alpha")).unwrap();
        store.put(&record("mid")).unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_list_skips_dirs_without_record() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path());

        store.put(&record("real")).unwrap();
        std::fs::create_dir_all(dir.path().join("stray-dir")).unwrap();

        let records = store.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "real");
    }

    #[test]
    fn test_list_empty_root() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path().join("missing"));
        assert!(store.list().unwrap().is_empty());
    }
}

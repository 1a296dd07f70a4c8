//! Persisted hash store.
//!
//! A flat JSON document mapping normalized unit paths to the digest
//! recorded at their last successful compile. Loaded once at startup,
//! mutated in memory during a build, and written back only after the
//! pass completes; a hard abort leaves the previous store untouched.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::hash::Digest;

/// Errors loading or saving the hash store.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to read hash store {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The persisted document is not a flat object of non-empty strings.
  /// Fatal: the whole build aborts rather than guessing at staleness.
  #[error("corrupt hash store {path}: {reason}")]
  Corrupt { path: PathBuf, reason: String },

  #[error("failed to serialize hash store: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("failed to write hash store {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// In-memory mapping from unit path to last-known digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashStore {
  records: BTreeMap<String, Digest>,
}

impl HashStore {
  /// Load the store from `path`.
  ///
  /// A missing file is an empty store, not an error. Any malformed
  /// document (non-object, a non-string value, an empty key or digest)
  /// is a fatal [`StoreError::Corrupt`]; the file on disk is left as is.
  pub fn load(path: &Path) -> Result<Self, StoreError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "no hash store on disk, starting empty");
        return Ok(Self::default());
      }
      Err(e) => {
        return Err(StoreError::Read {
          path: path.to_path_buf(),
          source: e,
        });
      }
    };

    let records: BTreeMap<String, Digest> =
      serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
      })?;

    for (unit, digest) in &records {
      if unit.is_empty() || digest.0.is_empty() {
        return Err(StoreError::Corrupt {
          path: path.to_path_buf(),
          reason: "empty unit path or digest".to_string(),
        });
      }
    }

    debug!(path = %path.display(), entries = records.len(), "loaded hash store");
    Ok(Self { records })
  }

  /// Digest recorded for a unit, if any. No side effects.
  pub fn get(&self, unit: &str) -> Option<&Digest> {
    self.records.get(unit)
  }

  /// Record the digest observed at a successful compile.
  pub fn set(&mut self, unit: impl Into<String>, digest: Digest) {
    self.records.insert(unit.into(), digest);
  }

  /// Number of tracked units.
  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Write the full mapping back to `path`.
  ///
  /// Writes to a sibling temp file and renames it into place, so a crash
  /// mid-write cannot corrupt the previous valid store.
  pub fn save(&self, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
      if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent).map_err(|e| StoreError::Write {
          path: path.to_path_buf(),
          source: e,
        })?;
      }
    }

    let content = serde_json::to_string_pretty(&self.records)?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &content).map_err(|e| StoreError::Write {
      path: temp_path.clone(),
      source: e,
    })?;
    fs::rename(&temp_path, path).map_err(|e| StoreError::Write {
      path: path.to_path_buf(),
      source: e,
    })?;

    debug!(path = %path.display(), entries = self.records.len(), "saved hash store");
    Ok(())
  }
}

/// Store key for a unit: its path relative to the project root, with
/// forward slashes on every platform.
pub fn unit_key(project_root: &Path, unit: &Path) -> String {
  let rel = unit.strip_prefix(project_root).unwrap_or(unit);
  rel
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn store_path(temp: &TempDir) -> PathBuf {
    temp.path().join("make_hash.json")
  }

  #[test]
  fn load_missing_file_is_empty() {
    let temp = TempDir::new().unwrap();
    let store = HashStore::load(&store_path(&temp)).unwrap();
    assert!(store.is_empty());
  }

  #[test]
  fn save_and_load_roundtrip() {
    let temp = TempDir::new().unwrap();
    let path = store_path(&temp);

    let mut store = HashStore::default();
    store.set("src/lib/a.cpp", Digest("d1".to_string()));
    store.set("src/lib/b.cpp", Digest("d2".to_string()));
    store.save(&path).unwrap();

    let loaded = HashStore::load(&path).unwrap();
    assert_eq!(loaded, store);
    assert_eq!(loaded.get("src/lib/a.cpp"), Some(&Digest("d1".to_string())));
  }

  #[test]
  fn save_leaves_no_temp_file() {
    let temp = TempDir::new().unwrap();
    let path = store_path(&temp);

    HashStore::default().save(&path).unwrap();

    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());
  }

  #[test]
  fn save_overwrites_previous_store() {
    let temp = TempDir::new().unwrap();
    let path = store_path(&temp);

    let mut store = HashStore::default();
    store.set("a.cpp", Digest("d1".to_string()));
    store.save(&path).unwrap();

    let mut store = HashStore::load(&path).unwrap();
    store.set("a.cpp", Digest("d2".to_string()));
    store.save(&path).unwrap();

    let loaded = HashStore::load(&path).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.get("a.cpp"), Some(&Digest("d2".to_string())));
  }

  #[test]
  fn set_upserts_in_memory() {
    let mut store = HashStore::default();
    assert_eq!(store.get("a.cpp"), None);

    store.set("a.cpp", Digest("d1".to_string()));
    store.set("a.cpp", Digest("d2".to_string()));

    assert_eq!(store.get("a.cpp"), Some(&Digest("d2".to_string())));
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn non_string_value_is_corrupt() {
    let temp = TempDir::new().unwrap();
    let path = store_path(&temp);
    let content = r#"{"src/lib/a.cpp": 42}"#;
    fs::write(&path, content).unwrap();

    let result = HashStore::load(&path);
    assert!(matches!(result, Err(StoreError::Corrupt { .. })));

    // The aborted load must not touch the file on disk.
    assert_eq!(fs::read_to_string(&path).unwrap(), content);
  }

  #[test]
  fn non_object_document_is_corrupt() {
    let temp = TempDir::new().unwrap();
    let path = store_path(&temp);

    for content in ["[]", "null", "\"digest\"", "not json at all {{{"] {
      fs::write(&path, content).unwrap();
      let result = HashStore::load(&path);
      assert!(matches!(result, Err(StoreError::Corrupt { .. })), "content: {content}");
    }
  }

  #[test]
  fn nested_value_is_corrupt() {
    let temp = TempDir::new().unwrap();
    let path = store_path(&temp);
    fs::write(&path, r#"{"src/lib/a.cpp": {"digest": "d1"}}"#).unwrap();

    assert!(matches!(HashStore::load(&path), Err(StoreError::Corrupt { .. })));
  }

  #[test]
  fn empty_key_or_digest_is_corrupt() {
    let temp = TempDir::new().unwrap();
    let path = store_path(&temp);

    fs::write(&path, r#"{"": "d1"}"#).unwrap();
    assert!(matches!(HashStore::load(&path), Err(StoreError::Corrupt { .. })));

    fs::write(&path, r#"{"src/lib/a.cpp": ""}"#).unwrap();
    assert!(matches!(HashStore::load(&path), Err(StoreError::Corrupt { .. })));
  }

  #[test]
  fn unit_key_is_relative_with_forward_slashes() {
    let root = Path::new("/work/project");
    let unit = root.join("src").join("lib").join("Vec3.cpp");
    assert_eq!(unit_key(root, &unit), "src/lib/Vec3.cpp");
  }

  #[test]
  fn unit_key_outside_root_is_kept_whole() {
    let root = Path::new("/work/project");
    let unit = Path::new("elsewhere/unit.cpp");
    assert_eq!(unit_key(root, unit), "elsewhere/unit.cpp");
  }
}

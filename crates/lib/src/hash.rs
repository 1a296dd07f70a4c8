//! Content hashing: the staleness oracle.
//!
//! A unit is recompiled iff its current digest differs from (or is absent
//! from) the persisted store. Digests cover the entire byte content of a
//! file, never metadata or timestamps.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use thiserror::Error;

/// Hex-encoded SHA-256 of a source unit's bytes.
///
/// Two units with equal digests are assumed byte-identical; collision
/// risk is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(pub String);

impl fmt::Display for Digest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Error computing a digest.
#[derive(Debug, Error)]
pub enum DigestError {
  #[error("source unit not found: {0}")]
  NotFound(PathBuf),

  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Compute the digest of a file's entire byte content.
///
/// Reads in fixed-size chunks; the result depends only on the bytes, so
/// byte-identical files digest identically on every platform.
pub fn digest_file(path: &Path) -> Result<Digest, DigestError> {
  let file = File::open(path).map_err(|e| match e.kind() {
    io::ErrorKind::NotFound => DigestError::NotFound(path.to_path_buf()),
    _ => DigestError::Read {
      path: path.to_path_buf(),
      source: e,
    },
  })?;
  let mut reader = BufReader::new(file);
  let mut hasher = Sha256::new();

  let mut buffer = [0u8; 8192];
  loop {
    let bytes_read = reader.read(&mut buffer).map_err(|e| DigestError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(Digest(hex::encode(hasher.finalize())))
}

/// Compute the digest of an in-memory byte slice.
pub fn digest_bytes(data: &[u8]) -> Digest {
  let mut hasher = Sha256::new();
  hasher.update(data);
  Digest(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;
  use tempfile::NamedTempFile;

  #[test]
  fn digest_bytes_known_vector() {
    let digest = digest_bytes(b"hello world");
    assert_eq!(
      digest.0,
      "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
  }

  #[test]
  fn digest_file_matches_digest_bytes() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"hello world").unwrap();
    file.flush().unwrap();

    let digest = digest_file(file.path()).unwrap();
    assert_eq!(digest, digest_bytes(b"hello world"));
  }

  #[test]
  fn digest_changes_with_single_byte() {
    assert_ne!(digest_bytes(b"render(a)"), digest_bytes(b"render(b)"));
  }

  #[test]
  fn missing_file_is_not_found() {
    let result = digest_file(Path::new("/no/such/unit.cpp"));
    assert!(matches!(result, Err(DigestError::NotFound(_))));
  }
}

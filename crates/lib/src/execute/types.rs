//! Build outcome types and execution errors.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::hash::DigestError;
use crate::platform::Platform;
use crate::target::TargetError;

/// A unit or artifact whose tool invocation exited nonzero.
#[derive(Debug, Clone, Serialize)]
pub struct UnitFailure {
  /// The source unit (or archive) that failed.
  pub unit: PathBuf,
  /// Exit status plus the captured compiler output.
  pub diagnostic: String,
}

/// An artifact not produced because a contributing unit failed.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedArtifact {
  pub artifact: PathBuf,
  /// The unit whose failure blocked the artifact.
  pub failed_unit: PathBuf,
}

/// Outcome of one target dispatch.
///
/// Per-unit failures land here rather than in an error: one bad unit
/// does not abort the batch, and the caller still persists the digests
/// of the units that did compile.
#[derive(Debug, Default, Serialize)]
pub struct BuildReport {
  /// Units recompiled this run, in declaration order.
  pub compiled: Vec<PathBuf>,
  /// Units whose digests matched the store.
  pub up_to_date: Vec<PathBuf>,
  /// Archives and executables produced or refreshed this run.
  pub artifacts: Vec<PathBuf>,
  /// Units that failed to compile, each with its diagnostic.
  pub failures: Vec<UnitFailure>,
  /// Artifacts skipped because a contributing unit failed.
  pub skipped: Vec<SkippedArtifact>,
}

impl BuildReport {
  /// True when every unit compiled (or was already up to date) and every
  /// artifact was produced.
  pub fn is_success(&self) -> bool {
    self.failures.is_empty() && self.skipped.is_empty()
  }

  /// Total number of units considered.
  pub fn unit_total(&self) -> usize {
    self.compiled.len() + self.up_to_date.len() + self.failures.len()
  }
}

/// Hard errors that abort a dispatch outright.
///
/// Everything here terminates the action before or mid-pass; the caller
/// must not persist the hash store afterwards.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// The requested name is not in the registry.
  #[error("unknown build target '{0}'")]
  UnknownTarget(String),

  /// The resolved platform has no compiler configured.
  #[error("no compiler configured for platform '{0}'")]
  UnconfiguredToolchain(Platform),

  /// A declared source unit vanished. The declared list is
  /// authoritative; the build never silently skips a listed unit.
  #[error("source unit not found: {0}")]
  UnitNotFound(PathBuf),

  #[error(transparent)]
  Target(#[from] TargetError),

  #[error(transparent)]
  Digest(#[from] DigestError),

  /// Spawning an external tool failed (binary missing or not runnable).
  #[error("failed to run {bin}: {source}")]
  Spawn {
    bin: String,
    #[source]
    source: io::Error,
  },

  #[error("io error: {0}")]
  Io(#[from] io::Error),
}

//! Build targets and their registry.
//!
//! A target is a named unit of build work owning library units, archive
//! groups, and program sources. The registry is an explicit registration
//! table populated once at startup; lookup is case-insensitive and the
//! set never changes afterwards.

mod builtin;

pub use builtin::{RaytracerTarget, TestsTarget};

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::BuildConfig;

/// Errors enumerating a target's sources.
#[derive(Debug, Error)]
pub enum TargetError {
  /// A directory the target declares as its source tree is absent.
  #[error("source directory not found: {0}")]
  SourceDirMissing(PathBuf),

  #[error("failed to scan {path}: {message}")]
  Scan { path: PathBuf, message: String },
}

/// A named group of units combined into one archive after compilation.
#[derive(Debug, Clone)]
pub struct ArchiveSpec {
  /// Archive stem; the artifact lands at `<archives>/<name>.<ext>`.
  pub name: String,
  /// Member units, in declaration order.
  pub units: Vec<PathBuf>,
}

/// A program source linked with the target's objects and archives into
/// an executable.
#[derive(Debug, Clone)]
pub struct ProgramSpec {
  /// Executable stem.
  pub name: String,
  /// The program's own source unit.
  pub main: PathBuf,
  /// Directory the executable is written to.
  pub out_dir: PathBuf,
}

/// A registered unit of build work.
///
/// Implementations only describe what they own; the execute driver runs
/// the stale-check/compile/archive/link passes for all of them.
pub trait Target: Send + Sync {
  /// Registered name; lookup is case-insensitive.
  fn name(&self) -> &'static str;

  /// One-line description for the target listing.
  fn description(&self) -> &'static str;

  /// Library units compiled to standalone objects, in declaration order.
  fn units(&self, config: &BuildConfig) -> Result<Vec<PathBuf>, TargetError>;

  /// Archive groups, in declaration order.
  fn archives(&self, config: &BuildConfig) -> Result<Vec<ArchiveSpec>, TargetError>;

  /// Program sources linked into executables.
  fn programs(&self, config: &BuildConfig) -> Result<Vec<ProgramSpec>, TargetError>;
}

/// The set of registered targets, keyed by lowercase name.
#[derive(Default)]
pub struct TargetRegistry {
  targets: BTreeMap<String, Box<dyn Target>>,
}

impl TargetRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registry holding every built-in target.
  pub fn builtin() -> Self {
    let mut registry = Self::new();
    registry.register(Box::new(RaytracerTarget));
    registry.register(Box::new(TestsTarget));
    registry
  }

  /// Add a target. A later registration under the same name wins.
  pub fn register(&mut self, target: Box<dyn Target>) {
    self.targets.insert(target.name().to_lowercase(), target);
  }

  pub fn contains(&self, name: &str) -> bool {
    self.targets.contains_key(&name.to_lowercase())
  }

  pub fn get(&self, name: &str) -> Option<&dyn Target> {
    self.targets.get(&name.to_lowercase()).map(|t| t.as_ref())
  }

  /// Registered names, sorted.
  pub fn names(&self) -> Vec<&str> {
    self.targets.keys().map(|k| k.as_str()).collect()
  }

  /// Iterate registered targets in name order.
  pub fn iter(&self) -> impl Iterator<Item = &dyn Target> {
    self.targets.values().map(|t| t.as_ref())
  }
}
